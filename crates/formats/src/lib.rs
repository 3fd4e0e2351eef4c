pub mod vector_chunk;

pub use vector_chunk::*;
