pub mod material;
pub mod mesh;
pub mod transform;
pub mod visibility;

pub use material::*;
pub use mesh::*;
pub use transform::*;
pub use visibility::*;
