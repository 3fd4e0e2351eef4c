pub mod event_bus;
pub mod frame;
pub mod interval;
pub mod timeline;

pub use event_bus::*;
pub use frame::*;
pub use interval::*;
pub use timeline::*;
