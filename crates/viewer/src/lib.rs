pub mod binding;
pub mod config;
pub mod hover;
pub mod orchestrator;
pub mod tooltip;

pub use config::ViewerConfig;
pub use orchestrator::*;
