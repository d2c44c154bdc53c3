pub mod app;
pub mod engine;

pub use app::*;
pub use engine::*;
