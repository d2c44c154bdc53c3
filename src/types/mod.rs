pub mod animal;
pub mod outcome;
pub mod window;

pub use animal::*;
pub use outcome::*;
pub use window::*;
