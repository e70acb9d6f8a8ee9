pub mod compose;
pub mod docker;
pub mod error;
pub mod health;
pub mod platform;

pub use compose::*;
pub use docker::*;
pub use error::*;
pub use health::*;
pub use platform::*;
