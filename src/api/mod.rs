pub mod auth;
pub mod consumers;
pub mod health;
pub mod ml;
pub mod orders;

pub use auth::*;
pub use consumers::*;
pub use health::*;
pub use ml::*;
pub use orders::*;
