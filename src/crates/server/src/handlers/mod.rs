pub mod health;
pub mod message;

pub use health::{health, health_dagger};
pub use message::post_message;
