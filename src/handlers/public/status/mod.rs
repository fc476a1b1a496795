// handlers/public/status/mod.rs - Liveness and connection status

pub mod health_get;
pub mod ping_get;
pub mod root_get;

pub use health_get::health_get;
pub use ping_get::ping_get;
pub use root_get::root_get;
