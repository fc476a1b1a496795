// handlers/public/oauth/mod.rs - Clio authorization-code flow

pub mod authorize_get;
pub mod callback_get;

pub use authorize_get::authorize_get;
pub use callback_get::callback_get;
