// handlers/mod.rs - Public (no auth) and protected (dashboard JWT) handlers
pub mod protected;
pub mod public;
