// handlers/protected/sync/mod.rs - Manual sync and connection checks

pub mod sync_post;
pub mod test_connection_post;
pub mod test_transaction_post;

pub use sync_post::sync_post;
pub use test_connection_post::test_connection_post;
pub use test_transaction_post::test_transaction_post;
