pub mod connection;
pub mod db;
pub mod logs;
pub mod sync;
pub mod token;
