pub mod audit;
pub mod auth;
pub mod cli;
pub mod clients;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;
pub mod types;

#[cfg(test)]
pub mod testing;
