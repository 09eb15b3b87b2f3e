pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod history;
pub mod render;
pub mod server;
pub mod upload;
