pub mod cleanup;
pub mod config;
pub mod credentials;
pub mod database;
pub mod entity;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod seed;
pub mod transfer;
pub mod utils;
pub mod verify;
