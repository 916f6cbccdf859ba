//! Command handlers for the `facesift` binary.

pub mod config;
pub mod find;
pub mod interactive;
pub mod models;
