// src/lib.rs

pub mod config;
pub mod db;
pub mod error;
pub mod explorer;
pub mod llm;
pub mod schema;

pub use error::Error;
