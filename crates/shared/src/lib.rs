pub mod config;
mod config_env;
pub mod llm;
pub mod models;
pub mod sessions;
pub mod vision;
