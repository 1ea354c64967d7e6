pub mod cli;
pub mod config;
pub mod db;
pub mod enrich;
pub mod error;
pub mod matcher;
pub mod pipeline;
pub mod scanner;
pub mod source;
