pub mod args;
pub mod cli;
pub mod error;
pub mod export;
pub mod monarch_api;
pub mod report;
pub mod terminal;
