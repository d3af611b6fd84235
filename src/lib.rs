pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod git;
pub mod history;
pub mod manifest;
pub mod message;
pub mod metadata;
pub mod release;
pub mod scope;
pub mod ui;
pub mod version;

pub use error::{RepoToolsError, Result};
