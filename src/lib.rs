#![forbid(unsafe_code)]

pub mod book_id;
pub mod cli;
pub mod commands;
pub mod config;
pub mod formats;
pub mod loader;
pub mod logging;
pub mod manifest;
pub mod samples;
pub mod schema;
pub mod search;
pub mod serve;
pub mod source;
pub mod validate;

pub use config::LoaderConfig;
pub use loader::Loader;
pub use source::{DataSource, DirDataSource, HttpDataSource};
