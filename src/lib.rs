pub mod config;
pub mod error;
pub mod format;
pub mod genres;
pub mod http;
pub mod merge;
pub mod omdb;
pub mod resolve;
pub mod server;
pub mod tmdb;
pub mod tools;

pub use error::{Error, ErrorKind, Result};
