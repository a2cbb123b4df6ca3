pub mod config;
pub mod error;
pub mod git;
pub mod io;
pub mod job;
pub mod lock;
pub mod market;
pub mod paths;
pub mod snapshot;

pub use error::{MirrorError, Result};
