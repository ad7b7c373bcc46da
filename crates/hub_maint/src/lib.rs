#![forbid(unsafe_code)]

pub mod cli;
pub mod color;
pub mod doctor;
pub mod error;
pub mod icons;
pub mod preset;
pub mod recolor;
pub mod seed;
pub mod summary;
pub mod themes;
pub mod util;

pub use cli::run_from_env;
pub use error::{MaintError, Result};
