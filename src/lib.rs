//! Asset porting library.
//!
//! Ports a mesh asset authored for one game's renderer onto another game's
//! fixed material catalog and vertex layout rules.

pub mod asset;
pub mod convert;
pub mod document;
pub mod error;
pub mod logging;
pub mod project;
pub mod texture;

pub use error::ConvertError;
pub use logging::{LogLevel, ResultExt, init_logging, send_log};
