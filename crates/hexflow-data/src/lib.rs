//! Hexflow Data -- builds a [`Factory`] from a text save file.
//!
//! [`load`] reads the sections in order, places every cell along the grid's
//! row walk and then applies the wiring lines. Any structural problem is a
//! [`FormatError`] carrying the offending line number.
//!
//! [`Factory`]: hexflow_spatial::Factory

pub mod error;
pub mod loader;
pub mod wiring;

pub use error::{FormatError, FormatErrorKind, LoadError};
pub use loader::{load, load_path, load_str};
pub use wiring::{WiringContext, WiringLine};
