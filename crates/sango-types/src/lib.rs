//! Shared drive identity and path types for Sango.
//!
//! This crate is the foundation for the virtual filesystem layer: the
//! [`DriveKey`] identifier, `drive://` URL composition, and the exact
//! string-based path helpers the query engine splits and joins with.
//! It has **no internal sango dependencies** — a pure leaf crate that
//! other crates build on.

pub mod key;
pub mod path;
pub mod url;

pub use key::{DriveKey, KeyParseError};
pub use path::{basename, join_path, split_dir_base};
pub use url::{drive_path_url, drive_url, DRIVE_SCHEME};
