//! CLI command implementations.
//!
//! - [`catalogue`] - Catalogue maintenance (add, tag, untag, find, import, ...)
//! - [`config`] - Configuration management (get, set, list, path, init)
//! - [`mount`] - Serve the catalogue through FUSE

pub mod catalogue;
pub mod config;
pub mod mount;
