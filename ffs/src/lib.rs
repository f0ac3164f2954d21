//! ffs - a tag-query filesystem
//!
//! This library catalogues real files and directories ("points") in a SQLite
//! tag store and exposes every tag combination as a directory through FUSE.
//!
//! # Layers
//!
//! - [`fuse`] - dispatch of filesystem requests onto the tag store
//! - [`inspect`] - libmagic content classification and automatic tagging
//! - [`store`] - SQLite persistence of points, tags and their joins
//!
//! The [`library`] module ties these together for catalogue maintenance:
//!
//! ```ignore
//! use std::path::Path;
//! use ffs::inspect::{Inspector, MagicClassifier};
//! use ffs::library::Library;
//! use ffs::store::Store;
//! use ffs::tag::TagEntry;
//!
//! let store = Store::open("ffs.db")?;
//! let inspector = Inspector::new(Box::new(MagicClassifier::open(None)?));
//! let mut library = Library::new(store, inspector);
//!
//! let point = library.add(Path::new("song.mp3"), &[TagEntry::valued("mood", "calm")])?;
//! ```

pub mod config;
pub mod fuse;
pub mod hash;
pub mod inspect;
pub mod library;
pub mod logging;
pub mod mount;
pub mod query;
pub mod store;
pub mod tag;

/// Version of the ffs library and CLI.
///
/// Injected from `Cargo.toml` at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
