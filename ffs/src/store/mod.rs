//! SQLite persistence for points, tags and the joins between them.
//!
//! The store is the only component that talks SQL. Everything above it
//! works with [`Point`], [`Tag`] and [`TagEntry`](crate::tag::TagEntry).

mod db;
mod error;
mod models;
mod schema;

pub use db::Store;
pub use error::{StoreError, StoreResult};
pub use models::{parse_point_file_name, NewPoint, Point, Tag};
