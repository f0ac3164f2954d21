//! FUSE view of the tag store.
//!
//! Every directory below the mount root is a tag query; its entries are the
//! matching points (symlinks named `name.id`) and the tags that narrow the
//! match further. An `@flatten` directory presents the same points as a
//! hierarchy of their remaining tags, suitable for copying out as a store
//! directory.
//!
//! # Implementations
//!
//! - [`View`] - path resolution and listing against the store
//! - [`FfsFilesystem`] - the `fuser` adapter serving a [`View`]

mod attributes;
mod filesystem;
mod inode;
mod path;
mod view;

pub use attributes::{AttrTemplate, DIRECTORY_PERM, INFO_FILE_PERM, LINK_PERM};
pub use filesystem::FfsFilesystem;
pub use inode::{HandleTable, InodeTable, ROOT_INODE};
pub use path::{path_names, ParsedPath, FLATTEN_NAME};
pub use view::{Entry, Node, View, ViewError, ViewResult};
