//! Mounting the tag filesystem.

use std::io;
use std::path::{Path, PathBuf};

use fuser::MountOption;
use thiserror::Error;
use tracing::info;

use crate::fuse::{AttrTemplate, FfsFilesystem};
use crate::store::Store;

/// Options passed to the FUSE mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountOptions {
    /// Filesystem name shown in the mount table
    pub fs_name: String,
    /// Let root access the mount as well as the mounting user
    pub allow_root: bool,
    /// Unmount automatically when the process exits
    pub auto_unmount: bool,
    /// Mount read-only
    pub read_only: bool,
}

impl Default for MountOptions {
    fn default() -> Self {
        Self {
            fs_name: "ffs".to_string(),
            allow_root: false,
            auto_unmount: false,
            read_only: false,
        }
    }
}

impl MountOptions {
    /// The equivalent `fuser` mount options.
    pub fn to_fuser(&self) -> Vec<MountOption> {
        let mut options = vec![MountOption::FSName(self.fs_name.clone())];
        if self.allow_root {
            options.push(MountOption::AllowRoot);
        }
        if self.auto_unmount {
            options.push(MountOption::AutoUnmount);
        }
        if self.read_only {
            options.push(MountOption::RO);
        }
        options
    }
}

/// Errors mounting the filesystem.
#[derive(Debug, Error)]
pub enum MountError {
    #[error("mountpoint {} does not exist", .0.display())]
    MissingMountpoint(PathBuf),

    #[error("mountpoint {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// The FUSE session failed to start or ended with an error
    #[error("FUSE session on {} failed: {source}", .mountpoint.display())]
    Session {
        mountpoint: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn check_mountpoint(mountpoint: &Path) -> Result<AttrTemplate, MountError> {
    if !mountpoint.exists() {
        return Err(MountError::MissingMountpoint(mountpoint.to_path_buf()));
    }
    if !mountpoint.is_dir() {
        return Err(MountError::NotADirectory(mountpoint.to_path_buf()));
    }

    AttrTemplate::from_mountpoint(mountpoint).map_err(|source| MountError::Session {
        mountpoint: mountpoint.to_path_buf(),
        source,
    })
}

/// Mount the store at `mountpoint` and serve requests until unmounted.
///
/// Blocks the calling thread for the lifetime of the mount (e.g. until
/// `fusermount -u`).
pub fn mount_blocking(
    store: Store,
    mountpoint: &Path,
    options: &MountOptions,
) -> Result<(), MountError> {
    let attrs = check_mountpoint(mountpoint)?;
    let filesystem = FfsFilesystem::new(store, attrs);

    info!(mountpoint = %mountpoint.display(), options = ?options, "mounting");

    fuser::mount2(filesystem, mountpoint, &options.to_fuser()).map_err(|source| {
        MountError::Session {
            mountpoint: mountpoint.to_path_buf(),
            source,
        }
    })?;

    info!(mountpoint = %mountpoint.display(), "unmounted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = MountOptions::default().to_fuser();
        assert_eq!(options, vec![MountOption::FSName("ffs".to_string())]);
    }

    #[test]
    fn test_all_options() {
        let options = MountOptions {
            fs_name: "tags".to_string(),
            allow_root: true,
            auto_unmount: true,
            read_only: true,
        }
        .to_fuser();

        assert_eq!(
            options,
            vec![
                MountOption::FSName("tags".to_string()),
                MountOption::AllowRoot,
                MountOption::AutoUnmount,
                MountOption::RO,
            ]
        );
    }

    #[test]
    fn test_mountpoint_checks() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("file");
        std::fs::write(&file, b"").unwrap();

        assert!(matches!(
            check_mountpoint(&temp.path().join("missing")),
            Err(MountError::MissingMountpoint(_))
        ));
        assert!(matches!(
            check_mountpoint(&file),
            Err(MountError::NotADirectory(_))
        ));
        assert!(check_mountpoint(temp.path()).is_ok());
    }

    #[test]
    fn test_mount_rejects_missing_mountpoint() {
        let temp = tempfile::tempdir().unwrap();
        let store = Store::in_memory().unwrap();
        let result = mount_blocking(store, &temp.path().join("nope"), &MountOptions::default());
        assert!(matches!(result, Err(MountError::MissingMountpoint(_))));
    }
}
