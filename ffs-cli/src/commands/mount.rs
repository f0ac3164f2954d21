//! Mount command - serve the catalogue as a tag filesystem.

use std::path::Path;

use tracing::info;

use ffs::mount::mount_blocking;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the mount command. Blocks until the filesystem is unmounted.
pub fn run(runner: &CliRunner, mountpoint: &Path, skip_import: bool) -> Result<(), CliError> {
    let library = runner.open_library(skip_import)?;
    let options = runner.config().mount_options();

    println!("Mounting {} at {}", runner.config().store.database.display(), mountpoint.display());
    println!("Unmount with: fusermount -u {}", mountpoint.display());
    info!(mountpoint = %mountpoint.display(), "starting FUSE session");

    mount_blocking(library.into_store(), mountpoint, &options)?;

    println!("Unmounted {}", mountpoint.display());
    Ok(())
}
