//! Content hashing of points.
//!
//! A file is hashed over its bytes. A directory is hashed over the bytes of
//! every regular file beneath it, visited in file-name order so the result
//! does not depend on the order the filesystem returns entries.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

fn feed_file(hasher: &mut Sha256, path: &Path) -> io::Result<()> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(())
}

/// Hash a file or directory.
///
/// Returns the SHA-256 as a lowercase hex string and whether the path is a
/// directory.
pub fn hash_path<P: AsRef<Path>>(path: P) -> io::Result<(String, bool)> {
    let path = path.as_ref();
    let is_dir = std::fs::metadata(path)?.is_dir();
    let mut hasher = Sha256::new();

    if is_dir {
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            if entry.file_type().is_file() {
                feed_file(&mut hasher, entry.path())?;
            }
        }
    } else {
        feed_file(&mut hasher, path)?;
    }

    Ok((format!("{:x}", hasher.finalize()), is_dir))
}
