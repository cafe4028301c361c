use crate::error::{HarnessError, Result};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Open a file and map it into memory (read-only)
pub fn mmap_file(path: &Path) -> Result<Mmap> {
    let file = File::open(path).map_err(HarnessError::IoError)?;
    let mmap = unsafe { Mmap::map(&file).map_err(HarnessError::IoError)? };
    Ok(mmap)
}

/// Byte-exact comparison of two files.
///
/// Missing or unreadable files are errors, not mismatches.
pub fn files_identical(a: &Path, b: &Path) -> Result<bool> {
    let len_a = std::fs::metadata(a)
        .map_err(|_| HarnessError::FileNotFound(a.display().to_string()))?
        .len();
    let len_b = std::fs::metadata(b)
        .map_err(|_| HarnessError::FileNotFound(b.display().to_string()))?
        .len();

    if len_a != len_b {
        return Ok(false);
    }
    // empty files cannot be mapped
    if len_a == 0 {
        return Ok(true);
    }

    let map_a = mmap_file(a)?;
    let map_b = mmap_file(b)?;
    Ok(map_a[..] == map_b[..])
}
