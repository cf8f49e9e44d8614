use std::{
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
    time::SystemTime,
};

use crate::{FileError, MAX_FILE_BYTES};

/// Read a whole file as UTF-8, refusing anything above [`MAX_FILE_BYTES`].
pub fn read_utf8(path: &Path) -> Result<String, FileError> {
    let read_err = |source| FileError::Read {
        path: path.to_path_buf(),
        source,
    };

    let len = fs::metadata(path).map_err(read_err)?.len();
    if len > MAX_FILE_BYTES {
        return Err(FileError::TooLarge {
            path: path.to_path_buf(),
            len,
            limit: MAX_FILE_BYTES,
        });
    }

    fs::read_to_string(path).map_err(read_err)
}

/// Save `contents` to `path` by staging a sibling file and renaming it over
/// the target. A failed save leaves the previous file untouched.
pub fn write_utf8(path: &Path, contents: &str) -> Result<(), FileError> {
    let write_err = |source| FileError::Write {
        path: path.to_path_buf(),
        source,
    };

    let staged = stage_save(path, contents).map_err(write_err)?;
    fs::rename(&staged, path).map_err(|source| {
        let _ = fs::remove_file(&staged);
        write_err(source)
    })
}

/// Create `.<name>.markpane-save-<n>` beside `path` holding `contents`, synced to disk.
fn stage_save(path: &Path, contents: &str) -> io::Result<PathBuf> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "path is missing a file name")
    })?;
    let name = name.to_string_lossy();

    let seed = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |d| d.subsec_nanos())
        ^ std::process::id();

    for attempt in 0..8 {
        let staged = dir.join(format!(".{name}.markpane-save-{:x}", seed.wrapping_add(attempt)));
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&staged)
        {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err),
        };

        if let Err(err) = file
            .write_all(contents.as_bytes())
            .and_then(|()| file.sync_all())
        {
            drop(file);
            let _ = fs::remove_file(&staged);
            return Err(err);
        }
        return Ok(staged);
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        "no free name for the staged save file",
    ))
}
