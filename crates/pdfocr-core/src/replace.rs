//! Replacing files through a temporary sibling and a rename.

use std::fs;
use std::io;
use std::path::Path;

use tempfile::NamedTempFile;

/// Create a temporary file in the directory `destination` will live in.
///
/// On unix the file is requested with mode 0666 so the process umask applies,
/// as it would for a plain `File::create`.
pub(crate) fn sibling_temp(destination: &Path) -> io::Result<NamedTempFile> {
    let dir = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut builder = tempfile::Builder::new();
    builder.prefix(".pdfocr-").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}

/// Move `temp` over `destination`. An existing destination keeps its
/// permissions.
pub(crate) fn persist(temp: NamedTempFile, destination: &Path) -> io::Result<()> {
    if let Ok(metadata) = fs::metadata(destination) {
        temp.as_file().set_permissions(metadata.permissions())?;
    }
    temp.persist(destination).map_err(|e| e.error)?;
    Ok(())
}
