// HTTP download of release archives.
//
// One job: fetch the bytes at a URL into a local file. Retry policy lives
// with the version-metadata fetch, not here; a failed archive download is
// surfaced immediately.

use std::fs::File;
use std::io;
use std::path::Path;

use colored::Colorize;

use crate::errors::{Error, Result};
use crate::log_debug;

/// Downloads `url` into `dest`, streaming the body straight to disk.
///
/// `dest` must not already exist: a leftover file at the destination means a
/// previous partial download, and silently overwriting it could mask a
/// corrupted earlier attempt. Callers stage downloads in unique temporary
/// directories, so a collision is always a bug worth surfacing.
pub fn download_file(url: &str, dest: &Path) -> Result<()> {
    if dest.exists() {
        return Err(Error::DownloadCollision(dest.to_path_buf()));
    }

    log_debug!("[Download] Starting download from URL: {}", url.blue());

    let response = ureq::get(url)
        .set("User-Agent", &crate::user_agent())
        .call()
        .map_err(|e| Error::Download {
            url: url.to_string(),
            detail: e.to_string(),
        })?;

    let mut file = File::create(dest)
        .map_err(|e| Error::io(format!("failed to create {}", dest.display()), e))?;

    let mut reader = response.into_reader();
    io::copy(&mut reader, &mut file).map_err(|e| Error::Download {
        url: url.to_string(),
        detail: format!("failed while writing response body: {e}"),
    })?;

    log_debug!(
        "[Download] File downloaded successfully to {}",
        dest.to_string_lossy().green()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    #[test]
    fn refuses_to_overwrite_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("archive.tar.gz");
        std::fs::write(&dest, b"partial").unwrap();

        let err = download_file("https://example.com/archive.tar.gz", &dest).unwrap_err();
        match err {
            Error::DownloadCollision(path) => assert_eq!(path, dest),
            other => panic!("expected DownloadCollision, got {other:?}"),
        }
    }
}
