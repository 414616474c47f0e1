//! Local file transfer helpers.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::info;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("invalid file name '{0}'")]
    InvalidFileName(String),
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to fetch {url}, status code: {status}")]
    Status { url: String, status: u16 },
    #[error("error writing {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error removing file {}: {source}", .path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn target_path(dir: &Path, filename: &str) -> Result<PathBuf, FileError> {
    let plain = !filename.is_empty()
        && filename != "."
        && filename != ".."
        && !filename.contains(['/', '\\']);
    if !plain {
        return Err(FileError::InvalidFileName(filename.to_string()));
    }
    Ok(dir.join(filename))
}

/// Download `url` into `dir/filename`, creating `dir` if needed.
///
/// Anything other than a complete `200 OK` body is an error and leaves no
/// file behind.
pub async fn download_from_url(
    url: &str,
    dir: impl AsRef<Path>,
    filename: &str,
) -> Result<PathBuf, FileError> {
    let dir = dir.as_ref();
    let path = target_path(dir, filename)?;
    let http_err = |source| FileError::Http {
        url: url.to_string(),
        source,
    };

    let mut response = reqwest::get(url).await.map_err(http_err)?;
    if response.status() != reqwest::StatusCode::OK {
        return Err(FileError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let write_err = |source| FileError::Write {
        path: path.clone(),
        source,
    };
    tokio::fs::create_dir_all(dir).await.map_err(write_err)?;

    // Body lands in a sibling temp file that is only renamed into place once
    // complete; dropping `partial` on any error removes it.
    let (file, partial) = tempfile::Builder::new()
        .prefix(".download-")
        .tempfile_in(dir)
        .map_err(write_err)?
        .into_parts();
    let mut file = tokio::fs::File::from_std(file);

    let mut written = 0usize;
    while let Some(chunk) = response.chunk().await.map_err(http_err)? {
        file.write_all(&chunk).await.map_err(write_err)?;
        written += chunk.len();
    }
    file.flush().await.map_err(write_err)?;
    drop(file);

    partial
        .persist(&path)
        .map_err(|e| write_err(e.error))?;

    info!(url, path = %path.display(), bytes = written, "file_downloaded");
    Ok(path)
}

/// Delete `dir/filename`.
pub async fn remove(dir: impl AsRef<Path>, filename: &str) -> Result<(), FileError> {
    let path = target_path(dir.as_ref(), filename)?;
    tokio::fs::remove_file(&path)
        .await
        .map_err(|source| FileError::Remove { path, source })
}
