//! Output file handling and presigned URL streaming.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs::OpenOptions;

use crate::logs::LogDownloadError;
use crate::service::{MeshServiceClient, PresignedUrls};

/// Resolve `filename` against `cwd` and make sure it is an empty `.csv` file.
/// A missing file is created empty.
pub async fn prepare_output_file(filename: &str, cwd: &Path) -> Result<PathBuf, LogDownloadError> {
    let is_csv = Path::new(filename)
        .extension()
        .is_some_and(|ext| ext == "csv");
    if !is_csv {
        return Err(LogDownloadError::InvalidFileExtension(filename.to_string()));
    }

    let path = cwd.join(filename);
    match tokio::fs::metadata(&path).await {
        Ok(metadata) if metadata.len() > 0 => Err(LogDownloadError::FileNotEmpty(filename.to_string())),
        Ok(_) => Ok(path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tokio::fs::write(&path, "").await?;
            tracing::debug!(path = %path.display(), "Created log output file");
            Ok(path)
        }
        Err(e) => Err(e.into()),
    }
}

/// Fail when the window holds no logs.
pub fn ensure_logs_available(urls: &PresignedUrls) -> Result<(), LogDownloadError> {
    if urls.total_size == 0 || urls.presigned_urls.is_empty() {
        return Err(LogDownloadError::NoLogs);
    }
    Ok(())
}

/// Human readable size for the download confirmation.
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let bytes_f = bytes as f64;
    if bytes_f >= MB {
        format!("{:.2} MB", bytes_f / MB)
    } else if bytes_f >= KB {
        format!("{:.2} KB", bytes_f / KB)
    } else {
        format!("{bytes} bytes")
    }
}

/// Append every presigned URL, in order, to `path` within `timeout`.
pub async fn download_logs(
    client: &MeshServiceClient,
    urls: &PresignedUrls,
    path: &Path,
    timeout: Duration,
) -> Result<u64, LogDownloadError> {
    let download = async {
        let mut file = OpenOptions::new().append(true).open(path).await?;
        let mut total = 0;
        for entry in &urls.presigned_urls {
            tracing::debug!(key = %entry.key, "Downloading log chunk");
            total += client.download(&entry.url, &mut file).await?;
        }
        Ok::<u64, LogDownloadError>(total)
    };

    tokio::time::timeout(timeout, download)
        .await
        .map_err(|_| LogDownloadError::TimedOut)?
}
