use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use tokio::{
    fs::{self, File},
    io::{self, AsyncWriteExt},
};
use tracing::warn;

/// Replaces the file at `path` with `contents`. Readers observe either the previous document or
/// the new one, never a half written file.
pub async fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), io::Error> {
    let temp_path = temp_path_for(path);

    let written = async {
        let mut file = File::create(&temp_path).await?;
        file.write_all(contents).await?;
        file.sync_all().await
    }
    .await;

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path).await;
        return Err(e);
    }

    rename_with_fallback(&temp_path, path).await
}

/// Moves the temp file over `destination`. A failed rename leaves `destination` as it was and
/// removes the temp file.
#[cfg(not(windows))]
async fn rename_with_fallback(temp_path: &Path, destination: &Path) -> Result<(), io::Error> {
    if let Err(e) = fs::rename(temp_path, destination).await {
        warn!("Rename into {destination:?} failed: {e}");
        let _ = fs::remove_file(temp_path).await;
        return Err(e);
    }
    Ok(())
}

/// Windows can refuse to rename over an existing file, in which case the destination is removed
/// and the rename retried.
#[cfg(windows)]
async fn rename_with_fallback(temp_path: &Path, destination: &Path) -> Result<(), io::Error> {
    if let Err(initial) = fs::rename(temp_path, destination).await {
        warn!("Rename into {destination:?} failed, retrying after removal: {initial}");
        let _ = fs::remove_file(destination).await;
        if let Err(retry) = fs::rename(temp_path, destination).await {
            let _ = fs::remove_file(temp_path).await;
            return Err(io::Error::new(
                retry.kind(),
                format!("Atomic rename failed (initial: {initial}, retry: {retry})"),
            ));
        }
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::{rename_with_fallback, temp_path_for, write_atomically};

    #[tokio::test]
    async fn test_write_creates_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("habits.json");

        write_atomically(&path, b"[]").await?;

        assert_eq!(tokio::fs::read_to_string(&path).await?, "[]");
        assert!(!temp_path_for(&path).exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_write_replaces_previous_contents() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("habits.json");
        std::fs::write(&path, "a much longer previous document")?;

        write_atomically(&path, b"short").await?;

        assert_eq!(tokio::fs::read_to_string(&path).await?, "short");
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_write_into_missing_directory_fails_cleanly() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("missing").join("habits.json");

        assert!(write_atomically(&path, b"[]").await.is_err());
        assert!(!path.exists());
        assert!(!temp_path_for(&path).exists());
        Ok(())
    }

    #[cfg(not(windows))]
    #[tokio::test]
    async fn test_failed_rename_keeps_destination() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("habits.json");
        std::fs::write(&path, "previous document")?;
        let missing_temp = temp_path_for(&path);

        assert!(rename_with_fallback(&missing_temp, &path).await.is_err());
        assert_eq!(tokio::fs::read_to_string(&path).await?, "previous document");
        Ok(())
    }

    #[test]
    fn test_temp_path_sits_next_to_target() {
        let path = std::path::Path::new("/state/habitgrid/habits.json");
        assert_eq!(
            temp_path_for(path),
            std::path::PathBuf::from("/state/habitgrid/habits.json.tmp")
        );
    }
}
