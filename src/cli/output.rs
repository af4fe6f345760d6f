//! Emission of generated configurations.

use crate::error::Result;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};

/// Writes `contents` to `path`, creating parent directories as needed.
pub async fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let file = fs::File::create(path).await?;
    let mut writer = BufWriter::new(file);
    writer.write_all(contents.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Writes `contents` to `path`, or to stdout when no path is given.
pub async fn emit(path: Option<&Path>, contents: &str) -> Result<()> {
    match path {
        Some(path) => {
            write_file(path, contents).await?;
            log::info!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(contents.as_bytes()).await?;
            if !contents.ends_with('\n') {
                stdout.write_all(b"\n").await?;
            }
            stdout.flush().await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("configs.json");
        write_file(&path, "[]").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }
}
