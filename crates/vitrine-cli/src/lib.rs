use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use vitrine_core::models::{EntryStatus, ImageEntry, SourceFile};
use vitrine_processing::content_type_for_extension;

/// Initialize tracing for the CLI. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("vitrine=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Read a file from disk as a selected gallery file.
pub async fn read_source_file(path: &Path) -> anyhow::Result<SourceFile> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("{} has no usable file name", path.display()))?
        .to_string();
    let content_type = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(content_type_for_extension)
        .unwrap_or_default();

    Ok(SourceFile::new(file_name, content_type, data))
}

/// Printable summary of one gallery entry.
#[derive(Debug, Serialize)]
pub struct EntryReport {
    pub record_id: Option<String>,
    pub file: Option<String>,
    pub basename: Option<String>,
    pub extension: Option<String>,
    pub order: i64,
    pub status: EntryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&ImageEntry> for EntryReport {
    fn from(entry: &ImageEntry) -> Self {
        Self {
            record_id: entry.remote_id.as_ref().map(|id| id.to_string()),
            file: entry.source.as_ref().map(|source| source.file_name.clone()),
            basename: entry.basename.clone(),
            extension: entry.extension.clone(),
            order: entry.order,
            status: entry.status,
            error: entry.error_detail.clone(),
        }
    }
}

pub fn report(entries: &[ImageEntry]) -> Vec<EntryReport> {
    entries.iter().map(EntryReport::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_source_file_guesses_content_type() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("Photo.JPG");
        std::fs::write(&path, b"jpeg").unwrap();

        let file = read_source_file(&path).await.unwrap();
        assert_eq!(file.file_name, "Photo.JPG");
        assert_eq!(file.content_type, "image/jpeg");
        assert_eq!(file.len(), 4);
    }

    #[tokio::test]
    async fn read_source_file_unknown_type_is_left_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"text").unwrap();

        let file = read_source_file(&path).await.unwrap();
        assert_eq!(file.content_type, "");
    }

    #[tokio::test]
    async fn read_source_file_missing() {
        let err = read_source_file(Path::new("/definitely/not/here.png"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn report_skips_missing_error() {
        let entry = ImageEntry::pending(SourceFile::new("a.png", "image/png", vec![1u8]), 10);
        let json = serde_json::to_value(EntryReport::from(&entry)).unwrap();
        assert_eq!(json["file"], "a.png");
        assert_eq!(json["status"], "pending");
        assert!(json.get("error").is_none());
    }
}
