//! Listing of the servable pages in the public directory.

use std::path::Path;

use tracing::error;

/// Names of the `.html` files directly inside `public_dir`, sorted.
///
/// Read failures are logged and yield an empty list.
pub async fn list_pages(public_dir: &Path) -> Vec<String> {
    let mut entries = match tokio::fs::read_dir(public_dir).await {
        Ok(entries) => entries,
        Err(e) => {
            error!(dir = %public_dir.display(), error = %e, "Error reading pages");
            return Vec::new();
        }
    };

    let mut pages = Vec::new();
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                if let Some(name) = entry.file_name().to_str() {
                    if name.ends_with(".html") {
                        pages.push(name.to_string());
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                error!(dir = %public_dir.display(), error = %e, "Error reading pages");
                break;
            }
        }
    }

    pages.sort();
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lists_only_html_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["index.html", "chat.html", "style.css", "notes.htm"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }

        assert_eq!(list_pages(dir.path()).await, vec!["chat.html", "index.html"]);
    }

    #[tokio::test]
    async fn test_missing_directory_yields_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_pages(&dir.path().join("nope")).await.is_empty());
    }
}
