use crate::crawler::CrawlOutput;
use crate::output::traits::{CorpusSink, OutputResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Writes the whole corpus as one pretty-printed JSON document
///
/// The document maps each URL to its page record.
pub struct JsonCorpusSink {
    path: PathBuf,
}

impl JsonCorpusSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CorpusSink for JsonCorpusSink {
    fn name(&self) -> &'static str {
        "json"
    }

    async fn export(&self, output: &CrawlOutput) -> OutputResult<()> {
        let json = serde_json::to_vec_pretty(&output.corpus)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, json).await?;

        tracing::info!(
            "Wrote {} pages to {}",
            output.corpus.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Corpus, Page};
    use crate::crawler::CrawlReport;

    #[tokio::test]
    async fn test_writes_corpus_keyed_by_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scraped_data.json");

        let mut child = Page::new_file("https://example.org/forms/jury.pdf", "jury.pdf", "");
        child.add_parent("https://example.org/root");
        let root = Page::new_page(
            "https://example.org/root",
            "Root",
            "root body",
            vec!["https://example.org/forms/jury.pdf".to_string()],
        );
        let corpus: Corpus = vec![root, child].into_iter().collect();
        let output = CrawlOutput {
            corpus,
            report: CrawlReport::default(),
        };

        JsonCorpusSink::new(&path).export(&output).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let file = &value["https://example.org/forms/jury.pdf"];
        assert_eq!(file["isFile"], serde_json::json!(true));
        assert_eq!(file["text"], serde_json::json!(""));
        assert_eq!(file["child_pages"], serde_json::json!([]));
        assert_eq!(
            file["parent_pages"],
            serde_json::json!(["https://example.org/root"])
        );
        assert_eq!(
            value["https://example.org/root"]["child_pages"],
            serde_json::json!(["https://example.org/forms/jury.pdf"])
        );
    }

    #[tokio::test]
    async fn test_written_corpus_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scraped_data.json");
        let corpus: Corpus = vec![Page::new_page(
            "https://example.org/root",
            "Root",
            "root body",
            Vec::new(),
        )]
        .into_iter()
        .collect();
        let output = CrawlOutput {
            corpus: corpus.clone(),
            report: CrawlReport::default(),
        };

        JsonCorpusSink::new(&path).export(&output).await.unwrap();

        let restored: Corpus =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(restored, corpus);
    }
}
