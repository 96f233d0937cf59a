use crate::corpus::Page;
use crate::crawler::{CrawlOutput, Fetcher};
use crate::output::traits::{CorpusSink, OutputError, OutputResult};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Suffix of every sidecar file
const SIDECAR_SUFFIX: &str = ".metadata.json";

/// Longest base64 key used verbatim; longer URLs are keyed by their SHA-256
const MAX_KEY_LEN: usize = 128;

/// Longest title suffix on a file record, in bytes
const MAX_TITLE_LEN: usize = 96;

/// Body of a page record
#[derive(Debug, Serialize)]
struct PageRecord<'a> {
    url: &'a str,
    title: &'a str,
    text: &'a str,
    source: &'a str,
}

/// Writes one blob-style record per corpus entry into a directory
///
/// Records are keyed by the URL-safe, unpadded base64 encoding of the URL,
/// or its hex SHA-256 when that encoding would not fit a file name. Pages become `<key>.json`; files become `<key>_<title>` holding the raw
/// bytes, downloaded again through the fetcher. Each record gets a
/// `<record>.metadata.json` sidecar of string values.
pub struct ExportDirSink {
    dir: PathBuf,
    source: String,
    fetcher: Arc<dyn Fetcher>,
}

impl ExportDirSink {
    pub fn new(dir: impl Into<PathBuf>, source: impl Into<String>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            dir: dir.into(),
            source: source.into(),
            fetcher,
        }
    }

    /// Name of the record a page is written to
    pub fn record_name(page: &Page) -> String {
        let key = record_key(&page.url);
        if page.is_file {
            format!("{}_{}", key, sanitize_file_name(&page.title))
        } else {
            format!("{}.json", key)
        }
    }

    /// Sidecar metadata for a record
    ///
    /// Lists are rendered as JSON arrays so every value stays a plain string.
    pub fn metadata(&self, page: &Page) -> OutputResult<BTreeMap<&'static str, String>> {
        let mut metadata = BTreeMap::new();
        metadata.insert("url", page.url.clone());
        metadata.insert("title", page.title.clone());
        metadata.insert("parent_pages", serde_json::to_string(&page.parent_pages)?);
        metadata.insert("child_pages", serde_json::to_string(&page.child_links)?);
        metadata.insert("isFile", page.is_file.to_string());
        metadata.insert("source", self.source.clone());
        Ok(metadata)
    }

    async fn write_record(&self, page: &Page) -> OutputResult<bool> {
        let name = Self::record_name(page);
        let path = self.dir.join(&name);

        let body = if page.is_file {
            match self.fetcher.fetch(&page.url).await {
                Ok(resource) => resource.body,
                Err(e) => {
                    tracing::warn!("Skipping export of {}: {}", e.url(), e);
                    return Ok(false);
                }
            }
        } else {
            serde_json::to_vec(&PageRecord {
                url: &page.url,
                title: &page.title,
                text: &page.text,
                source: &self.source,
            })?
        };

        tokio::fs::write(&path, body).await?;
        let metadata = serde_json::to_vec_pretty(&self.metadata(page)?)?;
        tokio::fs::write(sidecar_path(&path)?, metadata).await?;

        tracing::debug!("Exported {} as {}", page.url, name);
        Ok(true)
    }
}

#[async_trait]
impl CorpusSink for ExportDirSink {
    fn name(&self) -> &'static str {
        "export-dir"
    }

    async fn export(&self, output: &CrawlOutput) -> OutputResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let mut written = 0usize;
        for page in output.corpus.pages() {
            if self.write_record(page).await? {
                written += 1;
            }
        }

        tracing::info!(
            "Exported {} of {} records to {}",
            written,
            output.corpus.len(),
            self.dir.display()
        );
        Ok(())
    }
}

/// Record key of a URL
///
/// The URL-safe, unpadded base64 encoding of the URL, or the hex SHA-256 of
/// the URL once the encoding grows past `MAX_KEY_LEN`.
pub fn record_key(url: &str) -> String {
    let key = URL_SAFE_NO_PAD.encode(url.as_bytes());
    if key.len() <= MAX_KEY_LEN {
        key
    } else {
        hex::encode(Sha256::digest(url.as_bytes()))
    }
}

fn sanitize_file_name(title: &str) -> String {
    let mut cleaned = String::new();
    for c in title.chars() {
        let c = match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        };
        if cleaned.len() + c.len_utf8() > MAX_TITLE_LEN {
            break;
        }
        cleaned.push(c);
    }
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

fn sidecar_path(record: &Path) -> OutputResult<PathBuf> {
    let name = record
        .file_name()
        .ok_or_else(|| OutputError::Write(format!("invalid record path {}", record.display())))?;
    let mut sidecar = name.to_os_string();
    sidecar.push(SIDECAR_SUFFIX);
    Ok(record.with_file_name(sidecar))
}

/// Sidecar metadata of one exported record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedRecord {
    /// Record file name, without the sidecar suffix
    pub name: String,
    pub metadata: BTreeMap<String, String>,
}

impl ExportedRecord {
    pub fn is_file(&self) -> bool {
        self.metadata.get("isFile").map(String::as_str) == Some("true")
    }

    /// Parent URLs decoded from the `parent_pages` value
    pub fn parent_pages(&self) -> Vec<String> {
        self.metadata
            .get("parent_pages")
            .and_then(|value| serde_json::from_str(value).ok())
            .unwrap_or_default()
    }
}

/// Reads every sidecar in an export directory, ordered by record name
pub fn read_export_metadata(dir: &Path) -> OutputResult<Vec<ExportedRecord>> {
    let mut records = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let file_name = entry?.file_name();
        let file_name = file_name.to_string_lossy();
        let Some(name) = file_name.strip_suffix(SIDECAR_SUFFIX) else {
            continue;
        };

        let raw = std::fs::read_to_string(dir.join(&*file_name))?;
        records.push(ExportedRecord {
            name: name.to_string(),
            metadata: serde_json::from_str(&raw)?,
        });
    }
    records.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(records)
}

/// Prints the records of an export directory
pub fn print_export_metadata(dir: &Path, records: &[ExportedRecord]) {
    let files = records.iter().filter(|r| r.is_file()).count();

    println!("=== Export Directory ===\n");
    println!("Directory: {}", dir.display());
    println!("Records: {} ({} pages, {} files)", records.len(), records.len() - files, files);

    for record in records {
        let kind = if record.is_file() { "file" } else { "page" };
        let url = record.metadata.get("url").map(String::as_str).unwrap_or("?");
        let title = record.metadata.get("title").map(String::as_str).unwrap_or("");
        println!("\n  [{}] {}", kind, url);
        if !title.is_empty() {
            println!("    Title: {}", title);
        }
        println!("    Record: {}", record.name);
        let parents = record.parent_pages();
        if !parents.is_empty() {
            println!("    Parents: {}", parents.join(", "));
        }
    }
}
