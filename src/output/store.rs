//! File-backed result store
//!
//! Layout under the output root:
//!
//! ```text
//! content/<name>.md      Markdown (optionally with front matter)
//! metadata/<name>.json   PageMetadata, pretty-printed
//! ```
//!
//! `<name>` is the URL lowercased with every other character turned into `_`, cut to
//! [`MAX_STEM_LEN`] bytes plus a hash suffix when the URL is longer than that.

use crate::config::OutputConfig;
use crate::output::{OutputResult, ResultSink};
use crate::types::{PageMetadata, ScrapingResult};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Longest file stem taken verbatim from a URL; leaves room for suffixes and extensions
pub const MAX_STEM_LEN: usize = 200;

/// Writes results as Markdown + JSON pairs
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    front_matter: bool,

    /// File stem -> URL that claimed it during this run
    claimed: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Creates the output root with its `content/` and `metadata/` subdirectories
    ///
    /// # Arguments
    ///
    /// * `root` - Output root directory
    ///
    /// # Returns
    ///
    /// * `Ok(FileStore)` - Directories exist and are ready
    /// * `Err(OutputError::Io)` - A directory could not be created
    pub fn create(root: impl AsRef<Path>) -> OutputResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("content"))?;
        fs::create_dir_all(root.join("metadata"))?;

        Ok(Self {
            root,
            front_matter: true,
            claimed: Mutex::new(HashMap::new()),
        })
    }

    /// Creates the store described by the `[output]` section
    pub fn from_config(config: &OutputConfig) -> OutputResult<Self> {
        Ok(Self::create(&config.output_dir)?.with_front_matter(config.front_matter))
    }

    pub fn with_front_matter(mut self, enabled: bool) -> Self {
        self.front_matter = enabled;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes the content and metadata files for `result`
    ///
    /// # Returns
    ///
    /// Path of the Markdown file
    pub fn save(&self, result: &ScrapingResult) -> OutputResult<PathBuf> {
        let name = self.claim(&result.metadata.url);

        let content_path = self.root.join("content").join(format!("{}.md", name));
        let body = if self.front_matter {
            format!("{}{}", front_matter(&result.metadata), result.content)
        } else {
            result.content.clone()
        };
        fs::write(&content_path, body)?;

        let metadata_path = self.root.join("metadata").join(format!("{}.json", name));
        fs::write(&metadata_path, serde_json::to_string_pretty(&result.metadata)?)?;

        tracing::debug!(url = %result.metadata.url, path = %content_path.display(), "Saved page");
        Ok(content_path)
    }

    /// Reserves a file stem for `url`
    ///
    /// A URL that sanitizes to a stem already claimed by a different URL gets an
    /// 8-hex-digit SHA-256 suffix instead of overwriting the earlier files.
    fn claim(&self, url: &str) -> String {
        let base = sanitize_filename(url);
        let mut claimed = match self.claimed.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let name = match claimed.get(&base) {
            None => base,
            Some(owner) if owner == url => return base,
            Some(owner) => {
                let name = format!("{}-{}", base, short_hash(url));
                tracing::warn!(
                    url,
                    previous = %owner,
                    file = %name,
                    "Filename collision, writing under a suffixed name"
                );
                name
            }
        };

        claimed.insert(name.clone(), url.to_string());
        name
    }
}

impl ResultSink for FileStore {
    fn persist(&self, result: &ScrapingResult) -> OutputResult<PathBuf> {
        self.save(result)
    }
}

/// Lowercases `url` and replaces every character outside `[a-z0-9]` with `_`
///
/// Stems longer than [`MAX_STEM_LEN`] are truncated and suffixed with a hash of the
/// full URL, so distinct long URLs keep distinct names.
pub fn sanitize_filename(url: &str) -> String {
    let stem: String = url
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();

    if stem.len() <= MAX_STEM_LEN {
        return stem;
    }

    // ASCII only, so any byte index is a char boundary
    format!("{}-{}", &stem[..MAX_STEM_LEN], short_hash(url))
}

fn short_hash(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    hex::encode(&digest[..4])
}

/// `---` delimited block with title, url and the optional date and category
pub fn front_matter(metadata: &PageMetadata) -> String {
    let mut block = String::from("---\n");
    block.push_str(&format!("title: {}\n", metadata.title));
    block.push_str(&format!("url: {}\n", metadata.url));
    if let Some(last_modified) = &metadata.last_modified {
        block.push_str(&format!("lastModified: {}\n", last_modified));
    }
    if let Some(category) = &metadata.category {
        block.push_str(&format!("category: {}\n", category));
    }
    block.push_str("---\n\n");
    block
}
