//! Lyric store: flat CSV word cache with online fallback
//!
//! The cache is one append-only CSV file with a header row and the columns
//! `id, titulo, artista, palavra`: one row per reference word, ids
//! 1-based per cached set. A re-fetch appends a fresh full set under the
//! same title; `lookup` returns only the first matching set (delimited by
//! the id sequence restarting).
//!
//! A read failure on the cache is a soft miss by design: it triggers
//! online retrieval instead of failing the request.

use crate::providers::LyricProvider;
use crate::types::ReferenceWord;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub struct LyricStore {
    cache_path: PathBuf,
    provider: Arc<dyn LyricProvider>,
    /// Serializes cache access: appends are whole sets, and readers must
    /// never observe a half-written one.
    file_lock: Mutex<()>,
}

impl LyricStore {
    pub fn new(cache_path: impl Into<PathBuf>, provider: Arc<dyn LyricProvider>) -> Self {
        Self {
            cache_path: cache_path.into(),
            provider,
            file_lock: Mutex::new(()),
        }
    }

    /// Resolve the reference word list for a song: cache first, then the
    /// online provider. `None` means the lyrics could not be found anywhere.
    pub async fn resolve(&self, title: &str, artist: &str) -> Result<Option<Vec<String>>> {
        if let Some(words) = self.lookup(title).await {
            debug!(title = %title, words = words.len(), "Lyrics served from cache");
            return Ok(Some(words));
        }

        info!(title = %title, artist = %artist, "Lyrics not cached, querying provider");
        self.fetch_and_cache(title, artist).await
    }

    /// Case-insensitive exact title match against the cache. Absent or
    /// unreadable cache files are treated as a miss.
    pub async fn lookup(&self, title: &str) -> Option<Vec<String>> {
        let _guard = self.file_lock.lock().await;
        match self.read_first_set(title) {
            Ok(found) => found,
            Err(err) => {
                warn!(
                    cache = %self.cache_path.display(),
                    error = %err,
                    "Lyric cache unreadable, treating as miss"
                );
                None
            }
        }
    }

    /// Query the online provider and append the tokenized word set to the
    /// cache. Returns `None` (writing nothing) when the provider has no
    /// match or the lyric tokenizes to zero words.
    pub async fn fetch_and_cache(&self, title: &str, artist: &str) -> Result<Option<Vec<String>>> {
        let lyrics = self
            .provider
            .search_lyrics(title, artist)
            .await
            .with_context(|| format!("lyric provider failed for '{}'", title))?;

        let Some(text) = lyrics else {
            info!(title = %title, "Lyric provider found no match");
            return Ok(None);
        };

        let words: Vec<ReferenceWord> = tokenize_words(&text)
            .into_iter()
            .enumerate()
            .map(|(index, text)| ReferenceWord {
                position: index + 1,
                text,
            })
            .collect();
        if words.is_empty() {
            warn!(title = %title, "Lyric text tokenized to zero words, not caching");
            return Ok(None);
        }

        let _guard = self.file_lock.lock().await;
        self.append_set(title, artist, &words)
            .with_context(|| format!("appending lyric set for '{}'", title))?;
        info!(title = %title, words = words.len(), "Lyric set cached");

        Ok(Some(words.into_iter().map(|word| word.text).collect()))
    }

    fn read_first_set(&self, title: &str) -> Result<Option<Vec<String>>> {
        if !self.cache_path.exists() {
            return Ok(None);
        }

        let wanted = title.to_lowercase();
        let mut reader = csv::Reader::from_path(&self.cache_path)?;
        let mut words: Vec<ReferenceWord> = Vec::new();

        for record in reader.records() {
            let record = record?;
            let position: usize = record
                .get(0)
                .and_then(|field| field.parse().ok())
                .unwrap_or(0);
            let row_title = record.get(1).unwrap_or("");
            let text = record.get(3).unwrap_or("");

            if row_title.to_lowercase() == wanted && position == words.len() + 1 {
                words.push(ReferenceWord {
                    position,
                    text: text.to_string(),
                });
            } else if !words.is_empty() {
                // Sets are contiguous and 1-based: the first row that does
                // not continue the id sequence ends the first matching set.
                break;
            }
        }

        if words.is_empty() {
            Ok(None)
        } else {
            Ok(Some(words.into_iter().map(|word| word.text).collect()))
        }
    }

    fn append_set(&self, title: &str, artist: &str, words: &[ReferenceWord]) -> Result<()> {
        if let Some(parent) = self.cache_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let write_header = !self.cache_path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.cache_path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if write_header {
            writer.write_record(["id", "titulo", "artista", "palavra"])?;
        }

        for word in words {
            let id = word.position.to_string();
            writer.write_record([id.as_str(), title, artist, word.text.as_str()])?;
        }

        writer.flush()?;
        Ok(())
    }
}

/// Split lyric text into words: maximal alphanumeric runs, allowing one
/// internal apostrophe ("don't" is a single word).
pub fn tokenize_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_alphanumeric() {
            current.push(c);
        } else if c == '\''
            && !current.is_empty()
            && !current.contains('\'')
            && chars.peek().map_or(false, |next| next.is_alphanumeric())
        {
            current.push(c);
        } else if !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        words.push(current);
    }

    words
}
