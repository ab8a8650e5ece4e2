use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{error, info};

use crate::tokenize::tokenize;

/// Default cap on dictionary hits forwarded to the model.
pub const DEFAULT_MAX_HITS: usize = 600;

/// One Polish → Slovian mapping from the word list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub pl: String,
    pub sl: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// The word list in load order plus a lookup index over single-word Polish
/// terms. Built once at startup, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: Vec<DictionaryEntry>,
    single_word: HashMap<String, usize>,
}

impl Dictionary {
    pub fn from_entries(entries: Vec<DictionaryEntry>) -> Self {
        let mut dictionary = Self {
            entries,
            single_word: HashMap::new(),
        };
        dictionary.rebuild_index();
        dictionary
    }

    /// Reads the dictionary file. A missing or malformed file yields an
    /// empty dictionary so the server stays reachable without it.
    pub fn load(path: &Path) -> Self {
        match read_entries(path) {
            Ok(entries) => {
                info!(
                    "loaded {} dictionary entries from {}",
                    entries.len(),
                    path.display()
                );
                Self::from_entries(entries)
            }
            Err(err) => {
                error!("cannot load dictionary {}: {:#}", path.display(), err);
                Self::default()
            }
        }
    }

    /// Full-replace rebuild of the single-word index. Multi-word terms are
    /// not indexed; on duplicate keys the entry loaded last wins.
    fn rebuild_index(&mut self) {
        self.single_word.clear();
        for (position, entry) in self.entries.iter().enumerate() {
            let key = entry.pl.trim().to_lowercase();
            if !key.is_empty() && !key.contains(char::is_whitespace) {
                self.single_word.insert(key, position);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a normalized (trimmed, lowercased) single word.
    pub fn lookup(&self, word: &str) -> Option<&DictionaryEntry> {
        self.single_word
            .get(word)
            .map(|&position| &self.entries[position])
    }

    /// Collects the entries matching the unique words of `text`, in
    /// first-occurrence order. Each normalized word is probed once; the
    /// result never holds more than `max_hits` entries.
    pub fn collect_hits(&self, text: &str, max_hits: usize) -> Vec<&DictionaryEntry> {
        let mut seen = HashSet::new();
        let mut hits = Vec::new();
        for token in tokenize(text) {
            if hits.len() >= max_hits {
                break;
            }
            if !token.chars().any(char::is_alphabetic) {
                continue;
            }
            let word = token.to_lowercase();
            if !seen.insert(word.clone()) {
                continue;
            }
            if let Some(entry) = self.lookup(&word) {
                hits.push(entry);
            }
        }
        hits
    }
}

fn read_entries(path: &Path) -> Result<Vec<DictionaryEntry>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}
