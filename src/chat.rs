//! Free-form chat about the current page, with transcripts kept per host

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use scraper::Html;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::interpreter::{Interpreter, dom};
use crate::types::FieldKind;

/// Number of transcript entries sent along with a new message
pub const HISTORY_CONTEXT_LEN: usize = 10;

/// Maximum characters of page text sent as context
pub const PAGE_TEXT_CAP: usize = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatEntry {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// What the backend learns about the page alongside a chat message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageContext {
    pub page_title: String,
    pub page_url: String,
    pub page_text: String,
    /// Control name to current value
    pub form_data: BTreeMap<String, String>,
}

impl PageContext {
    pub fn from_snapshot(html: &Html, page_url: &str, interpreter: &Interpreter) -> Self {
        let page_text = html
            .select(&dom::BODY)
            .next()
            .map(dom::plain_text)
            .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
            .map(|t| t.chars().take(PAGE_TEXT_CAP).collect::<String>())
            .unwrap_or_default();

        Self {
            page_title: dom::page_title(html),
            page_url: page_url.to_string(),
            page_text,
            form_data: form_data(html, interpreter),
        }
    }
}

/// Current values of named controls; unchecked boxes and passwords are left out
fn form_data(html: &Html, interpreter: &Interpreter) -> BTreeMap<String, String> {
    let mut data = BTreeMap::new();

    for control in html.select(&dom::CONTROLS) {
        let Some(field) = interpreter.describe(control) else {
            continue;
        };
        let Some(name) = dom::attr_nonempty(control, "name") else {
            continue;
        };

        let value = match field.kind {
            FieldKind::RadioGroup | FieldKind::Checkbox => {
                if dom::attr(control, "checked").is_none() {
                    continue;
                }
                dom::attr(control, "value").unwrap_or("on").to_string()
            }
            FieldKind::Select => match control
                .select(&dom::OPTIONS)
                .find(|o| dom::attr(*o, "selected").is_some())
            {
                Some(option) => dom::attr(option, "value")
                    .map(str::to_string)
                    .unwrap_or_else(|| option.text().collect::<String>().trim().to_string()),
                None => continue,
            },
            FieldKind::Textarea => control.text().collect::<String>(),
            FieldKind::Text | FieldKind::Date => {
                if dom::input_type(control) == "password" {
                    continue;
                }
                dom::attr(control, "value").unwrap_or_default().to_string()
            }
        };

        if !value.trim().is_empty() {
            data.insert(name.to_string(), value.trim().to_string());
        }
    }

    data
}

/// Body of `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub page_context: PageContext,
    pub chat_history: Vec<ChatEntry>,
}

/// Backend answer to a chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Host name a transcript is filed under
pub fn transcript_key(page_url: &str) -> String {
    url::Url::parse(page_url)
        .ok()
        .and_then(|u| u.host_str().filter(|h| !h.is_empty()).map(str::to_string))
        .unwrap_or_else(|| "local".to_string())
}

/// Stores chat transcripts as JSON files, one per host
pub struct ChatStore {
    chats_dir: PathBuf,
}

impl ChatStore {
    pub fn new() -> Result<Self> {
        let home_dir = dirs::home_dir().context("Unable to determine home directory")?;
        Self::with_dir(home_dir.join(".formaid").join("chats"))
    }

    pub fn with_dir(chats_dir: impl Into<PathBuf>) -> Result<Self> {
        let chats_dir = chats_dir.into();
        fs::create_dir_all(&chats_dir)
            .with_context(|| format!("Failed to create {}", chats_dir.display()))?;
        Ok(ChatStore { chats_dir })
    }

    fn path_for(&self, host: &str) -> PathBuf {
        let safe: String = host
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.chats_dir.join(format!("{}.json", safe))
    }

    /// Load the transcript for `host` (empty if none exists yet)
    pub fn open(&self, host: &str) -> Result<Transcript> {
        let path = self.path_for(host);
        let entries: Vec<ChatEntry> = if path.exists() {
            let json = fs::read_to_string(&path)?;
            serde_json::from_str(&json)
                .with_context(|| format!("Corrupt transcript at {}", path.display()))?
        } else {
            Vec::new()
        };

        debug!("Loaded {} chat entries for {}", entries.len(), host);
        Ok(Transcript {
            host: host.to_string(),
            path,
            entries,
        })
    }

    /// Delete the transcript for `host`; returns whether one existed
    pub fn clear(&self, host: &str) -> Result<bool> {
        let path = self.path_for(host);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        info!("Cleared chat history for {}", host);
        Ok(true)
    }

    /// Hosts that have a stored transcript
    pub fn hosts(&self) -> Result<Vec<String>> {
        let mut hosts = Vec::new();
        for entry in fs::read_dir(&self.chats_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                hosts.push(stem.to_string());
            }
        }
        hosts.sort();
        Ok(hosts)
    }
}

/// An append-only transcript loaded once per session
#[derive(Debug)]
pub struct Transcript {
    host: String,
    path: PathBuf,
    entries: Vec<ChatEntry>,
}

impl Transcript {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    /// The most recent entries, oldest first, as sent to the backend
    pub fn context(&self) -> Vec<ChatEntry> {
        let start = self.entries.len().saturating_sub(HISTORY_CONTEXT_LEN);
        self.entries[start..].to_vec()
    }

    /// Append an entry and persist the transcript
    pub fn push(&mut self, entry: ChatEntry) -> Result<()> {
        self.entries.push(entry);
        write_entries(&self.path, &self.entries)
    }
}

fn write_entries(path: &Path, entries: &[ChatEntry]) -> Result<()> {
    let json = serde_json::to_string_pretty(entries)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;
