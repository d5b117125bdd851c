//! Source link rendering
//!
//! Builds the titled block of citation links shown under an assistant
//! reply. URLs are taken as the backend sends them; nothing is
//! deduplicated or validated. Entries without a URL still occupy their
//! slot in the first `max` and are skipped when links are built.

use serde::{Deserialize, Serialize};

/// Relationship attached to every source link so the opened page gets no
/// handle back to the chat
pub const LINK_REL: &str = "noopener noreferrer";

/// One source entry as returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Address of the cited page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Excerpt the answer was grounded on, when the backend sends one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl SourceEntry {
    /// Create an entry with only a URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            snippet: None,
        }
    }

    /// Read an entry from one item of the reply's `sources` array
    ///
    /// Never fails: a non-object item, or a `url`/`snippet` that is not a
    /// string, reads as absent.
    pub fn from_value(item: &serde_json::Value) -> Self {
        let text = |key: &str| item.get(key).and_then(|v| v.as_str()).map(str::to_string);
        Self {
            url: text("url"),
            snippet: text("snippet"),
        }
    }
}

/// A rendered link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLink {
    /// Link target
    pub href: String,
    /// Visible link text (the URL itself)
    pub text: String,
    /// Whether the link opens in a new browsing context
    pub new_context: bool,
    /// Link relationship, always [`LINK_REL`]
    pub rel: &'static str,
}

impl SourceLink {
    fn for_entry(entry: &SourceEntry) -> Option<Self> {
        let url = entry.url.as_ref()?;
        Some(Self {
            href: url.clone(),
            text: url.clone(),
            new_context: true,
            rel: LINK_REL,
        })
    }
}

/// Titled list of links attached beneath a reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBlock {
    pub title: String,
    pub links: Vec<SourceLink>,
}

impl SourceBlock {
    /// URLs of the block, in display order
    pub fn urls(&self) -> Vec<&str> {
        self.links.iter().map(|l| l.href.as_str()).collect()
    }
}

/// Render the first `max` entries as a titled link block
///
/// Truncation happens before URL-less entries are dropped, so a later
/// entry never moves up into view. Returns `None` when no link survives,
/// so no empty title is shown.
///
/// # Examples
///
/// ```
/// use sitechat::sources::{render_sources, SourceEntry};
///
/// let entries: Vec<_> = (1..=6).map(|i| SourceEntry::new(format!("https://s/{i}"))).collect();
/// let block = render_sources(&entries, 4, "Sources").unwrap();
/// assert_eq!(block.urls(), ["https://s/1", "https://s/2", "https://s/3", "https://s/4"]);
///
/// assert!(render_sources(&[], 4, "Sources").is_none());
/// ```
pub fn render_sources(entries: &[SourceEntry], max: usize, title: &str) -> Option<SourceBlock> {
    if entries.is_empty() || max == 0 {
        return None;
    }

    let links: Vec<SourceLink> = entries
        .iter()
        .take(max)
        .filter_map(SourceLink::for_entry)
        .collect();
    if links.is_empty() {
        return None;
    }

    Some(SourceBlock {
        title: title.to_string(),
        links,
    })
}
