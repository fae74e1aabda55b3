//! Selectable data documents for the page's source dropdown.
//!
//! Every `.json` file in the data directory is probed with the lenient parser:
//! `meta.title` becomes the label, `meta.hidden` documents are dropped unless they
//! are the one currently shown. Nothing here is persisted.

use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::document::lenient::parse_lenient_value;
use crate::document::model::Meta;
use crate::sources::fetch::SourceFetcher;
use crate::sources::resolver::SourceResolver;
use crate::sources::SiteLayout;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceEntry {
    /// File name relative to the data directory.
    pub path: String,
    pub label: String,
    pub hidden: bool,
    /// Absolute reference, also the dropdown value.
    pub abs: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceListing {
    pub entries: Vec<SourceEntry>,
    /// Index of the entry matching the current document, `None` for the placeholder.
    pub selected: Option<usize>,
}

/// Lists visible documents and picks the one matching `current`.
///
/// A listing failure degrades to a single entry: the `default.txt` document when
/// the descriptor names one, else the fixed fallback.
pub async fn list_sources(
    layout: &SiteLayout,
    fetcher: &dyn SourceFetcher,
    current: &Url,
) -> SourceListing {
    let entries = match fetcher.list_json(&layout.data_dir).await {
        Ok(names) => {
            let mut entries = Vec::with_capacity(names.len());
            for name in names {
                if let Some(entry) = probe_entry(layout, fetcher, &name).await {
                    entries.push(entry);
                }
            }
            visible_entries(entries, current)
        }
        Err(e) => {
            warn!("Failed to list sources in {}: {e}", layout.data_dir);
            let named = SourceResolver::new(layout, fetcher).descriptor_name().await;
            vec![fallback_entry(layout, named.as_deref())]
        }
    };

    let selected = select_entry(&entries, current);
    SourceListing { entries, selected }
}

async fn probe_entry(
    layout: &SiteLayout,
    fetcher: &dyn SourceFetcher,
    name: &str,
) -> Option<SourceEntry> {
    let abs = layout.data_dir.join(name).ok()?;
    let plain = SourceEntry {
        path: name.to_string(),
        label: name.to_string(),
        hidden: false,
        abs: abs.to_string(),
    };

    let text = match fetcher.fetch_text(&abs).await {
        Ok(text) => text,
        Err(e) => {
            debug!("Listing probe of {abs} failed: {e}");
            return Some(plain);
        }
    };
    let meta = match parse_lenient_value(&text) {
        Ok(value) => value
            .get("meta")
            .cloned()
            .and_then(|m| serde_json::from_value::<Meta>(m).ok())
            .unwrap_or_default(),
        Err(e) => {
            debug!("Listing probe of {abs} could not parse: {e}");
            return Some(plain);
        }
    };

    Some(SourceEntry {
        label: meta
            .title
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or(plain.label),
        hidden: meta.is_hidden(),
        ..plain
    })
}

/// Drops hidden entries (except the current one) and duplicate references.
fn visible_entries(entries: Vec<SourceEntry>, current: &Url) -> Vec<SourceEntry> {
    let mut seen = std::collections::HashSet::new();
    entries
        .into_iter()
        .filter(|e| !e.hidden || e.abs == current.as_str())
        .filter(|e| seen.insert(e.abs.clone()))
        .collect()
}

fn fallback_entry(layout: &SiteLayout, descriptor_name: Option<&str>) -> SourceEntry {
    let abs = descriptor_name
        .and_then(|name| layout.data_dir.join(name).ok())
        .unwrap_or_else(|| layout.fallback.clone());
    let name = file_name(&abs).unwrap_or_else(|| abs.to_string());
    SourceEntry {
        path: name.clone(),
        label: name,
        hidden: false,
        abs: abs.to_string(),
    }
}

/// Exact reference match first, then a match on the file name alone.
pub fn select_entry(entries: &[SourceEntry], target: &Url) -> Option<usize> {
    if let Some(i) = entries.iter().position(|e| e.abs == target.as_str()) {
        return Some(i);
    }
    let name = file_name(target)?;
    let suffix = format!("/{name}");
    entries
        .iter()
        .position(|e| e.abs.ends_with(&suffix) || e.abs == name)
}

fn file_name(url: &Url) -> Option<String> {
    url.path_segments()?
        .next_back()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
