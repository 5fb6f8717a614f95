//! Sorting and filtering of the dashboard's entry table.
//!
//! Everything here works on an immutable snapshot of fetched entries and
//! derives a fresh list on every call.

use crate::models::{Entry, Status, TIMESTAMP_FORMAT};
use crate::storage::Document;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// `asc` selects oldest-first; anything else is newest-first.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(String),
}

impl StatusFilter {
    /// Only the two known statuses narrow the table; anything else shows all.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(status) if status == Status::Authorized.as_str() || status == Status::Unauthorized.as_str() => {
                StatusFilter::Only(status.to_string())
            }
            _ => StatusFilter::All,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Only(status) => status,
        }
    }

    pub fn matches(&self, status: &str) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

/// Parses the timestamp shapes found in stored entries. Values carrying an
/// offset are converted to server local time, matching the naive ones.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Local).naive_local())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Stable chronological sort. Unparsable timestamps count as older than any
/// parsable one.
pub fn sort_entries(entries: &[Entry], order: SortOrder) -> Vec<Entry> {
    let mut keyed: Vec<(Option<NaiveDateTime>, &Entry)> = entries
        .iter()
        .map(|entry| (parse_timestamp(&entry.timestamp), entry))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match order {
        SortOrder::Asc => a.cmp(b),
        SortOrder::Desc => b.cmp(a),
    });

    keyed.into_iter().map(|(_, entry)| entry.clone()).collect()
}

pub fn filter_entries(entries: Vec<Entry>, filter: &StatusFilter) -> Vec<Entry> {
    entries
        .into_iter()
        .filter(|entry| filter.matches(&entry.status))
        .collect()
}

/// The rows the table shows: sorted first, then filtered.
pub fn visible_entries(snapshot: &[Entry], order: SortOrder, filter: &StatusFilter) -> Vec<Entry> {
    filter_entries(sort_entries(snapshot, order), filter)
}

/// Reads store documents as entries, skipping any without a usable id.
pub fn entries_from_documents(documents: Vec<Document>) -> Vec<Entry> {
    documents
        .into_iter()
        .filter_map(|doc| match serde_json::from_value(Value::Object(doc)) {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("skipping undecodable car log: {err}");
                None
            }
        })
        .collect()
}
