// ABOUTME: Static legacy channel table used to backfill fields the live APIs lack.
// ABOUTME: Provides LegacyLookup, a JSON-backed StaticLegacyTable and the non-destructive merge.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::models::{Channel, ImageVariant};

/// Hand-maintained data for one channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRecord {
    #[serde(alias = "ID")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
    pub image_medium: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub full_episode_length: Option<u32>,
    /// Replaces the API name unconditionally.
    pub force_name: Option<String>,
    pub short_name: Option<String>,
    pub default_image: Option<String>,
    pub is_new: Option<bool>,
    pub has_no_feed: Option<bool>,
}

/// Source of legacy channel records.
pub trait LegacyLookup: Send + Sync {
    /// Finds the record for a channel by name, falling back to publisher and id.
    fn lookup(&self, name: &str, publisher: &str, id: &str) -> Option<LegacyRecord>;
}

#[derive(Debug, Error)]
pub enum LegacyTableError {
    #[error("failed to read legacy table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse legacy table: {0}")]
    Json(#[from] serde_json::Error),
}

/// A legacy table loaded from JSON.
///
/// ```json
/// {
///   "channels": { "tagesschau": { "shortName": "TS", "tags": ["news"] } },
///   "channelsById": { "ZDF-heute-journal-104": { "forceName": "heute journal" } }
/// }
/// ```
///
/// Names are matched case-insensitively; ids use the `<publisher>-<id>` form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticLegacyTable {
    #[serde(default)]
    channels: HashMap<String, LegacyRecord>,
    #[serde(default)]
    channels_by_id: HashMap<String, LegacyRecord>,
}

impl StaticLegacyTable {
    pub fn from_json(json: &str) -> Result<Self, LegacyTableError> {
        let mut table: StaticLegacyTable = serde_json::from_str(json)?;
        table.channels = table
            .channels
            .into_iter()
            .map(|(name, record)| (name.to_lowercase(), record))
            .collect();
        Ok(table)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LegacyTableError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| LegacyTableError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&json)
    }
}

impl LegacyLookup for StaticLegacyTable {
    fn lookup(&self, name: &str, publisher: &str, id: &str) -> Option<LegacyRecord> {
        self.channels
            .get(&name.to_lowercase())
            .or_else(|| self.channels_by_id.get(&format!("{}-{}", publisher, id)))
            .cloned()
    }
}

/// Merges a legacy record into a channel without discarding API data.
///
/// Fields the API populated win, except `forceName`, which always replaces the name.
pub fn apply_legacy_data(channel: &mut Channel, record: &LegacyRecord) {
    if channel.image.is_empty() {
        let variants = [&record.image_medium, &record.image]
            .into_iter()
            .flatten()
            .map(|url| ImageVariant {
                url: url.clone(),
                width: None,
                height: None,
            });
        channel.image.variants.extend(variants);
    }

    if channel.description.as_deref().unwrap_or("").is_empty() {
        if let Some(ref d) = record.description {
            channel.description = Some(d.clone());
        }
    }

    if channel.tags.is_empty() {
        channel.tags = record.tags.clone();
    }

    if let Some(ref forced) = record.force_name {
        channel.name = forced.clone();
    } else if channel.name.is_empty() {
        if let Some(ref name) = record.name {
            channel.name = name.clone();
        }
    }

    fill(&mut channel.full_episode_length, &record.full_episode_length);
    fill(&mut channel.short_name, &record.short_name);
    fill(&mut channel.default_image, &record.default_image);
    fill(&mut channel.is_new, &record.is_new);
    fill(&mut channel.has_no_feed, &record.has_no_feed);
}

fn fill<T: Clone>(field: &mut Option<T>, value: &Option<T>) {
    if field.is_none() {
        field.clone_from(value);
    }
}
