// ABOUTME: ARD Mediathek adapter over the persisted-query public gateway.
// ABOUTME: Reads items, shows, show feeds and the A-Z show glossary into catalog models.

mod hashes;
mod models;

use std::sync::Arc;

use mediathek_fetch::{CacheKind, CachedFetcher};
use once_cell::sync::OnceCell;
use scraper::{Html, Selector};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use url::Url;

use crate::adapter::Adapter;
use crate::error::{AdapterError, Result};
use crate::image_utils::{resolve_media_url, variants_from_template};
use crate::legacy::{apply_legacy_data, LegacyLookup};
use crate::models::{
    Channel, ChannelRef, ImageSet, Item, MediaVariant, Publisher, MIME_HLS, MIME_MP4,
};
use crate::time_parse::parse_epoch_seconds;
use crate::title::optimize_title;

use self::hashes::{Query, CHANNEL_LIST_PARTITIONS};
use self::models::{
    FeedData, GlossaryShow, ItemData, MediaCollection, PlayerPage, Response,
    ShowData, ShowsData,
};

/// Host of item page URLs accepted by `read_item_by_url`.
pub const ARD_WEB_HOST: &str = "www.ardmediathek.de";

const PLAYER_PATH: &str = "/ard/player/";
const PROMO_SUFFIX: &str = " (FSK | tgl. ab 20 Uhr)";
const ITEM_IMAGE_SIZES: [(u32, u32); 4] = [(1984, 1116), (1024, 576), (640, 360), (256, 144)];
const CHANNEL_IMAGE_SIZES: [(u32, u32); 2] = [(768, 432), (320, 180)];
// Tagesschau
const TEST_CHANNEL_ID: &str = "Y3JpZDovL2Rhc2Vyc3RlLmRlL3RhZ2Vzc2NoYXU";

/// Base URLs the adapter talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArdEndpoints {
    /// Host of the public gateway.
    pub api_base: String,
    /// Website, used for item URLs and the self-check fixture.
    pub web_base: String,
}

impl Default for ArdEndpoints {
    fn default() -> Self {
        Self {
            api_base: "https://api.ardmediathek.de".to_string(),
            web_base: "https://www.ardmediathek.de".to_string(),
        }
    }
}

pub struct ArdAdapter {
    fetcher: CachedFetcher,
    endpoints: ArdEndpoints,
    legacy: Option<Arc<dyn LegacyLookup>>,
    test_item_id: OnceCell<String>,
}

impl ArdAdapter {
    pub fn new(fetcher: CachedFetcher) -> Self {
        Self {
            fetcher,
            endpoints: ArdEndpoints::default(),
            legacy: None,
            test_item_id: OnceCell::new(),
        }
    }

    pub fn with_endpoints(mut self, endpoints: ArdEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Backfill channels from a legacy table.
    pub fn with_legacy(mut self, legacy: Arc<dyn LegacyLookup>) -> Self {
        self.legacy = Some(legacy);
        self
    }

    /// Calls a persisted query and decodes its `data` as `T`.
    ///
    /// Empty or non-JSON bodies and failed statuses are upstream failures, an
    /// `error`/`errors` envelope is protocol drift, and a payload that does not
    /// decode is reported as not found.
    fn call_api<T: DeserializeOwned>(
        &self,
        variables: Value,
        hash: &str,
        cache_key: &str,
        kind: CacheKind,
        context: &str,
    ) -> Result<T> {
        let extensions = json!({ "persistedQuery": { "version": 1, "sha256Hash": hash } });
        let url = Url::parse_with_params(
            &format!("{}/public-gateway", self.endpoints.api_base),
            &[
                ("variables", variables.to_string()),
                ("extensions", extensions.to_string()),
            ],
        )
        .map_err(|e| AdapterError::upstream(Publisher::Ard, context, Some(e.into())))?;

        let response = self
            .fetcher
            .fetch_kind(url.as_str(), &[], cache_key, kind)
            .map_err(|e| AdapterError::from_fetch(Publisher::Ard, context, e))?;

        if response.body.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(AdapterError::upstream(
                Publisher::Ard,
                context,
                Some(anyhow::anyhow!("API responded with empty body (status {})", response.status)),
            ));
        }

        let value: Value = serde_json::from_slice(&response.body).map_err(|e| {
            AdapterError::upstream(
                Publisher::Ard,
                context,
                Some(anyhow::Error::new(e).context(format!("non-JSON response (status {})", response.status))),
            )
        })?;

        if let Some(err) = value.get("error").or_else(|| value.get("errors")).filter(|v| !v.is_null()) {
            return Err(AdapterError::protocol_drift(
                Publisher::Ard,
                context,
                Some(anyhow::anyhow!("API responded with error: {}", err)),
            ));
        }

        if !response.is_success() {
            return Err(AdapterError::upstream(
                Publisher::Ard,
                context,
                Some(anyhow::anyhow!("HTTP status {}", response.status)),
            ));
        }

        let decoded: Response<T> = serde_json::from_value(value).map_err(|e| {
            AdapterError::not_found(
                Publisher::Ard,
                context,
                Some(anyhow::Error::new(e).context("unexpected API response")),
            )
        })?;
        Ok(decoded.data)
    }

    fn apply_legacy(&self, channel: &mut Channel) {
        if let Some(ref legacy) = self.legacy {
            if let Some(record) = legacy.lookup(&channel.name, Publisher::Ard.as_str(), &channel.id) {
                apply_legacy_data(channel, &record);
            }
        }
    }

    fn item_from_player_page(&self, id: &str, page: PlayerPage) -> Result<Item> {
        let title = clean_title(&page.title);
        if title.is_empty() {
            return Err(AdapterError::not_found(
                Publisher::Ard,
                format!("item id = {}", id),
                Some(anyhow::anyhow!("unexpected API response: player page has no title")),
            ));
        }

        let media = page
            .media_collection
            .as_ref()
            .map(|c| media_variants(c, &self.endpoints.api_base))
            .unwrap_or_default();
        let duration = page
            .media_collection
            .as_ref()
            .and_then(|c| c.duration.as_ref())
            .and_then(|d| d.seconds());

        let image = match page.image {
            Some(img) => ImageSet {
                description: img.alt,
                copyright: None,
                variants: img
                    .src
                    .map(|src| variants_from_template(&src, &ITEM_IMAGE_SIZES))
                    .unwrap_or_default(),
            },
            None => ImageSet::default(),
        };

        let channel = page
            .show
            .map(|show| ChannelRef {
                id: show.id.unwrap_or_default(),
                name: show.title.unwrap_or_default(),
            })
            .unwrap_or_default();

        Ok(Item {
            publisher: Publisher::Ard.to_string(),
            id: id.to_string(),
            url: format!("{}{}{}", self.endpoints.web_base, PLAYER_PATH, id),
            title,
            description: page.synopsis.unwrap_or_default(),
            contributor: page
                .publication_service
                .and_then(|s| s.name)
                .unwrap_or_default(),
            geoblocked: page.geoblocked,
            duration,
            airtime: page.broadcasted_on.as_deref().and_then(parse_epoch_seconds),
            expires: page.available_to.as_deref().and_then(parse_epoch_seconds),
            valid_to: None,
            valid: !media.is_empty(),
            hd: false,
            image,
            channel,
            media,
        })
    }

    fn channel_from_glossary(&self, show: GlossaryShow) -> Option<Channel> {
        let name = show.medium_title.filter(|n| !n.trim().is_empty())?;
        let template = show
            .images
            .and_then(|i| i.aspect_16x9)
            .and_then(|i| i.src);
        let mut channel = Channel {
            id: show.id.unwrap_or_default(),
            name,
            publisher: Publisher::Ard.to_string(),
            contributor: show.publication_service.and_then(|s| s.name),
            image: ImageSet {
                variants: template
                    .map(|t| variants_from_template(&t, &CHANNEL_IMAGE_SIZES))
                    .unwrap_or_default(),
                ..Default::default()
            },
            ..Default::default()
        };
        self.apply_legacy(&mut channel);
        Some(channel)
    }

    fn scrape_test_item_id(&self) -> Result<String> {
        let context = "test item id";
        let response = self
            .fetcher
            .fetch_live(&format!("{}/", self.endpoints.web_base), &[])
            .map_err(|e| AdapterError::from_fetch(Publisher::Ard, context, e))?;
        if !response.is_success() {
            return Err(AdapterError::upstream(
                Publisher::Ard,
                context,
                Some(anyhow::anyhow!("HTTP status {}", response.status)),
            ));
        }

        player_id_from_html(&response.text()).ok_or_else(|| {
            AdapterError::not_found(
                Publisher::Ard,
                context,
                Some(anyhow::anyhow!("no player link on the start page")),
            )
        })
    }
}

impl Adapter for ArdAdapter {
    fn publisher(&self) -> Publisher {
        Publisher::Ard
    }

    fn read_item_by_id(&self, id: &str) -> Result<Item> {
        let context = format!("item id = {}", id);
        let data: ItemData = self.call_api(
            json!({ "client": "ard", "clipId": id, "deviceType": "pc" }),
            Query::Item.hash(),
            &format!("ard_item_{}.json", id),
            CacheKind::Item,
            &context,
        )?;
        self.item_from_player_page(id, data.player_page)
    }

    fn read_item_by_url(&self, url: &str) -> Result<Item> {
        let id = player_id_from_url(url)?;
        self.read_item_by_id(&id)
    }

    fn read_channel(&self, id: &str) -> Result<Channel> {
        let context = format!("channel id = {}", id);
        let data: ShowData = self.call_api(
            json!({ "client": "ard", "showId": id, "deviceType": "pc" }),
            Query::Show.hash(),
            &format!("ard_show_{}.json", id),
            CacheKind::Channel,
            &context,
        )?;
        let page = data.show_page;

        let mut channel = Channel {
            id: id.to_string(),
            name: page.title,
            description: page.synopsis.filter(|s| !s.is_empty()),
            publisher: Publisher::Ard.to_string(),
            contributor: page.publication_service.and_then(|s| s.name),
            image: ImageSet {
                description: page.image.as_ref().and_then(|i| i.alt.clone()),
                copyright: None,
                variants: page
                    .image
                    .and_then(|i| i.src)
                    .map(|src| variants_from_template(&src, &CHANNEL_IMAGE_SIZES))
                    .unwrap_or_default(),
            },
            ..Default::default()
        };
        self.apply_legacy(&mut channel);
        Ok(channel)
    }

    fn read_channel_feed(&self, id: &str) -> Result<Vec<String>> {
        let context = format!("channel feed id = {}", id);
        let data: FeedData = self.call_api(
            json!({ "client": "ard", "showId": id, "pageNumber": 0 }),
            Query::Feed.hash(),
            &format!("ard_feed_{}_1.json", id),
            CacheKind::Feed,
            &context,
        )?;

        Ok(data
            .show_page
            .teasers
            .unwrap_or_default()
            .into_iter()
            .filter_map(|t| t.id)
            .filter(|id| !id.is_empty())
            .collect())
    }

    fn read_list_of_channels(&self) -> Result<Vec<Channel>> {
        let mut channels = Vec::new();

        for (letter, hash) in CHANNEL_LIST_PARTITIONS {
            if hash.is_empty() {
                tracing::debug!(%letter, "skipping channel list partition without query hash");
                continue;
            }

            let data: ShowsData = self.call_api(
                json!({ "client": "ard" }),
                hash,
                &format!("ard_channel_list_{}.json", letter),
                CacheKind::ChannelList,
                &format!("channel list partition {}", letter),
            )?;

            for (key, group) in data.shows_page.glossary {
                if key.starts_with('_') {
                    continue;
                }
                let Value::Array(entries) = group else {
                    tracing::debug!(%letter, %key, "skipping glossary entry that is not a show list");
                    continue;
                };
                for entry in entries {
                    match serde_json::from_value::<GlossaryShow>(entry) {
                        Ok(show) => channels.extend(self.channel_from_glossary(show)),
                        Err(e) => tracing::debug!(%letter, %key, error = %e, "skipping malformed glossary show"),
                    }
                }
            }
        }

        Ok(channels)
    }

    fn test_item_id(&self) -> Result<String> {
        self.test_item_id
            .get_or_try_init(|| self.scrape_test_item_id())
            .cloned()
    }

    fn test_channel_id(&self) -> Result<String> {
        Ok(TEST_CHANNEL_ID.to_string())
    }
}

/// Applies the ARD specific title rules, then the generic cleanup.
fn clean_title(raw: &str) -> String {
    let title = raw.replace(PROMO_SUFFIX, "");
    if title == "Morgenmagazin" {
        return "ARD Morgenmagazin".to_string();
    }
    optimize_title(&title)
}

/// Flattens the first media group into one variant per stream URL.
/// Relative stream URLs are resolved against `base`.
fn media_variants(collection: &MediaCollection, base: &str) -> Vec<MediaVariant> {
    let Some(group) = collection.media_array.first() else {
        return Vec::new();
    };

    let mut media = Vec::new();
    for stream in &group.streams {
        let quality = stream.quality.as_ref().map(|q| q.label()).unwrap_or_default();
        let mime_type = if quality == "auto" { MIME_HLS } else { MIME_MP4 };
        for url in stream.stream.urls() {
            let Some(url) = resolve_media_url(url, Some(base)) else {
                tracing::debug!(%url, "skipping stream URL that cannot be resolved");
                continue;
            };
            media.push(MediaVariant {
                url,
                mime_type: mime_type.to_string(),
                bitrate: bitrate_for_quality(&quality),
                comment: quality_comment(&quality),
            });
        }
    }
    media
}

fn quality_comment(quality: &str) -> String {
    if quality.is_empty() {
        String::new()
    } else {
        format!("Quality {}", quality)
    }
}

/// Measured average bitrates in kbps. "auto" and anything unknown have none.
fn bitrate_for_quality(quality: &str) -> Option<u32> {
    match quality {
        "0" => Some(180),
        "1" => Some(600),
        "2" => Some(1200),
        "3" => Some(2000),
        _ => None,
    }
}

/// Extracts the id from `https://www.ardmediathek.de/ard/player/<id>[/...]`.
fn player_id_from_url(raw: &str) -> Result<String> {
    let unsupported = |reason: &str| AdapterError::unsupported_url(Publisher::Ard, raw, reason);

    let url = Url::parse(raw.trim()).map_err(|e| unsupported(&e.to_string()))?;
    let host = url.host_str().unwrap_or_default();
    if host != ARD_WEB_HOST {
        return Err(unsupported(&format!(
            "unexpected host, should be '{}' but is '{}'",
            ARD_WEB_HOST, host
        )));
    }

    let segments: Vec<&str> = url.path_segments().map(|s| s.collect()).unwrap_or_default();
    match segments.as_slice() {
        ["ard", "player", id, ..] if !id.is_empty() => Ok(id.to_string()),
        _ => Err(unsupported("expected www.ardmediathek.de/ard/player/<id>")),
    }
}

/// Finds the first player link on a page and returns its id.
fn player_id_from_html(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    if let Ok(selector) = Selector::parse("a[href]") {
        let from_anchor = document
            .select(&selector)
            .filter_map(|a| a.value().attr("href"))
            .find_map(player_id_after_marker);
        if from_anchor.is_some() {
            return from_anchor;
        }
    }
    // Links can also sit in embedded JSON.
    player_id_after_marker(html)
}

fn player_id_after_marker(s: &str) -> Option<String> {
    let start = s.find(PLAYER_PATH)? + PLAYER_PATH.len();
    let rest = &s[start..];
    let end = rest
        .find(|c: char| c == '/' || c == '?' || c == '"' || c == '#' || c.is_whitespace())
        .unwrap_or(rest.len());
    let id = &rest[..end];
    (!id.is_empty()).then(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("Tatort (FSK | tgl. ab 20 Uhr)"), "Tatort");
        assert_eq!(clean_title("Morgenmagazin"), "ARD Morgenmagazin");
        assert_eq!(clean_title(" \"Hart aber fair\" "), "Hart aber fair");
    }

    #[test]
    fn test_bitrate_table() {
        assert_eq!(bitrate_for_quality("0"), Some(180));
        assert_eq!(bitrate_for_quality("3"), Some(2000));
        assert_eq!(bitrate_for_quality("auto"), None);
        assert_eq!(bitrate_for_quality("4"), None);
    }

    #[test]
    fn test_media_variants_resolves_relative_streams() {
        let collection: MediaCollection = serde_json::from_str(
            r#"{"_mediaArray":[{"_mediaStreamArray":[
                {"_quality":2,"_stream":["/video/2.mp4"]},
                {"_stream":"//media.ard.de/plain.mp4"}
            ]}]}"#,
        )
        .unwrap();
        let media = media_variants(&collection, "https://api.ardmediathek.de");
        assert_eq!(media.len(), 2);
        assert_eq!(media[0].url, "https://api.ardmediathek.de/video/2.mp4");
        assert_eq!(media[0].bitrate, Some(1200));
        assert_eq!(media[0].comment, "Quality 2");
        assert_eq!(media[1].url, "https://media.ard.de/plain.mp4");
        assert_eq!(media[1].bitrate, None);
        assert_eq!(media[1].comment, "");
    }

    #[test]
    fn test_player_id_from_url() {
        assert_eq!(
            player_id_from_url("https://www.ardmediathek.de/ard/player/Y3JpZDovL2Rhc2Vyc3RlLmRl/tagesschau").unwrap(),
            "Y3JpZDovL2Rhc2Vyc3RlLmRl"
        );
        assert!(player_id_from_url("https://www.zdf.de/ard/player/abc")
            .unwrap_err()
            .is_unsupported_url());
        assert!(player_id_from_url("https://www.ardmediathek.de/video/abc")
            .unwrap_err()
            .is_unsupported_url());
        assert!(player_id_from_url("not a url").unwrap_err().is_unsupported_url());
    }

    #[test]
    fn test_player_id_from_html() {
        let html = r#"<html><body><a href="/ard/shows/x">Show</a>
            <a href="/ard/player/Y3JpZDovL2l0ZW0/tagesschau">Tagesschau</a></body></html>"#;
        assert_eq!(player_id_from_html(html).as_deref(), Some("Y3JpZDovL2l0ZW0"));

        let embedded = r#"<script>{"href":"https://www.ardmediathek.de/ard/player/abc123"}</script>"#;
        assert_eq!(player_id_from_html(embedded).as_deref(), Some("abc123"));
        assert_eq!(player_id_from_html("<p>nothing</p>"), None);
    }
}
