// ABOUTME: ZDF Mediathek adapter over the token-authenticated content API and public RSS feeds.
// ABOUTME: Handles the one-shot token refresh, PTMD stream flattening and RSS-backed channel data.

mod models;
mod token;

pub use self::token::{extract_api_token, TokenStore, DEFAULT_TOKEN_FILE};

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use mediathek_fetch::{CacheKind, CachedFetcher, FetchResponse};
use once_cell::sync::OnceCell;
use scraper::{Html, Selector};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::adapter::Adapter;
use crate::error::{AdapterError, Result};
use crate::image_utils::{resolve_media_url, variants_from_layouts};
use crate::legacy::{apply_legacy_data, LegacyLookup};
use crate::models::{
    Channel, ChannelRef, ImageSet, ImageVariant, Item, MediaVariant, Publisher, MIME_HLS, MIME_MP4,
};
use crate::rss::{item_id_from_link, parse_rss, RssChannel};
use crate::time_parse::parse_epoch_seconds;
use crate::title::optimize_title;

use self::models::{CatalogDocument, Document, PtmdDocument, TeaserImageRef};

const ACCEPT: &str = "application/vnd.de.zdf.v1.0+json";
const AUTH_FAILED_BODY: &str = "Authentication failed";
const PLAYER_ID: &str = "ngplayer_2_3";
const CATALOG_DOCUMENT: &str = "sendungen-100";
const CATALOG_CACHE_ID: &str = "channellist_sendungen-100";
const PAGE_SUFFIX: &str = ".html";
const FILM_PATH: &str = "/filme/";
// Channel image layouts the catalog and brand pages carry.
const CHANNEL_LAYOUTS: [&str; 3] = ["3000x3000", "768x432", "640x720"];
const TEST_CHANNEL_ID: &str = "heute-journal-104";

/// Base URLs the adapter talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZdfEndpoints {
    pub api_base: String,
    /// Website, sent as Origin and Referer and scraped for fixtures.
    pub web_base: String,
    /// Prefix of the RSS feeds; a channel's structure node path is appended.
    pub rss_base: String,
    /// Path of the web page the API token is scraped from.
    pub token_page: String,
}

impl Default for ZdfEndpoints {
    fn default() -> Self {
        Self {
            api_base: "https://api.zdf.de".to_string(),
            web_base: "https://www.zdf.de".to_string(),
            rss_base: "https://www.zdf.de/rss".to_string(),
            token_page: "/nachrichten/heute-journal".to_string(),
        }
    }
}

/// Where a call chain stands with respect to authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthState {
    Initial,
    Refreshed,
}

pub struct ZdfAdapter {
    fetcher: CachedFetcher,
    endpoints: ZdfEndpoints,
    tokens: TokenStore,
    // Set after a refresh so a failed token write cannot lose the new token.
    refreshed_token: Mutex<Option<String>>,
    legacy: Option<Arc<dyn LegacyLookup>>,
    test_item_id: OnceCell<String>,
}

impl ZdfAdapter {
    pub fn new(fetcher: CachedFetcher) -> Self {
        Self {
            fetcher,
            endpoints: ZdfEndpoints::default(),
            tokens: TokenStore::default(),
            refreshed_token: Mutex::new(None),
            legacy: None,
            test_item_id: OnceCell::new(),
        }
    }

    pub fn with_endpoints(mut self, endpoints: ZdfEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.tokens = TokenStore::new(path);
        self
    }

    /// Backfill channels from a legacy table.
    pub fn with_legacy(mut self, legacy: Arc<dyn LegacyLookup>) -> Self {
        self.legacy = Some(legacy);
        self
    }

    fn current_token(&self) -> String {
        let refreshed = self
            .refreshed_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        refreshed.unwrap_or_else(|| self.tokens.read())
    }

    fn headers(&self, token: &str) -> Vec<(&'static str, String)> {
        vec![
            ("Accept", ACCEPT.to_string()),
            ("Origin", self.endpoints.web_base.clone()),
            ("Referer", format!("{}/dokumentation/terra-x", self.endpoints.web_base)),
            ("Api-Auth", format!("Bearer {}", token)),
        ]
    }

    /// Calls the content API, refreshing the token at most once per call chain.
    ///
    /// An empty `cache_id` disables the refresh, so an auth failure is fatal.
    fn call_api<T: DeserializeOwned>(&self, url: &str, cache_id: &str, kind: CacheKind) -> Result<T> {
        let context = format!("{} id = {} ({})", kind, cache_id, url);
        let cache_key = format!("zdf_{}_{}.json", kind, cache_id);
        let mut state = AuthState::Initial;

        loop {
            let token = self.current_token();
            let headers = self.headers(&token);
            let header_refs: Vec<(&str, &str)> = headers.iter().map(|(k, v)| (*k, v.as_str())).collect();

            let response = self
                .fetcher
                .fetch_kind(url, &header_refs, &cache_key, kind)
                .map_err(|e| AdapterError::from_fetch(Publisher::Zdf, &context, e))?;

            if !is_auth_failure(&response) {
                return decode_api_response(response, &context);
            }

            // An auth failure delivered with a success status was cached.
            self.fetcher.invalidate(&cache_key);

            match state {
                AuthState::Initial if !cache_id.is_empty() => {
                    self.refresh_token(&context)?;
                    state = AuthState::Refreshed;
                }
                _ => {
                    return Err(AdapterError::auth_exhausted(
                        Publisher::Zdf,
                        context,
                        Some(anyhow::anyhow!(
                            "server responded with status {}: {}",
                            response.status,
                            response.text().trim()
                        )),
                    ));
                }
            }
        }
    }

    fn refresh_token(&self, context: &str) -> Result<()> {
        let page = format!("{}{}", self.endpoints.web_base, self.endpoints.token_page);
        tracing::info!(%page, "API token rejected, fetching a new one");

        let response = self
            .fetcher
            .fetch_live(&page, &[])
            .map_err(|e| AdapterError::from_fetch(Publisher::Zdf, context, e))?;
        let token = extract_api_token(&response.text()).ok_or_else(|| {
            AdapterError::auth_exhausted(
                Publisher::Zdf,
                context,
                Some(anyhow::anyhow!("failed to get a new API token from {}", page)),
            )
        })?;

        if let Err(e) = self.tokens.write(&token) {
            tracing::warn!(path = %self.tokens.path().display(), error = %e, "failed to persist API token");
        }
        *self
            .refreshed_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(token);
        Ok(())
    }

    fn document_url(&self, id: &str, profile: &str) -> String {
        format!("{}/content/documents/{}.json?profile={}", self.endpoints.api_base, id, profile)
    }

    /// Reads the RSS feed at a structure node path.
    fn read_rss(&self, structure_node_path: &str) -> Result<RssChannel> {
        let url = format!("{}{}", self.endpoints.rss_base, structure_node_path);
        let context = format!("RSS feed {}", url);
        let response = self
            .fetcher
            .fetch_kind(
                &url,
                &[],
                &format!("zdf_feed_{}.rss", structure_node_path),
                CacheKind::Feed,
            )
            .map_err(|e| AdapterError::from_fetch(Publisher::Zdf, &context, e))?;

        if first_byte(&response) == Some(b'{') {
            return Err(AdapterError::upstream(
                Publisher::Zdf,
                context,
                Some(anyhow::anyhow!("RSS feed is broken, got JSON: {}", response.text())),
            ));
        }
        if !response.is_success() {
            return Err(AdapterError::upstream(
                Publisher::Zdf,
                context,
                Some(anyhow::anyhow!("HTTP status {}", response.status)),
            ));
        }

        parse_rss(&response.body)
            .map_err(|e| AdapterError::not_found(Publisher::Zdf, context, Some(e.into())))
    }

    fn read_media(&self, id: &str, template: &str) -> Result<(Vec<MediaVariant>, bool)> {
        let path = template.replace("{playerId}", PLAYER_ID);
        let url = if path.starts_with("http://") || path.starts_with("https://") {
            path
        } else {
            format!("{}{}", self.endpoints.api_base, path)
        };
        let ptmd: PtmdDocument = self.call_api(&url, id, CacheKind::ItemMedia)?;
        Ok(media_variants(&ptmd, &url))
    }

    fn apply_legacy(&self, channel: &mut Channel) {
        if let Some(ref legacy) = self.legacy {
            if let Some(record) = legacy.lookup(&channel.name, Publisher::Zdf.as_str(), &channel.id) {
                apply_legacy_data(channel, &record);
            }
        }
    }

    fn scrape_test_item_id(&self) -> Result<String> {
        let context = "test item id";
        let response = self
            .fetcher
            .fetch_live(&format!("{}/", self.endpoints.web_base), &[])
            .map_err(|e| AdapterError::from_fetch(Publisher::Zdf, context, e))?;
        if !response.is_success() {
            return Err(AdapterError::upstream(
                Publisher::Zdf,
                context,
                Some(anyhow::anyhow!("HTTP status {}", response.status)),
            ));
        }

        film_id_from_html(&response.text()).ok_or_else(|| {
            AdapterError::not_found(
                Publisher::Zdf,
                context,
                Some(anyhow::anyhow!("no film link on the start page")),
            )
        })
    }
}

impl Adapter for ZdfAdapter {
    fn publisher(&self) -> Publisher {
        Publisher::Zdf
    }

    fn read_item_by_id(&self, id: &str) -> Result<Item> {
        let doc: Document = self.call_api(&self.document_url(id, "player2"), id, CacheKind::Item)?;

        let Some(title) = doc.title.as_deref().map(optimize_title).filter(|t| !t.is_empty()) else {
            return Err(AdapterError::not_found(
                Publisher::Zdf,
                format!("item id = {}", id),
                Some(anyhow::anyhow!("unexpected API response: document has no title")),
            ));
        };

        let mut item = Item {
            publisher: Publisher::Zdf.to_string(),
            id: id.to_string(),
            url: doc.sharing_url.clone().unwrap_or_default(),
            title,
            description: doc.lead_paragraph.as_deref().unwrap_or_default().trim().to_string(),
            contributor: doc.tv_service.clone().unwrap_or_default(),
            airtime: doc.editorial_date.as_deref().and_then(parse_epoch_seconds),
            channel: brand_ref(&doc),
            image: item_image(doc.teaser_image_ref.as_ref()),
            ..Default::default()
        };

        // Metadata-only documents have no video content.
        let Some(video) = doc.video_content() else {
            return Ok(item);
        };

        item.valid_to = video.visible_to.as_deref().and_then(parse_epoch_seconds);
        item.valid = video.visible.unwrap_or(false);
        item.duration = video.duration.as_ref().and_then(|d| d.seconds());

        if let Some(template) = video.ptmd_template.as_deref().filter(|t| !t.is_empty()) {
            let (media, hd) = self.read_media(id, template)?;
            item.media = media;
            item.hd = hd;
        }

        Ok(item)
    }

    fn read_item_by_url(&self, url: &str) -> Result<Item> {
        let id = page_id_from_url(url)?;
        self.read_item_by_id(&id)
    }

    fn read_channel(&self, id: &str) -> Result<Channel> {
        let doc: Document = self.call_api(&self.document_url(id, "default"), id, CacheKind::ChannelMeta)?;

        let brand = brand_ref(&doc);
        let name = Some(brand.name)
            .filter(|n| !n.is_empty())
            .or_else(|| doc.title.clone())
            .unwrap_or_default();

        // The API rarely carries a description; the channel's RSS feed does.
        let rss_description = match doc.structure_node_path.as_deref() {
            Some(path) => match self.read_rss(path) {
                Ok(rss) => rss.description,
                Err(e) => {
                    tracing::warn!(channel = id, error = %e, "could not read channel description from RSS");
                    None
                }
            },
            None => None,
        };

        let mut channel = Channel {
            id: Some(brand.id).filter(|i| !i.is_empty()).unwrap_or_else(|| id.to_string()),
            name,
            description: rss_description.or_else(|| doc.teasertext.clone().filter(|t| !t.is_empty())),
            publisher: Publisher::Zdf.to_string(),
            contributor: doc.home_tv_service(),
            homepage: doc.sharing_url.clone(),
            image: channel_image(doc.teaser_image_ref.as_ref()),
            ..Default::default()
        };
        self.apply_legacy(&mut channel);
        Ok(channel)
    }

    fn read_channel_feed(&self, id: &str) -> Result<Vec<String>> {
        let doc: Document = self.call_api(&self.document_url(id, "player2"), id, CacheKind::Channel)?;

        let path = doc
            .structure_node_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                AdapterError::not_found(
                    Publisher::Zdf,
                    format!("channel feed id = {}", id),
                    Some(anyhow::anyhow!("document has no structureNodePath")),
                )
            })?;

        let rss = self.read_rss(path)?;
        Ok(rss
            .item_links
            .iter()
            .filter_map(|link| item_id_from_link(link, PAGE_SUFFIX))
            .collect())
    }

    fn read_list_of_channels(&self) -> Result<Vec<Channel>> {
        let catalog: CatalogDocument = self.call_api(
            &self.document_url(CATALOG_DOCUMENT, "default"),
            CATALOG_CACHE_ID,
            CacheKind::Channels,
        )?;

        let mut channels = Vec::new();
        for collection in catalog.brand.into_iter().flatten() {
            for teaser in collection.teaser.into_iter().flatten() {
                let target = teaser.target.unwrap_or_default();
                let mut channel = Channel {
                    id: target.id.clone().unwrap_or_default(),
                    name: teaser.title.unwrap_or_default(),
                    description: target.teasertext.clone().filter(|t| !t.is_empty()),
                    publisher: Publisher::Zdf.to_string(),
                    contributor: target.home_tv_service(),
                    homepage: target.sharing_url.clone(),
                    image: channel_image(target.teaser_image_ref.as_ref()),
                    ..Default::default()
                };
                if channel.id.is_empty() && channel.name.is_empty() {
                    tracing::debug!("skipping catalog teaser without id and title");
                    continue;
                }
                self.apply_legacy(&mut channel);
                channels.push(channel);
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

fn is_auth_failure(response: &FetchResponse) -> bool {
    response.status == 403 || response.text().trim() == AUTH_FAILED_BODY
}

fn first_byte(response: &FetchResponse) -> Option<u8> {
    response.body.iter().copied().find(|b| !b.is_ascii_whitespace())
}

/// Checks a post-auth API response and decodes it as `T`.
fn decode_api_response<T: DeserializeOwned>(response: FetchResponse, context: &str) -> Result<T> {
    if first_byte(&response) != Some(b'{') {
        return Err(AdapterError::upstream(
            Publisher::Zdf,
            context,
            Some(anyhow::anyhow!(
                "non-JSON response (status {}): {}",
                response.status,
                response.text().chars().take(200).collect::<String>()
            )),
        ));
    }

    if response.status == 404 {
        return Err(AdapterError::not_found(
            Publisher::Zdf,
            context,
            Some(anyhow::anyhow!("HTTP status 404")),
        ));
    }

    let value: Value = serde_json::from_slice(&response.body).map_err(|e| {
        AdapterError::upstream(
            Publisher::Zdf,
            context,
            Some(anyhow::Error::new(e).context("could not decode JSON")),
        )
    })?;

    if let Some(err) = value.get("error").filter(|v| !v.is_null()) {
        return Err(AdapterError::protocol_drift(
            Publisher::Zdf,
            context,
            Some(anyhow::anyhow!("API responded with error: {}", err)),
        ));
    }

    if !response.is_success() {
        return Err(AdapterError::upstream(
            Publisher::Zdf,
            context,
            Some(anyhow::anyhow!("HTTP status {}", response.status)),
        ));
    }

    serde_json::from_value(value).map_err(|e| {
        AdapterError::not_found(
            Publisher::Zdf,
            context,
            Some(anyhow::Error::new(e).context("unexpected API response")),
        )
    })
}

fn brand_ref(doc: &Document) -> ChannelRef {
    let Some(ref brand) = doc.brand else {
        return ChannelRef::default();
    };
    ChannelRef {
        id: brand
            .target
            .as_ref()
            .and_then(|t| t.id.clone())
            .unwrap_or_default(),
        name: brand.title.clone().unwrap_or_default(),
    }
}

fn item_image(image: Option<&TeaserImageRef>) -> ImageSet {
    let Some(image) = image else {
        return ImageSet::default();
    };
    ImageSet {
        description: image.caption.clone(),
        copyright: image.copyright_notice.clone(),
        variants: variants_from_layouts(image.layouts()),
    }
}

fn channel_image(image: Option<&TeaserImageRef>) -> ImageSet {
    let Some(image) = image else {
        return ImageSet::default();
    };
    let variants = CHANNEL_LAYOUTS
        .iter()
        .filter_map(|&key| {
            let url = resolve_media_url(image.layout(key)?, None)?;
            let (width, height) = crate::image_utils::parse_layout_size(key);
            Some(ImageVariant { url, width, height })
        })
        .collect();
    ImageSet {
        description: image.caption.clone(),
        copyright: image.copyright_notice.clone(),
        variants,
    }
}

/// Average bitrate in kbps for a PTMD quality label. Unknown labels give 0.
fn bitrate_for_quality(quality: &str) -> u32 {
    match quality {
        "veryhigh" => 15000,
        "high" => 10000,
        "med" => 9000,
        _ => 0,
    }
}

/// Flattens priority list, formats, qualities and audio tracks into variants.
///
/// Low quality, `.webm` and `manifest.f4m` streams are left out. The flag is
/// true if any kept stream is an HD encoding.
/// Relative track URLs are resolved against `base`, the media document URL.
fn media_variants(ptmd: &PtmdDocument, base: &str) -> (Vec<MediaVariant>, bool) {
    let mut media = Vec::new();
    let mut hd = false;

    let qualities = ptmd
        .priority_list
        .iter()
        .flatten()
        .flat_map(|list| list.formitaeten.iter().flatten())
        .flat_map(|formitaet| formitaet.qualities.iter().flatten());

    for info in qualities {
        let quality = info.quality.as_deref().unwrap_or_default();
        if quality == "low" {
            continue;
        }
        let tracks = info.audio.iter().flat_map(|a| a.tracks.iter().flatten());
        for track in tracks {
            let Some(url) = track.uri.as_deref().and_then(|u| resolve_media_url(u, Some(base))) else {
                continue;
            };
            if url.contains("manifest.f4m") || url.contains(".webm") {
                continue;
            }
            hd |= url.contains("_hd.");
            let mime_type = if url.contains(".m3u8") { MIME_HLS } else { MIME_MP4 };
            media.push(MediaVariant {
                url,
                mime_type: mime_type.to_string(),
                bitrate: Some(bitrate_for_quality(quality)),
                comment: format!("Quality {}", quality),
            });
        }
    }

    (media, hd)
}

/// Extracts the id from a zdf.de page URL ending in `<id>.html`.
fn page_id_from_url(raw: &str) -> Result<String> {
    let unsupported = |reason: &str| AdapterError::unsupported_url(Publisher::Zdf, raw, reason);

    let url = Url::parse(raw.trim()).map_err(|e| unsupported(&e.to_string()))?;
    let host = url.host_str().unwrap_or_default();
    if host != "zdf.de" && !host.ends_with(".zdf.de") {
        return Err(unsupported(&format!("unexpected host '{}', should be zdf.de", host)));
    }

    let last = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or_default();
    match last.strip_suffix(PAGE_SUFFIX) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(unsupported("expected a page URL ending in <id>.html")),
    }
}

/// Finds the first film page linked from a page and returns its id.
fn film_id_from_html(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    if let Ok(selector) = Selector::parse("a[href]") {
        let from_anchor = document
            .select(&selector)
            .filter_map(|a| a.value().attr("href"))
            .filter(|href| href.contains(FILM_PATH))
            .find_map(film_id_from_href);
        if from_anchor.is_some() {
            return from_anchor;
        }
    }

    let start = html.find(FILM_PATH)?;
    let end = start + html[start..].find(PAGE_SUFFIX)? + PAGE_SUFFIX.len();
    film_id_from_href(&html[start..end])
}

fn film_id_from_href(href: &str) -> Option<String> {
    let path = href.split(['?', '#']).next()?;
    let last = path.rsplit('/').next()?;
    let id = last.strip_suffix(PAGE_SUFFIX)?;
    (!id.is_empty()).then(|| id.to_string())
}
