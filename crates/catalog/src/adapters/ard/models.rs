// ABOUTME: Typed payloads of the ARD public gateway.
// ABOUTME: Decoded once at the adapter boundary; required fields are non-optional.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::duration_parse::DurationValue;

#[derive(Debug, Deserialize)]
pub(crate) struct Response<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ItemData {
    pub player_page: PlayerPage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlayerPage {
    pub title: String,
    pub synopsis: Option<String>,
    pub publication_service: Option<PublicationService>,
    pub geoblocked: Option<bool>,
    pub media_collection: Option<MediaCollection>,
    pub image: Option<Image>,
    pub show: Option<ShowRef>,
    pub broadcasted_on: Option<String>,
    pub available_to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PublicationService {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Image {
    pub src: Option<String>,
    pub alt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ShowRef {
    pub id: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MediaCollection {
    #[serde(rename = "_duration")]
    pub duration: Option<DurationValue>,
    #[serde(rename = "_mediaArray", default)]
    pub media_array: Vec<MediaGroup>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MediaGroup {
    #[serde(rename = "_mediaStreamArray", default)]
    pub streams: Vec<MediaStream>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MediaStream {
    #[serde(rename = "_quality")]
    pub quality: Option<Quality>,
    #[serde(rename = "_stream", default)]
    pub stream: StreamUrls,
}

/// `_quality` is an index (0-3) or the label "auto", as number or string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Quality {
    Index(i64),
    Label(String),
}

impl Quality {
    pub fn label(&self) -> String {
        match self {
            Quality::Index(n) => n.to_string(),
            Quality::Label(s) => s.clone(),
        }
    }
}

/// `_stream` is a single URL or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum StreamUrls {
    One(String),
    Many(Vec<String>),
}

impl Default for StreamUrls {
    fn default() -> Self {
        StreamUrls::Many(Vec::new())
    }
}

impl StreamUrls {
    pub fn urls(&self) -> Vec<&str> {
        match self {
            StreamUrls::One(url) => vec![url.as_str()],
            StreamUrls::Many(urls) => urls.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ShowData {
    pub show_page: ShowPage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ShowPage {
    pub title: String,
    pub synopsis: Option<String>,
    pub publication_service: Option<PublicationService>,
    pub image: Option<Image>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FeedData {
    pub show_page: FeedPage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeedPage {
    #[serde(default)]
    pub teasers: Option<Vec<Teaser>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Teaser {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ShowsData {
    pub shows_page: ShowsPage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ShowsPage {
    /// Letter groups hold show lists; underscore keys hold bookkeeping data.
    /// Shows are decoded one by one so a broken entry only loses itself.
    #[serde(default)]
    pub glossary: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GlossaryShow {
    pub id: Option<String>,
    pub medium_title: Option<String>,
    pub publication_service: Option<PublicationService>,
    pub images: Option<GlossaryImages>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GlossaryImages {
    #[serde(rename = "aspect16x9")]
    pub aspect_16x9: Option<Image>,
}
