// ABOUTME: Typed payloads of the ZDF content API and its PTMD stream documents.
// ABOUTME: Relation fields keyed by full zdf.de URIs are mapped to plain names here.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::duration_parse::DurationValue;

/// A content document (item, brand page or catalog teaser target).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Document {
    pub id: Option<String>,
    pub title: Option<String>,
    pub lead_paragraph: Option<String>,
    pub teasertext: Option<String>,
    pub tv_service: Option<String>,
    pub editorial_date: Option<String>,
    pub structure_node_path: Option<String>,
    pub teaser_image_ref: Option<TeaserImageRef>,
    pub main_video_content: Option<VideoContentRef>,
    pub main_content: Option<MainContent>,
    #[serde(rename = "http://zdf.de/rels/brand")]
    pub brand: Option<BrandRef>,
    #[serde(rename = "http://zdf.de/rels/sharing-url")]
    pub sharing_url: Option<String>,
    #[serde(rename = "http://zdf.de/rels/content/conf-section")]
    pub conf_section: Option<ConfSection>,
}

impl Document {
    /// `mainVideoContent`, falling back to `mainContent.videoContent`.
    pub fn video_content(&self) -> Option<&VideoContent> {
        self.main_video_content
            .as_ref()
            .and_then(|v| v.target.as_ref())
            .or_else(|| {
                self.main_content
                    .as_ref()
                    .and_then(|c| c.video_content.as_ref())
                    .and_then(|v| v.target.as_ref())
            })
    }

    pub fn home_tv_service(&self) -> Option<String> {
        self.conf_section
            .as_ref()
            .and_then(|c| c.home_tv_service.as_ref())
            .and_then(|s| s.tv_service_title.clone())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BrandRef {
    pub title: Option<String>,
    #[serde(rename = "http://zdf.de/rels/target")]
    pub target: Option<TargetRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TargetRef {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TeaserImageRef {
    pub caption: Option<String>,
    pub copyright_notice: Option<String>,
    #[serde(default)]
    pub layouts: Option<BTreeMap<String, Value>>,
}

impl TeaserImageRef {
    /// Layout key and URL pairs, ignoring non-string entries.
    pub fn layouts(&self) -> impl Iterator<Item = (&str, &str)> {
        self.layouts
            .iter()
            .flatten()
            .filter_map(|(k, v)| v.as_str().map(|url| (k.as_str(), url)))
    }

    pub fn layout(&self, key: &str) -> Option<&str> {
        self.layouts.as_ref()?.get(key)?.as_str()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MainContent {
    pub video_content: Option<VideoContentRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoContentRef {
    #[serde(rename = "http://zdf.de/rels/target")]
    pub target: Option<VideoContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoContent {
    pub visible: Option<bool>,
    pub visible_to: Option<String>,
    pub duration: Option<DurationValue>,
    #[serde(rename = "http://zdf.de/rels/streams/ptmd-template")]
    pub ptmd_template: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfSection {
    pub home_tv_service: Option<HomeTvService>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HomeTvService {
    pub tv_service_title: Option<String>,
}

/// Stream document behind the PTMD template.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PtmdDocument {
    pub priority_list: Option<Vec<PriorityList>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PriorityList {
    pub formitaeten: Option<Vec<Formitaet>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Formitaet {
    pub qualities: Option<Vec<QualityInfo>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QualityInfo {
    pub quality: Option<String>,
    pub audio: Option<Audio>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Audio {
    pub tracks: Option<Vec<Track>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Track {
    pub uri: Option<String>,
}

/// The `sendungen-100` catalog document.
#[derive(Debug, Deserialize)]
pub(crate) struct CatalogDocument {
    pub brand: Option<Vec<BrandCollection>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BrandCollection {
    pub teaser: Option<Vec<BrandTeaser>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BrandTeaser {
    pub title: Option<String>,
    #[serde(rename = "http://zdf.de/rels/target")]
    pub target: Option<Document>,
}
