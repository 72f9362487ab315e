// ABOUTME: Integration tests for the ZDF adapter against a mocked content API and RSS feeds.
// ABOUTME: Covers the token refresh state machine, stream flattening and RSS-backed channel data.

use std::fs;
use std::path::PathBuf;

use httpmock::prelude::*;
use mediathek_catalog::models::{MIME_HLS, MIME_MP4};
use mediathek_catalog::{Adapter, Publisher, ZdfAdapter, ZdfEndpoints};
use mediathek_fetch::CachedFetcher;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

const ITEM_PATH: &str = "/content/documents/hj-100.json";
const PTMD_PATH: &str = "/tmd/2/ngplayer_2_3/vod/ptmd/mediathek/240501_hj";
const CHANNEL_PATH: &str = "/content/documents/heute-journal-104.json";
const RSS_PATH: &str = "/rss/zdf/nachrichten/heute-journal";

struct Fixture {
    server: MockServer,
    _dir: TempDir,
    token_file: PathBuf,
    adapter: ZdfAdapter,
}

fn setup() -> Fixture {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let token_file = dir.path().join("tokens").join("api.zdf.de.txt");
    fs::create_dir_all(token_file.parent().unwrap()).unwrap();
    fs::write(&token_file, "old-token\n").unwrap();

    let fetcher = CachedFetcher::builder()
        .cache_dir(dir.path().join("cache"))
        .build()
        .unwrap();
    let adapter = ZdfAdapter::new(fetcher)
        .with_token_file(&token_file)
        .with_endpoints(ZdfEndpoints {
            api_base: server.base_url(),
            web_base: server.base_url(),
            rss_base: format!("{}/rss", server.base_url()),
            token_page: "/nachrichten/heute-journal".to_string(),
        });

    Fixture {
        server,
        _dir: dir,
        token_file,
        adapter,
    }
}

fn item_document(with_video: bool) -> serde_json::Value {
    let mut doc = json!({
        "title": "\"heute journal vom 1. Mai 2024\"",
        "leadParagraph": "  Die Nachrichten am Abend.  ",
        "tvService": "ZDF",
        "editorialDate": "2024-05-01T19:30:00.000+00:00",
        "http://zdf.de/rels/brand": {
            "title": "heute journal",
            "http://zdf.de/rels/target": { "id": "heute-journal-104" }
        },
        "http://zdf.de/rels/sharing-url": "https://www.zdf.de/nachrichten/heute-journal/hj-100.html",
        "teaserImageRef": {
            "caption": "Moderation",
            "copyrightNotice": "ZDF",
            "layouts": {
                "original": "https://img.zdf.de/original.jpg",
                "384x216": "https://img.zdf.de/384.jpg",
                "1920x1080": "https://img.zdf.de/1920.jpg"
            }
        }
    });
    if with_video {
        doc["mainVideoContent"] = json!({
            "http://zdf.de/rels/target": {
                "visible": true,
                "visibleTo": "2025-05-01T19:30:00.000+00:00",
                "duration": 1800,
                "http://zdf.de/rels/streams/ptmd-template": "/tmd/2/{playerId}/vod/ptmd/mediathek/240501_hj"
            }
        });
    }
    doc
}

fn ptmd_document() -> serde_json::Value {
    json!({
        "priorityList": [
            { "formitaeten": [
                { "qualities": [
                    { "quality": "high", "audio": { "tracks": [ { "uri": "https://rodl.zdf.de/240501_hj_1628k_p13v15.mp4" } ] } },
                    { "quality": "low", "audio": { "tracks": [ { "uri": "https://rodl.zdf.de/240501_hj_low.mp4" } ] } }
                ] }
            ] },
            { "formitaeten": [
                { "qualities": [
                    { "quality": "veryhigh", "audio": { "tracks": [
                        { "uri": "https://rodl.zdf.de/240501_hj.webm" },
                        { "uri": "https://rodl.zdf.de/240501_hj_hd.mp4" }
                    ] } },
                    { "quality": "auto", "audio": { "tracks": [
                        { "uri": "//zdfvodnone-vh.akamaihd.net/i/240501_hj/manifest.f4m" },
                        { "uri": "//zdf-hls.akamaized.net/hls/240501_hj/master.m3u8" }
                    ] } }
                ] }
            ] }
        ]
    })
}

fn mock_item(server: &MockServer, body: serde_json::Value) -> httpmock::Mock<'_> {
    server.mock(move |when, then| {
        when.method(GET)
            .path(ITEM_PATH)
            .query_param("profile", "player2")
            .header("api-auth", "Bearer old-token")
            .header("accept", "application/vnd.de.zdf.v1.0+json");
        then.status(200).json_body(body);
    })
}

const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>heute journal</title>
    <link>https://www.zdf.de/nachrichten/heute-journal</link>
    <description>Das Nachrichtenmagazin&lt;br/&gt;am Abend</description>
    <item>
      <title>heute journal vom 1. Mai 2024</title>
      <link>https://www.zdf.de/nachrichten/heute-journal/heute-journal-vom-1-mai-2024-100.html</link>
      <guid isPermaLink="false">1</guid>
    </item>
    <item>
      <title>heute journal vom 2. Mai 2024</title>
      <link>https://www.zdf.de/nachrichten/heute-journal/heute-journal-vom-2-mai-2024-100.html</link>
      <guid isPermaLink="false">2</guid>
    </item>
  </channel>
</rss>"#;

fn channel_document() -> serde_json::Value {
    json!({
        "title": "heute journal",
        "teasertext": "Nachrichten und Hintergründe",
        "structureNodePath": "/zdf/nachrichten/heute-journal",
        "http://zdf.de/rels/brand": {
            "title": "heute journal",
            "http://zdf.de/rels/target": { "id": "heute-journal-104" }
        },
        "http://zdf.de/rels/sharing-url": "https://www.zdf.de/nachrichten/heute-journal",
        "http://zdf.de/rels/content/conf-section": {
            "homeTvService": { "tvServiceTitle": "ZDF" }
        },
        "teaserImageRef": {
            "layouts": {
                "640x720": "https://img.zdf.de/640x720.jpg",
                "768x432": "https://img.zdf.de/768x432.jpg",
                "3000x3000": "https://img.zdf.de/3000.jpg"
            }
        }
    })
}

#[test]
fn reads_item_with_streams() {
    let fx = setup();
    mock_item(&fx.server, item_document(true));
    let ptmd = fx.server.mock(|when, then| {
        when.method(GET).path(PTMD_PATH).header("api-auth", "Bearer old-token");
        then.status(200).json_body(ptmd_document());
    });

    let item = fx.adapter.read_item_by_id("hj-100").unwrap();

    ptmd.assert();
    assert_eq!(item.publisher, "ZDF");
    assert_eq!(item.title, "heute journal vom 1. Mai 2024");
    assert_eq!(item.description, "Die Nachrichten am Abend.");
    assert_eq!(item.contributor, "ZDF");
    assert_eq!(item.url, "https://www.zdf.de/nachrichten/heute-journal/hj-100.html");
    assert_eq!(item.airtime, Some(1714591800));
    assert_eq!(item.valid_to, Some(1746127800));
    assert_eq!(item.duration, Some(1800));
    assert!(item.valid);
    assert!(item.hd);
    assert_eq!(item.channel.id, "heute-journal-104");
    assert_eq!(item.channel.name, "heute journal");
    assert_eq!(item.image.copyright.as_deref(), Some("ZDF"));
    let widths: Vec<Option<u32>> = item.image.variants.iter().map(|v| v.width).collect();
    assert_eq!(widths, vec![Some(1920), Some(384)]);

    let media: Vec<(&str, &str, Option<u32>)> = item
        .media
        .iter()
        .map(|m| (m.url.as_str(), m.mime_type.as_str(), m.bitrate))
        .collect();
    assert_eq!(
        media,
        vec![
            ("https://rodl.zdf.de/240501_hj_1628k_p13v15.mp4", MIME_MP4, Some(10000)),
            ("https://rodl.zdf.de/240501_hj_hd.mp4", MIME_MP4, Some(15000)),
            ("https://zdf-hls.akamaized.net/hls/240501_hj/master.m3u8", MIME_HLS, Some(0)),
        ]
    );
}

#[test]
fn high_track_has_high_bitrate() {
    let fx = setup();
    mock_item(&fx.server, item_document(true));
    fx.server.mock(|when, then| {
        when.method(GET).path(PTMD_PATH);
        then.status(200).json_body(json!({
            "priorityList": [{ "formitaeten": [{ "qualities": [
                { "quality": "high", "audio": { "tracks": [{ "uri": "https://rodl.zdf.de/high.mp4" }] } }
            ] }] }]
        }));
    });

    let item = fx.adapter.read_item_by_id("hj-100").unwrap();

    assert_eq!(item.media.len(), 1);
    assert_eq!(item.media[0].bitrate, Some(10000));
    assert_eq!(item.media[0].mime_type, "video/mp4");
    assert!(!item.hd);
}

#[test]
fn metadata_only_item_has_no_media() {
    let fx = setup();
    mock_item(&fx.server, item_document(false));
    let ptmd = fx.server.mock(|when, then| {
        when.method(GET).path(PTMD_PATH);
        then.status(200).json_body(ptmd_document());
    });

    let item = fx.adapter.read_item_by_id("hj-100").unwrap();

    ptmd.assert_hits(0);
    assert!(item.media.is_empty());
    assert!(!item.valid);
    assert_eq!(item.title, "heute journal vom 1. Mai 2024");
}

#[test]
fn title_empty_after_cleanup_is_not_found() {
    let fx = setup();
    let mut doc = item_document(true);
    doc["title"] = json!("\"\"");
    mock_item(&fx.server, doc);
    let ptmd = fx.server.mock(|when, then| {
        when.method(GET).path(PTMD_PATH);
        then.status(200).json_body(ptmd_document());
    });

    let err = fx.adapter.read_item_by_id("hj-100").unwrap_err();

    assert!(err.is_not_found(), "{}", err);
    assert!(err.to_string().contains("item id = hj-100"));
    ptmd.assert_hits(0);
}

#[test]
fn relative_track_urls_are_resolved() {
    let fx = setup();
    mock_item(&fx.server, item_document(true));
    fx.server.mock(|when, then| {
        when.method(GET).path(PTMD_PATH);
        then.status(200).json_body(json!({
            "priorityList": [{ "formitaeten": [{ "qualities": [
                { "quality": "high", "audio": { "tracks": [{ "uri": "/video/2.mp4" }] } }
            ] }] }]
        }));
    });

    let item = fx.adapter.read_item_by_id("hj-100").unwrap();

    assert_eq!(item.media.len(), 1);
    assert_eq!(item.media[0].url, format!("{}/video/2.mp4", fx.server.base_url()));
    assert_eq!(item.media[0].bitrate, Some(10000));
}

#[test]
fn repeated_reads_are_identical_and_cached() {
    let fx = setup();
    let doc = mock_item(&fx.server, item_document(true));
    let ptmd = fx.server.mock(|when, then| {
        when.method(GET).path(PTMD_PATH);
        then.status(200).json_body(ptmd_document());
    });

    let first = fx.adapter.read_item_by_id("hj-100").unwrap();
    let second = fx.adapter.read_item_by_id("hj-100").unwrap();

    doc.assert_hits(1);
    ptmd.assert_hits(1);
    assert_eq!(first, second);
}

#[test]
fn refreshes_token_once_and_retries() {
    let fx = setup();
    let rejected = fx.server.mock(|when, then| {
        when.method(GET).path(ITEM_PATH).header("api-auth", "Bearer old-token");
        then.status(403).body("Authentication failed");
    });
    let accepted = fx.server.mock(|when, then| {
        when.method(GET).path(ITEM_PATH).header("api-auth", "Bearer new-token");
        then.status(200).json_body(item_document(false));
    });
    let page = fx.server.mock(|when, then| {
        when.method(GET).path("/nachrichten/heute-journal");
        then.status(200)
            .header("content-type", "text/html")
            .body(r#"<script>var zdfsite = {"apiToken": "new-token", "config": {}};</script>"#);
    });

    let item = fx.adapter.read_item_by_id("hj-100").unwrap();

    rejected.assert_hits(1);
    page.assert_hits(1);
    accepted.assert_hits(1);
    assert_eq!(item.title, "heute journal vom 1. Mai 2024");
    assert_eq!(fs::read_to_string(&fx.token_file).unwrap(), "new-token");
}

#[test]
fn second_auth_failure_is_fatal_without_third_request() {
    let fx = setup();
    let api = fx.server.mock(|when, then| {
        when.method(GET).path(ITEM_PATH);
        then.status(403).body("Authentication failed");
    });
    let page = fx.server.mock(|when, then| {
        when.method(GET).path("/nachrichten/heute-journal");
        then.status(200).body(r#"{"apiToken":"still-bad"}"#);
    });

    let err = fx.adapter.read_item_by_id("hj-100").unwrap_err();

    assert!(err.is_auth_exhausted(), "{}", err);
    assert_eq!(err.publisher, Publisher::Zdf);
    api.assert_hits(2);
    page.assert_hits(1);
}

#[test]
fn auth_failure_body_with_success_status_is_not_kept() {
    let fx = setup();
    let api = fx.server.mock(|when, then| {
        when.method(GET).path(ITEM_PATH);
        then.status(200).body("Authentication failed");
    });
    fx.server.mock(|when, then| {
        when.method(GET).path("/nachrichten/heute-journal");
        then.status(200).body("<html>no token here</html>");
    });

    let err = fx.adapter.read_item_by_id("hj-100").unwrap_err();
    assert!(err.is_auth_exhausted(), "{}", err);

    // The poisoned body was dropped from the cache, so the next read asks again.
    let _ = fx.adapter.read_item_by_id("hj-100");
    api.assert_hits(2);
}

#[test]
fn response_errors_are_classified() {
    let fx = setup();
    fx.server.mock(|when, then| {
        when.method(GET).path("/content/documents/html-1.json");
        then.status(200).body("<html>Wartungsarbeiten</html>");
    });
    fx.server.mock(|when, then| {
        when.method(GET).path("/content/documents/gone-1.json");
        then.status(404).json_body(json!({ "error": "not found" }));
    });
    fx.server.mock(|when, then| {
        when.method(GET).path("/content/documents/drift-1.json");
        then.status(200).json_body(json!({ "error": "unknown profile" }));
    });
    fx.server.mock(|when, then| {
        when.method(GET).path("/content/documents/down-1.json");
        then.status(500).json_body(json!({ "message": "oops" }));
    });
    fx.server.mock(|when, then| {
        when.method(GET).path("/content/documents/untitled-1.json");
        then.status(200).json_body(json!({ "leadParagraph": "no title" }));
    });

    assert!(fx.adapter.read_item_by_id("html-1").unwrap_err().is_upstream());
    assert!(fx.adapter.read_item_by_id("gone-1").unwrap_err().is_not_found());
    assert!(fx.adapter.read_item_by_id("drift-1").unwrap_err().is_protocol_drift());
    assert!(fx.adapter.read_item_by_id("down-1").unwrap_err().is_upstream());
    assert!(fx.adapter.read_item_by_id("untitled-1").unwrap_err().is_not_found());
}

#[test]
fn read_item_by_url_extracts_id() {
    let fx = setup();
    let doc = mock_item(&fx.server, item_document(false));

    let item = fx
        .adapter
        .read_item_by_url("https://www.zdf.de/nachrichten/heute-journal/hj-100.html")
        .unwrap();

    doc.assert();
    assert_eq!(item.id, "hj-100");
}

#[test]
fn foreign_url_is_rejected_without_network() {
    let fx = setup();
    let any = fx.server.mock(|when, then| {
        when.any_request();
        then.status(200).body("{}");
    });

    for url in [
        "https://www.ardmediathek.de/ard/player/abc",
        "https://www.zdf.de/nachrichten/heute-journal",
        "mailto:redaktion@zdf.de",
    ] {
        assert!(fx.adapter.read_item_by_url(url).unwrap_err().is_unsupported_url(), "{}", url);
    }
    any.assert_hits(0);
}

#[test]
fn reads_channel_with_rss_description() {
    let fx = setup();
    fx.server.mock(|when, then| {
        when.method(GET).path(CHANNEL_PATH).query_param("profile", "default");
        then.status(200).json_body(channel_document());
    });
    let rss = fx.server.mock(|when, then| {
        when.method(GET).path(RSS_PATH);
        then.status(200)
            .header("content-type", "application/rss+xml")
            .body(RSS);
    });

    let channel = fx.adapter.read_channel("heute-journal-104").unwrap();

    rss.assert();
    assert_eq!(channel.id, "heute-journal-104");
    assert_eq!(channel.name, "heute journal");
    assert_eq!(channel.description.as_deref(), Some("Das Nachrichtenmagazin\nam Abend"));
    assert_eq!(channel.publisher, "ZDF");
    assert_eq!(channel.contributor.as_deref(), Some("ZDF"));
    assert_eq!(channel.homepage.as_deref(), Some("https://www.zdf.de/nachrichten/heute-journal"));
    let sizes: Vec<(Option<u32>, Option<u32>)> =
        channel.image.variants.iter().map(|v| (v.width, v.height)).collect();
    assert_eq!(
        sizes,
        vec![(Some(3000), Some(3000)), (Some(768), Some(432)), (Some(640), Some(720))]
    );
}

#[test]
fn channel_description_falls_back_to_teaser_text() {
    let fx = setup();
    fx.server.mock(|when, then| {
        when.method(GET).path(CHANNEL_PATH).query_param("profile", "default");
        then.status(200).json_body(channel_document());
    });
    fx.server.mock(|when, then| {
        when.method(GET).path(RSS_PATH);
        then.status(200).json_body(json!({ "error": "feed broken" }));
    });

    let channel = fx.adapter.read_channel("heute-journal-104").unwrap();

    assert_eq!(channel.description.as_deref(), Some("Nachrichten und Hintergründe"));
}

#[test]
fn reads_channel_feed_from_rss() {
    let fx = setup();
    fx.server.mock(|when, then| {
        when.method(GET).path(CHANNEL_PATH).query_param("profile", "player2");
        then.status(200).json_body(channel_document());
    });
    fx.server.mock(|when, then| {
        when.method(GET).path(RSS_PATH);
        then.status(200).body(RSS);
    });

    let feed = fx.adapter.read_channel_feed("heute-journal-104").unwrap();

    assert_eq!(
        feed,
        vec!["heute-journal-vom-1-mai-2024-100", "heute-journal-vom-2-mai-2024-100"]
    );
}

#[test]
fn broken_rss_feed_fails_channel_feed() {
    let fx = setup();
    fx.server.mock(|when, then| {
        when.method(GET).path(CHANNEL_PATH).query_param("profile", "player2");
        then.status(200).json_body(channel_document());
    });
    fx.server.mock(|when, then| {
        when.method(GET).path(RSS_PATH);
        then.status(200).body(r#"{"error":"broken"}"#);
    });

    let err = fx.adapter.read_channel_feed("heute-journal-104").unwrap_err();
    assert!(err.is_upstream(), "{}", err);
}

#[test]
fn reads_catalog_of_channels() {
    let fx = setup();
    let catalog = fx.server.mock(|when, then| {
        when.method(GET)
            .path("/content/documents/sendungen-100.json")
            .query_param("profile", "default");
        then.status(200).json_body(json!({
            "brand": [
                { "teaser": null },
                { "teaser": [
                    { "title": "Terra X", "http://zdf.de/rels/target": {
                        "id": "terra-x-112",
                        "teasertext": "Wissen und Geschichte",
                        "http://zdf.de/rels/sharing-url": "https://www.zdf.de/dokumentation/terra-x",
                        "http://zdf.de/rels/content/conf-section": { "homeTvService": { "tvServiceTitle": "ZDF" } },
                        "teaserImageRef": { "layouts": { "768x432": "https://img.zdf.de/terra.jpg" } }
                    } },
                    { "title": "" }
                ] }
            ]
        }));
    });

    let channels = fx.adapter.read_list_of_channels().unwrap();

    catalog.assert();
    assert_eq!(channels.len(), 1);
    let terra = &channels[0];
    assert_eq!(terra.id, "terra-x-112");
    assert_eq!(terra.name, "Terra X");
    assert_eq!(terra.description.as_deref(), Some("Wissen und Geschichte"));
    assert_eq!(terra.contributor.as_deref(), Some("ZDF"));
    assert_eq!(terra.homepage.as_deref(), Some("https://www.zdf.de/dokumentation/terra-x"));
    assert_eq!(terra.image.variants[0].url, "https://img.zdf.de/terra.jpg");
}

#[test]
fn test_item_id_comes_from_start_page() {
    let fx = setup();
    let page = fx.server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200)
            .header("content-type", "text/html")
            .body(r#"<a href="/filme/spielfilm-highlights/der-film-100.html">Film</a>"#);
    });

    assert_eq!(fx.adapter.test_item_id().unwrap(), "der-film-100");
    assert_eq!(fx.adapter.test_item_id().unwrap(), "der-film-100");
    page.assert_hits(1);
    assert_eq!(fx.adapter.test_channel_id().unwrap(), "heute-journal-104");
}
