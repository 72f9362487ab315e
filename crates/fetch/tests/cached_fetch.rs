// ABOUTME: Integration tests for CachedFetcher cache behavior.
// ABOUTME: Tests cache hits, TTL expiry, and that failed responses never reach the cache.

use std::fs::{self, File};
use std::time::{Duration, SystemTime};

use httpmock::prelude::*;
use mediathek_fetch::{CacheKind, CachedFetcher};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn setup() -> (MockServer, TempDir, CachedFetcher) {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let fetcher = CachedFetcher::builder().cache_dir(dir.path()).build().unwrap();
    (server, dir, fetcher)
}

fn age_entry(fetcher: &CachedFetcher, key: &str, age: Duration) {
    File::options()
        .write(true)
        .open(fetcher.store().path_for(key))
        .unwrap()
        .set_modified(SystemTime::now() - age)
        .unwrap();
}

#[test]
fn second_read_within_ttl_is_served_from_cache() {
    let (server, _dir, fetcher) = setup();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/item/1");
        then.status(200).body(r#"{"title":"Tatort"}"#);
    });

    let first = fetcher
        .fetch_kind(&server.url("/item/1"), &[], "ard_item_1.json", CacheKind::Item)
        .unwrap();
    let second = fetcher
        .fetch_kind(&server.url("/item/1"), &[], "ard_item_1.json", CacheKind::Item)
        .unwrap();

    mock.assert_hits(1);
    assert_eq!(first, second);
    assert_eq!(second.status, 200);
}

#[test]
fn read_after_ttl_expiry_goes_to_network() {
    let (server, _dir, fetcher) = setup();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/feed");
        then.status(200).body("<rss/>");
    });

    fetcher
        .fetch_kind(&server.url("/feed"), &[], "feed.rss", CacheKind::Feed)
        .unwrap();
    age_entry(&fetcher, "feed.rss", Duration::from_secs(3601));
    fetcher
        .fetch_kind(&server.url("/feed"), &[], "feed.rss", CacheKind::Feed)
        .unwrap();

    mock.assert_hits(2);
}

#[test]
fn failed_fetch_does_not_create_cache_entry() {
    let (server, _dir, fetcher) = setup();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/missing");
        then.status(404).body("gone");
    });

    let res = fetcher
        .fetch_kind(&server.url("/missing"), &[], "missing.json", CacheKind::Item)
        .unwrap();

    assert_eq!(res.status, 404);
    assert_eq!(res.text(), "gone");
    assert!(!fetcher.store().path_for("missing.json").exists());

    fetcher
        .fetch_kind(&server.url("/missing"), &[], "missing.json", CacheKind::Item)
        .unwrap();
    mock.assert_hits(2);
}

#[test]
fn failed_fetch_does_not_update_stale_entry() {
    let (server, _dir, fetcher) = setup();
    fs::create_dir_all(fetcher.store().dir()).unwrap();
    fs::write(fetcher.store().path_for("doc.json"), "old body").unwrap();
    age_entry(&fetcher, "doc.json", Duration::from_secs(30 * 86400));

    server.mock(|when, then| {
        when.method(GET).path("/doc");
        then.status(503).body("maintenance");
    });

    let res = fetcher
        .fetch_kind(&server.url("/doc"), &[], "doc.json", CacheKind::Channel)
        .unwrap();

    assert_eq!(res.status, 503);
    assert_eq!(fs::read_to_string(fetcher.store().path_for("doc.json")).unwrap(), "old body");
}

#[test]
fn cache_key_is_sanitized_before_storage() {
    let (server, _dir, fetcher) = setup();
    server.mock(|when, then| {
        when.method(GET).path("/rss");
        then.status(200).body("<rss/>");
    });

    fetcher
        .fetch_kind(&server.url("/rss"), &[], "zdf_feed_/politik/frontal.rss", CacheKind::Feed)
        .unwrap();

    assert!(fetcher
        .store()
        .path_for("zdf_feed__politik_frontal.rss")
        .exists());
}

#[test]
fn no_cache_key_always_fetches_live() {
    let (server, dir, fetcher) = setup();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200).body("<html></html>");
    });

    fetcher.fetch_live(&server.url("/"), &[]).unwrap();
    fetcher.fetch_live(&server.url("/"), &[]).unwrap();

    mock.assert_hits(2);
    let stored = fs::read_dir(dir.path()).map(|d| d.count()).unwrap_or(0);
    assert_eq!(stored, 0);
}

#[test]
fn unwritable_cache_is_not_fatal() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "file in the way").unwrap();
    let fetcher = CachedFetcher::builder().cache_dir(&blocker).build().unwrap();

    server.mock(|when, then| {
        when.method(GET).path("/ok");
        then.status(200).body("fine");
    });

    let res = fetcher
        .fetch_kind(&server.url("/ok"), &[], "ok.json", CacheKind::Item)
        .unwrap();
    assert_eq!(res.text(), "fine");
}

#[test]
fn invalidated_entry_is_fetched_again() {
    let (server, _dir, fetcher) = setup();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/doc");
        then.status(200).body("{}");
    });

    fetcher
        .fetch_kind(&server.url("/doc"), &[], "zdf_item_doc.json", CacheKind::Item)
        .unwrap();
    fetcher.invalidate("zdf_item_doc.json");
    fetcher
        .fetch_kind(&server.url("/doc"), &[], "zdf_item_doc.json", CacheKind::Item)
        .unwrap();

    mock.assert_hits(2);
}
