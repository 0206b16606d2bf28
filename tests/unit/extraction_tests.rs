use reader_timeline::{Analyzer, ExtractContext, Feature, FeatureFlags, ProfilerError};

use crate::common::test_helpers::{DeviceDir, bookmark_entry, history_entry};

const JAN_1: &str = "Mon, 01 Jan 2024 10:00:00 GMT";
const JAN_2: &str = "Tue, 02 Jan 2024 10:00:00 GMT";

#[test]
fn test_history_item_scenario() {
    let device = DeviceDir::new().with_cache_ext(&history_entry("/book1.epub", &[(JAN_1, 5)]));

    let results = Analyzer::new(ExtractContext::default())
        .analyze_dirs(&[device.path_buf()], None)
        .unwrap();

    let events = results.events.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].description, "Reading page 5 of 200 (offset 0)");
    assert_eq!(events[0].book_path, "/book1.epub");
}

#[test]
fn test_annotation_payloads_are_decoded() {
    let device = DeviceDir::new().with_cache_ext(&format!(
        r#"<text path="/a.epub"><markups>
             <annotation date="{}" page="3" pages="9" pageOffset="1" name="note">
               <start>QQ==</start><end>Qg==</end>
             </annotation>
           </markups></text>"#,
        JAN_1
    ));

    let results = Analyzer::new(ExtractContext::default())
        .analyze_dirs(&[device.path_buf()], None)
        .unwrap();
    assert_eq!(
        results.events.events()[0].description,
        "Annotation markup (\"note\", from A to B) at page 3 of 9 (offset 1)"
    );
}

#[test]
fn test_equal_timestamps_keep_extractor_order() {
    let device = DeviceDir::new()
        .with_cache(&bookmark_entry("text", "/B.epub", JAN_1))
        .with_cache_ext(&history_entry("/A.epub", &[(JAN_1, 1)]));

    let results = Analyzer::new(ExtractContext::default())
        .analyze_dirs(&[device.path_buf()], None)
        .unwrap();

    let sorted: Vec<_> = results
        .events
        .sorted()
        .iter()
        .map(|e| e.book_path.clone())
        .collect();
    assert_eq!(sorted, vec!["/B.epub", "/A.epub"]);
}

#[test]
fn test_missing_path_defaults_to_empty() {
    let device = DeviceDir::new()
        .with_cache(&format!(
            "<text><bookmarkDate>{}</bookmarkDate></text>",
            JAN_1
        ))
        .with_media(&format!(
            "<cache:text><bookmarkDate>{}</bookmarkDate></cache:text>",
            JAN_2
        ));

    let results = Analyzer::new(ExtractContext::default())
        .analyze_dirs(&[device.path_buf()], None)
        .unwrap();

    assert_eq!(results.events.len(), 2);
    assert!(results.events.events().iter().all(|e| e.book_path.is_empty()));
    let books = results.events.book_index();
    assert_eq!(books.len(), 1);
    assert_eq!(books.index_of(""), Some(1));
}

#[test]
fn test_filter_applies_to_every_schema() {
    let device = DeviceDir::new()
        .with_cache(&format!(
            "{}\n{}",
            bookmark_entry("text", "/tolkien/hobbit.epub", JAN_1),
            bookmark_entry("text", "/austen/emma.epub", JAN_1)
        ))
        .with_cache_ext(&format!(
            "{}\n{}",
            history_entry("/tolkien/hobbit.epub", &[(JAN_2, 10)]),
            history_entry("/austen/emma.epub", &[(JAN_2, 11)])
        ))
        .with_media(&bookmark_entry("cache:text", "/austen/emma.epub", JAN_2));

    let ctx = ExtractContext::new(FeatureFlags::all()).with_search("tolkien");
    let results = Analyzer::new(ctx)
        .analyze_dirs(&[device.path_buf()], None)
        .unwrap();

    assert_eq!(results.events.len(), 2);
    assert_eq!(results.entries_found, 2);
    assert!(
        results
            .events
            .events()
            .iter()
            .all(|e| e.book_path.contains("tolkien"))
    );
}

#[test]
fn test_disabled_feature_is_ignored() {
    let device = DeviceDir::new()
        .with_cache(&bookmark_entry("text", "/a.epub", JAN_1))
        .with_cache_ext(&history_entry("/a.epub", &[(JAN_1, 1)]));

    let mut flags = FeatureFlags::default();
    flags.set(Feature::BookmarkDate, false);
    let results = Analyzer::new(ExtractContext::new(flags))
        .analyze_dirs(&[device.path_buf()], None)
        .unwrap();

    assert_eq!(results.events.len(), 1);
    assert!(results.events.events()[0].description.starts_with("Reading page"));
}

#[test]
fn test_multiple_directories_accumulate() {
    let first = DeviceDir::new().with_cache_ext(&history_entry("/a.epub", &[(JAN_2, 1)]));
    let second = DeviceDir::new().with_cache_ext(&history_entry("/b.epub", &[(JAN_1, 2)]));

    let results = Analyzer::new(ExtractContext::default())
        .analyze_dirs(&[first.path_buf(), second.path_buf()], None)
        .unwrap();

    let inserted: Vec<_> = results.events.events().iter().map(|e| e.book_path.as_str()).collect();
    assert_eq!(inserted, vec!["/a.epub", "/b.epub"]);
    let sorted: Vec<_> = results.events.sorted().iter().map(|e| e.book_path.as_str()).collect();
    assert_eq!(sorted, vec!["/b.epub", "/a.epub"]);
}

#[test]
fn test_reruns_are_identical() {
    let device = DeviceDir::new()
        .with_cache(&bookmark_entry("text", "/b.epub", JAN_2))
        .with_cache_ext(&history_entry("/a.epub", &[(JAN_1, 1), (JAN_2, 2)]));
    let analyzer = Analyzer::new(ExtractContext::default());

    let first = analyzer.analyze_dirs(&[device.path_buf()], None).unwrap();
    let second = analyzer.analyze_dirs(&[device.path_buf()], None).unwrap();

    assert_eq!(first.events.sorted(), second.events.sorted());
    assert_eq!(first.events.book_index(), second.events.book_index());
}

#[test]
fn test_malformed_xml_is_fatal() {
    let device = DeviceDir::new().write("cache.xml", "<cache><text path=\"/a\"></cache>");

    let err = Analyzer::new(ExtractContext::default())
        .analyze_dirs(&[device.path_buf()], None)
        .unwrap_err();
    match err {
        ProfilerError::Xml { file, .. } => assert!(file.ends_with("cache.xml")),
        other => panic!("Expected ProfilerError::Xml, got {other:?}"),
    }
}

#[test]
fn test_missing_container_is_structural() {
    let device = DeviceDir::new().write("cacheExt.xml", "<cache/>");

    let err = Analyzer::new(ExtractContext::default())
        .analyze_dirs(&[device.path_buf()], None)
        .unwrap_err();
    assert!(err.is_structural());
    assert!(err.to_string().contains("cacheExt"));
}
