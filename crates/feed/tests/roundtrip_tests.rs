// ABOUTME: Integration tests for the decode, merge, and encode pipeline end to end.
// ABOUTME: Checks that encoded channels decode back unchanged, plus date and text properties.

use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rssmerge_feed::{
    encode_to_file, encode_to_string, format_rfc822, merge, parse_feed_bytes, parse_feed_str,
    parse_rfc822, Category, Channel, Cloud, CloudProtocol, Day, EncodeOptions, Enclosure, Guid,
    Image, Item, Source, TextInput,
};

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

/// A channel populated with every field the decoder can produce.
fn full_channel() -> Channel {
    let mut channel = Channel {
        title: "Everything".to_string(),
        link: "https://everything.example.com/".to_string(),
        description: "All fields <set> & escaped".to_string(),
        language: "en-gb".to_string(),
        copyright: "(c) 2024".to_string(),
        managing_editor: "ed@example.com".to_string(),
        webmaster: "web@example.com".to_string(),
        pub_date: Some(at(2024, 2, 29, 23, 59, 59)),
        last_build_date: Some(at(1999, 12, 31, 0, 0, 0)),
        docs: "https://www.rssboard.org/rss-specification".to_string(),
        generator: "rssmerge".to_string(),
        rating: "pics".to_string(),
        ttl: Some(45),
        cloud: Cloud {
            domain: "rpc.example.com".to_string(),
            port: 8080,
            path: "/RPC2".to_string(),
            register_procedure: "notify".to_string(),
            protocol: CloudProtocol::HttpPost,
        },
        image: Image {
            url: "https://everything.example.com/logo.png".to_string(),
            title: "Logo".to_string(),
            link: "https://everything.example.com/".to_string(),
            width: Some(144),
            height: None,
            description: "The logo".to_string(),
        },
        text_input: TextInput {
            title: "Search".to_string(),
            description: "Search everything".to_string(),
            name: "q".to_string(),
            link: "https://everything.example.com/search".to_string(),
        },
        ..Default::default()
    };
    channel.categories.insert(Category::new("misc"));
    channel
        .categories
        .insert(Category::with_domain("a/b", "https://taxonomy.example.com"));
    channel.skip_hours.extend([0, 12, 23]);
    channel.skip_days.extend([Day::Monday, Day::Sunday]);

    let mut rich = Item {
        title: "Rich item".to_string(),
        link: "https://everything.example.com/1".to_string(),
        description: "<p>html stays text</p>".to_string(),
        author: "author@example.com".to_string(),
        comments: "https://everything.example.com/1#comments".to_string(),
        enclosure: Enclosure::new("https://cdn.example.com/1.mp3", 0, "audio/mpeg"),
        guid: Guid::new("item-1", false),
        pub_date: Some(at(2024, 3, 1, 8, 30, 0)),
        source: Source::new("Upstream", "https://upstream.example.com/rss"),
        ..Default::default()
    };
    rich.categories.insert(Category::new("audio"));

    channel.items = vec![
        rich,
        Item {
            description: "description only".to_string(),
            guid: Guid::new("https://everything.example.com/2", true),
            ..Default::default()
        },
        Item {
            title: "title only".to_string(),
            ..Default::default()
        },
    ];
    channel
}

/// Encoding then decoding returns the same channel.
#[test]
fn test_full_channel_round_trip() {
    let channel = full_channel();
    for options in [EncodeOptions::default(), EncodeOptions::compact()] {
        let xml = encode_to_string(&channel, &options).unwrap();
        let decoded = parse_feed_str(&xml).unwrap();
        assert_eq!(decoded, channel);
    }
}

#[test]
fn test_minimal_channel_round_trip() {
    let channel = Channel {
        title: "Only the basics".to_string(),
        link: "https://basic.example.com/".to_string(),
        description: "Nothing else".to_string(),
        ..Default::default()
    };
    let xml = encode_to_string(&channel, &EncodeOptions::default()).unwrap();
    assert_eq!(parse_feed_str(&xml).unwrap(), channel);
}

/// A 0.91 feed re-encodes as 2.0 without losing anything.
#[test]
fn test_rss091_upgrades_to_rss20() {
    let xml = r#"<rss version="0.91"><channel>
        <title>Old</title><link>http://old/</link><description>d</description>
        <textinput><title>t</title><description>d</description><name>n</name><link>l</link></textinput>
        <item><title>i</title><link>http://old/i</link></item>
    </channel></rss>"#;
    let channel = parse_feed_str(xml).unwrap();

    let encoded = encode_to_string(&channel, &EncodeOptions::default()).unwrap();
    assert!(encoded.contains(r#"<rss version="2.0">"#));
    assert!(encoded.contains("<textInput>"));
    assert_eq!(parse_feed_str(&encoded).unwrap(), channel);
}

/// Merging an itemful and an itemless channel, then writing and reading it back.
#[test]
fn test_merge_encode_decode() {
    let first = parse_feed_str(
        r#"<rss version="2.0"><channel><title>A</title><link>http://a/</link>
        <description>a</description><item><title>a1</title></item></channel></rss>"#,
    )
    .unwrap();
    let second = parse_feed_str(
        r#"<rss version="0.91"><channel><title>B</title><link>http://b/</link>
        <description>b</description><managingEditor>b@example.com</managingEditor></channel></rss>"#,
    )
    .unwrap();

    let merged = merge(vec![first, second]).unwrap();
    let titles: Vec<_> = merged.items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["a1", "B"]);
    assert_eq!(merged.items[1].author, "b@example.com");

    let xml = encode_to_string(&merged, &EncodeOptions::default()).unwrap();
    assert_eq!(parse_feed_bytes(xml.as_bytes()).unwrap(), merged);
}

#[test]
fn test_encode_to_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("merged.xml");
    let channel = full_channel();

    encode_to_file(&channel, &path, &EncodeOptions::default()).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(parse_feed_bytes(&bytes).unwrap(), channel);
}

#[test]
fn test_known_date() {
    let date = parse_rfc822("Tue, 03 Jun 2003 09:39:21 GMT").unwrap();
    assert_eq!(date, at(2003, 6, 3, 9, 39, 21));
    assert_eq!(format_rfc822(&date), "Tue, 03 Jun 2003 09:39:21 GMT");
    assert_eq!(parse_rfc822("Tux, 03 Jun 2003 09:39:21 GMT"), None);
}

proptest! {
    #[test]
    fn prop_date_round_trip(secs in 0i64..4_102_444_800i64) {
        let date = Utc.timestamp_opt(secs, 0).unwrap();
        let text = format_rfc822(&date);
        prop_assert_eq!(parse_rfc822(&text), Some(date));
    }

    #[test]
    fn prop_item_text_round_trip(
        title in "[A-Za-z0-9&<>'\"]{1,8}( [A-Za-z0-9&<>'\"]{1,8}){0,3}",
        description in "[A-Za-z0-9&<>'\"]{0,12}",
    ) {
        let channel = Channel {
            title: title.clone(),
            items: vec![Item {
                title,
                description,
                ..Default::default()
            }],
            ..Default::default()
        };
        let xml = encode_to_string(&channel, &EncodeOptions::compact()).unwrap();
        prop_assert_eq!(parse_feed_str(&xml).unwrap(), channel);
    }
}
