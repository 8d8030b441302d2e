// ABOUTME: Serializes the Channel model to an RSS 2.0 document with quick-xml.
// ABOUTME: Fixed element order, conditional emission of optional fields, atomic file output.

use std::collections::BTreeSet;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::FeedError;
use crate::models::{normalize_skip_hour, positive, Category, Channel, Item};
use crate::options::EncodeOptions;
use crate::time_parse::format_rfc822;

/// Version attribute written on every document.
pub const OUTPUT_VERSION: &str = "2.0";

/// Writes `channel` as RSS 2.0 into `out` and hands the writer back.
///
/// On error, whatever was already written to `out` is left as is; use
/// [`encode_to_vec`] or [`encode_to_file`] for all-or-nothing output.
pub fn encode_channel<W: Write>(
    channel: &Channel,
    out: W,
    options: &EncodeOptions,
) -> Result<W, FeedError> {
    let mut writer = RssWriter::new(out, options);
    writer.declaration()?;

    writer.start("rss", &[("version", OUTPUT_VERSION)])?;
    writer.start("channel", &[])?;
    write_channel_fields(&mut writer, channel)?;
    for item in &channel.items {
        write_item(&mut writer, item)?;
    }
    writer.end("channel")?;
    writer.end("rss")?;

    writer.finish()
}

pub fn encode_to_vec(channel: &Channel, options: &EncodeOptions) -> Result<Vec<u8>, FeedError> {
    encode_channel(channel, Vec::new(), options)
}

pub fn encode_to_string(channel: &Channel, options: &EncodeOptions) -> Result<String, FeedError> {
    let bytes = encode_to_vec(channel, options)?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

/// Writes the document to `path` atomically.
///
/// Output goes to a temporary file in the destination directory, which is
/// persisted over `path` only after everything has been written and synced.
/// The temporary file is removed on every failure path.
pub fn encode_to_file(
    channel: &Channel,
    path: &Path,
    options: &EncodeOptions,
) -> Result<(), FeedError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;

    {
        let mut out = encode_channel(channel, BufWriter::new(temp.as_file_mut()), options)?;
        out.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| FeedError::Io(e.error))?;

    debug!(path = %path.display(), items = channel.items.len(), "wrote feed");
    Ok(())
}

fn write_channel_fields<W: Write>(w: &mut RssWriter<W>, channel: &Channel) -> Result<(), FeedError> {
    w.text_element("title", &channel.title)?;
    w.text_element("link", &channel.link)?;
    w.text_element("description", &channel.description)?;
    w.optional_text("language", &channel.language)?;
    w.optional_text("copyright", &channel.copyright)?;
    w.optional_text("managingEditor", &channel.managing_editor)?;
    w.optional_text("webMaster", &channel.webmaster)?;
    if let Some(ref date) = channel.pub_date {
        w.text_element("pubDate", &format_rfc822(date))?;
    }
    if let Some(ref date) = channel.last_build_date {
        w.text_element("lastBuildDate", &format_rfc822(date))?;
    }
    write_categories(w, channel.categories.iter())?;
    w.optional_text("generator", &channel.generator)?;
    w.optional_text("docs", &channel.docs)?;

    let cloud = &channel.cloud;
    if !cloud.is_empty() {
        let port = cloud.port.to_string();
        w.empty(
            "cloud",
            &[
                ("domain", cloud.domain.as_str()),
                ("port", port.as_str()),
                ("path", cloud.path.as_str()),
                ("registerProcedure", cloud.register_procedure.as_str()),
                ("protocol", cloud.protocol.as_str()),
            ],
        )?;
    }

    if let Some(ttl) = positive(channel.ttl) {
        w.text_element("ttl", &ttl.to_string())?;
    }

    let image = &channel.image;
    if !image.is_empty() {
        w.start("image", &[])?;
        w.text_element("url", &image.url)?;
        w.text_element("title", &image.title)?;
        w.text_element("link", &image.link)?;
        if let Some(width) = positive(image.width) {
            w.text_element("width", &width.to_string())?;
        }
        if let Some(height) = positive(image.height) {
            w.text_element("height", &height.to_string())?;
        }
        w.optional_text("description", &image.description)?;
        w.end("image")?;
    }

    w.optional_text("rating", &channel.rating)?;

    let input = &channel.text_input;
    if !input.is_empty() {
        w.start("textInput", &[])?;
        w.text_element("title", &input.title)?;
        w.text_element("description", &input.description)?;
        w.text_element("name", &input.name)?;
        w.text_element("link", &input.link)?;
        w.end("textInput")?;
    }

    // skip_hours can be filled directly, bypassing add_skip_hour.
    let hours: BTreeSet<u8> = channel
        .skip_hours
        .iter()
        .filter_map(|hour| normalize_skip_hour(u32::from(*hour)))
        .collect();
    if !hours.is_empty() {
        w.start("skipHours", &[])?;
        for hour in &hours {
            w.text_element("hour", &hour.to_string())?;
        }
        w.end("skipHours")?;
    }

    if !channel.skip_days.is_empty() {
        w.start("skipDays", &[])?;
        for day in &channel.skip_days {
            w.text_element("day", day.as_str())?;
        }
        w.end("skipDays")?;
    }

    Ok(())
}

fn write_item<W: Write>(w: &mut RssWriter<W>, item: &Item) -> Result<(), FeedError> {
    w.start("item", &[])?;
    w.optional_text("title", &item.title)?;
    w.optional_text("link", &item.link)?;
    w.optional_text("description", &item.description)?;
    w.optional_text("author", &item.author)?;
    write_categories(w, item.categories.iter())?;
    w.optional_text("comments", &item.comments)?;

    let enclosure = &item.enclosure;
    if let (true, Some(length)) = (enclosure.is_complete(), enclosure.length) {
        let length = length.to_string();
        w.empty(
            "enclosure",
            &[
                ("url", enclosure.url.as_str()),
                ("length", length.as_str()),
                ("type", enclosure.mime_type.as_str()),
            ],
        )?;
    }

    if !item.guid.is_empty() {
        if item.guid.is_permalink {
            w.text_element("guid", &item.guid.value)?;
        } else {
            w.text_element_with("guid", &[("isPermaLink", "false")], &item.guid.value)?;
        }
    }

    if let Some(ref date) = item.pub_date {
        w.text_element("pubDate", &format_rfc822(date))?;
    }

    if !item.source.is_empty() {
        w.text_element_with(
            "source",
            &[("url", item.source.url.as_str())],
            &item.source.title,
        )?;
    }

    w.end("item")
}

fn write_categories<'a, W: Write>(
    w: &mut RssWriter<W>,
    categories: impl Iterator<Item = &'a Category>,
) -> Result<(), FeedError> {
    for category in categories.filter(|c| !c.is_empty()) {
        if category.domain.is_empty() {
            w.text_element("category", &category.name)?;
        } else {
            w.text_element_with(
                "category",
                &[("domain", category.domain.as_str())],
                &category.name,
            )?;
        }
    }
    Ok(())
}

/// Thin element writer over quick-xml with strictly nested start/end calls.
struct RssWriter<W: Write> {
    writer: Writer<W>,
    indented: bool,
}

impl<W: Write> RssWriter<W> {
    fn new(inner: W, options: &EncodeOptions) -> Self {
        match options.indent {
            Some(width) => Self {
                writer: Writer::new_with_indent(inner, b' ', width),
                indented: true,
            },
            None => Self {
                writer: Writer::new(inner),
                indented: false,
            },
        }
    }

    fn declaration(&mut self) -> Result<(), FeedError> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(())
    }

    fn start(&mut self, tag: &str, attributes: &[(&str, &str)]) -> Result<(), FeedError> {
        let mut start = BytesStart::new(tag);
        for attr in attributes {
            start.push_attribute(*attr);
        }
        self.writer.write_event(Event::Start(start))?;
        Ok(())
    }

    fn end(&mut self, tag: &str) -> Result<(), FeedError> {
        self.writer.write_event(Event::End(BytesEnd::new(tag)))?;
        Ok(())
    }

    fn empty(&mut self, tag: &str, attributes: &[(&str, &str)]) -> Result<(), FeedError> {
        let mut element = BytesStart::new(tag);
        for attr in attributes {
            element.push_attribute(*attr);
        }
        self.writer.write_event(Event::Empty(element))?;
        Ok(())
    }

    fn text_element(&mut self, tag: &str, text: &str) -> Result<(), FeedError> {
        self.text_element_with(tag, &[], text)
    }

    fn text_element_with(
        &mut self,
        tag: &str,
        attributes: &[(&str, &str)],
        text: &str,
    ) -> Result<(), FeedError> {
        self.start(tag, attributes)?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.end(tag)
    }

    /// Writes the element only when `text` is non-empty.
    fn optional_text(&mut self, tag: &str, text: &str) -> Result<(), FeedError> {
        if text.is_empty() {
            return Ok(());
        }
        self.text_element(tag, text)
    }

    fn finish(self) -> Result<W, FeedError> {
        let mut inner = self.writer.into_inner();
        if self.indented {
            inner.write_all(b"\n")?;
        }
        Ok(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cloud, CloudProtocol, Day, Enclosure, Guid, Image, Source, TextInput};
    use chrono::{TimeZone, Utc};

    fn compact(channel: &Channel) -> String {
        encode_to_string(channel, &EncodeOptions::compact()).unwrap()
    }

    fn position(haystack: &str, needle: &str) -> usize {
        haystack
            .find(needle)
            .unwrap_or_else(|| panic!("{} not found in {}", needle, haystack))
    }

    #[test]
    fn test_minimal_channel_keeps_required_elements() {
        let xml = compact(&Channel::default());
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(r#"<rss version="2.0"><channel>"#));
        assert!(xml.contains("<title></title><link></link><description></description>"));
        assert!(!xml.contains("<language>"));
        assert!(!xml.contains("<image>"));
        assert!(!xml.contains("<ttl>"));
        assert!(!xml.contains("<cloud"));
        assert!(!xml.contains("<textInput>"));
        assert!(xml.ends_with("</channel></rss>"));
    }

    #[test]
    fn test_ttl_emitted_only_when_set() {
        let mut channel = Channel::default();
        assert!(!compact(&channel).contains("<ttl>"));

        channel.ttl = Some(60);
        assert!(compact(&channel).contains("<ttl>60</ttl>"));

        channel.ttl = Some(0);
        assert!(!compact(&channel).contains("<ttl>"));
    }

    #[test]
    fn test_channel_element_order() {
        let date = Utc.with_ymd_and_hms(2003, 6, 3, 9, 39, 21).unwrap();
        let mut channel = Channel {
            title: "T".into(),
            link: "L".into(),
            description: "D".into(),
            language: "en".into(),
            copyright: "C".into(),
            managing_editor: "ed".into(),
            webmaster: "wm".into(),
            pub_date: Some(date),
            last_build_date: Some(date),
            docs: "docs".into(),
            generator: "gen".into(),
            rating: "pics".into(),
            ttl: Some(5),
            cloud: Cloud {
                domain: "d".into(),
                port: 80,
                path: "/".into(),
                register_procedure: "p".into(),
                protocol: CloudProtocol::XmlRpc,
            },
            image: Image {
                url: "u".into(),
                title: "t".into(),
                link: "l".into(),
                ..Default::default()
            },
            text_input: TextInput {
                title: "t".into(),
                description: "d".into(),
                name: "n".into(),
                link: "l".into(),
            },
            items: vec![Item {
                title: "item".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        channel.categories.insert(crate::models::Category::new("cat"));
        channel.skip_hours.insert(3);
        channel.skip_days.insert(Day::Friday);

        let xml = compact(&channel);
        let order = [
            "<title>T",
            "<link>L",
            "<description>D",
            "<language>",
            "<copyright>",
            "<managingEditor>",
            "<webMaster>",
            "<pubDate>",
            "<lastBuildDate>",
            "<category>",
            "<generator>",
            "<docs>",
            "<cloud ",
            "<ttl>",
            "<image>",
            "<rating>",
            "<textInput>",
            "<skipHours>",
            "<skipDays>",
            "<item>",
        ];
        let positions: Vec<_> = order.iter().map(|tag| position(&xml, tag)).collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted, "{}", xml);

        assert!(xml.contains(
            r#"<cloud domain="d" port="80" path="/" registerProcedure="p" protocol="xml-rpc"/>"#
        ));
        assert!(xml.contains("<pubDate>Tue, 03 Jun 2003 09:39:21 GMT</pubDate>"));
        assert!(xml.contains("<skipHours><hour>3</hour></skipHours>"));
        assert!(xml.contains("<skipDays><day>Friday</day></skipDays>"));
    }

    #[test]
    fn test_skip_hours_normalized_on_output() {
        let mut channel = Channel::default();
        channel.skip_hours.extend([0, 5, 24, 30]);
        assert!(compact(&channel).contains("<skipHours><hour>0</hour><hour>5</hour></skipHours>"));

        channel.skip_hours = [30, 99].into_iter().collect();
        assert!(!compact(&channel).contains("<skipHours>"));
    }

    #[test]
    fn test_image_dimensions_only_when_positive() {
        let mut channel = Channel {
            image: Image {
                url: "u".into(),
                title: "t".into(),
                link: "l".into(),
                width: Some(0),
                height: Some(31),
                ..Default::default()
            },
            ..Default::default()
        };
        let xml = compact(&channel);
        assert!(!xml.contains("<width>"));
        assert!(xml.contains("<height>31</height>"));

        channel.image.width = Some(88);
        assert!(compact(&channel).contains("<width>88</width><height>31</height>"));
    }

    #[test]
    fn test_item_fields() {
        let channel = Channel {
            items: vec![Item {
                title: "t".into(),
                guid: Guid::new("g-1", false),
                enclosure: Enclosure::new("https://cdn/a.mp3", 10, "audio/mpeg"),
                source: Source::new("Other", "https://other/rss"),
                ..Default::default()
            }],
            ..Default::default()
        };
        let xml = compact(&channel);
        assert!(xml.contains(r#"<guid isPermaLink="false">g-1</guid>"#));
        assert!(xml.contains(r#"<enclosure url="https://cdn/a.mp3" length="10" type="audio/mpeg"/>"#));
        assert!(xml.contains(r#"<source url="https://other/rss">Other</source>"#));
        assert!(!xml.contains("<description>d"));
    }

    #[test]
    fn test_permalink_guid_has_no_attribute() {
        let channel = Channel {
            items: vec![Item {
                title: "t".into(),
                guid: Guid::new("https://x/1", true),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(compact(&channel).contains("<guid>https://x/1</guid>"));
    }

    #[test]
    fn test_incomplete_enclosure_is_omitted() {
        let channel = Channel {
            items: vec![Item {
                title: "t".into(),
                enclosure: Enclosure {
                    url: "https://cdn/a.mp3".into(),
                    length: None,
                    mime_type: "audio/mpeg".into(),
                },
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(!compact(&channel).contains("<enclosure"));
    }

    #[test]
    fn test_text_is_escaped() {
        let channel = Channel {
            title: "Fish & <Chips>".into(),
            ..Default::default()
        };
        let xml = compact(&channel);
        assert!(xml.contains("<title>Fish &amp; &lt;Chips&gt;</title>"));
    }

    #[test]
    fn test_indented_output() {
        let xml = encode_to_string(&Channel::default(), &EncodeOptions::default()).unwrap();
        assert!(xml.contains("\n  <channel>\n    <title></title>"));
        assert!(xml.ends_with("</rss>\n"));
    }

    #[test]
    fn test_encode_to_file_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xml");
        std::fs::write(&path, "old").unwrap();

        let channel = Channel {
            title: "file".into(),
            ..Default::default()
        };
        encode_to_file(&channel, &path, &EncodeOptions::default()).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("<title>file</title>"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_encode_to_file_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/out.xml");
        let err = encode_to_file(&Channel::default(), &path, &EncodeOptions::default()).unwrap_err();
        assert!(matches!(err, FeedError::Io(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_write_failure_aborts() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disk full"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let err = encode_channel(&Channel::default(), Broken, &EncodeOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, FeedError::Io(_)));
    }
}
