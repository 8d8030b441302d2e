// ABOUTME: Strict RSS 0.91 / 2.0 decoder over a parsed document tree.
// ABOUTME: Table-driven element dispatch with at-most-once tracking and shared sub-element decoders.

//! Decoding of RSS documents into the [`Channel`] model.
//!
//! Both supported schema versions share one dispatch loop. Each version
//! contributes a table of [`Rule`]s mapping a tag name to a handler and,
//! for at-most-once elements, a slot in a seen-bitmap. The loop rejects
//! unknown tags and second occurrences before a handler ever runs, so
//! handlers only validate and store values.

mod channel;
mod elements;
mod item;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use crate::error::FeedError;
use crate::models::Channel;
use crate::text_parse::parse_unsigned;
use crate::time_parse::parse_rfc822;
use crate::tree::{Document, Element};

/// Supported wire schema versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RssVersion {
    /// RSS 0.91
    Rss091,
    /// RSS 2.0
    Rss20,
}

impl RssVersion {
    /// The exact value of the root `version` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            RssVersion::Rss091 => "0.91",
            RssVersion::Rss20 => "2.0",
        }
    }

    fn channel_rules(&self) -> &'static [Rule<Channel>] {
        match self {
            RssVersion::Rss091 => channel::RSS091_RULES,
            RssVersion::Rss20 => channel::RSS20_RULES,
        }
    }
}

impl fmt::Display for RssVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RssVersion {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0.91" => Ok(RssVersion::Rss091),
            "2.0" => Ok(RssVersion::Rss20),
            other => Err(FeedError::structural(format!(
                "unsupported RSS version \"{}\"",
                other
            ))),
        }
    }
}

/// Decodes a document, picking the schema from the root `version` attribute.
pub fn decode_document(doc: &Document) -> Result<Channel, FeedError> {
    let root = rss_root(doc)?;
    let version: RssVersion = root
        .attribute("version")
        .ok_or_else(|| FeedError::structural("<rss> is missing the version attribute"))?
        .parse()?;
    decode_channel(root, version)
}

/// Decodes a document that must declare exactly `version`.
pub fn decode_version(doc: &Document, version: RssVersion) -> Result<Channel, FeedError> {
    let root = rss_root(doc)?;
    match root.attribute("version") {
        Some(found) if found == version.as_str() => decode_channel(root, version),
        Some(found) => Err(FeedError::structural(format!(
            "expected RSS version \"{}\", found \"{}\"",
            version, found
        ))),
        None => Err(FeedError::structural(
            "<rss> is missing the version attribute",
        )),
    }
}

fn rss_root(doc: &Document) -> Result<Element<'_>, FeedError> {
    let root = doc
        .root_element()
        .ok_or_else(|| FeedError::structural("document has no root element"))?;
    if root.name() != "rss" {
        return Err(FeedError::structural(format!(
            "expected root element <rss>, found <{}>",
            root.name()
        )));
    }
    Ok(root)
}

fn decode_channel(root: Element<'_>, version: RssVersion) -> Result<Channel, FeedError> {
    debug!(version = %version, "decoding rss document");

    let mut children = root.child_elements();
    let container = children
        .next()
        .ok_or_else(|| FeedError::structural("<rss> has no <channel>"))??;
    if container.name() != "channel" {
        return Err(FeedError::structural(format!(
            "expected <channel> inside <rss>, found <{}>",
            container.name()
        )));
    }
    if let Some(extra) = children.next() {
        return Err(FeedError::structural(format!(
            "unexpected <{}> after <channel>",
            extra?.name()
        )));
    }
    no_attributes(container)?;

    let mut channel = Channel::default();
    dispatch(container, version.channel_rules(), &mut channel)
        .inspect_err(|e| debug!(version = %version, error = %e, "rss decode failed"))?;

    debug!(
        version = %version,
        items = channel.items.len(),
        "decoded channel"
    );
    Ok(channel)
}

/// Handler invoked for one matched child element.
pub(crate) type Apply<T> = fn(&mut T, Element<'_>) -> Result<(), FeedError>;

/// One entry of a decoding table.
pub(crate) struct Rule<T> {
    pub tag: &'static str,
    /// Seen-bitmap slot; None for repeatable elements. Aliases share a slot.
    pub slot: Option<u8>,
    pub apply: Apply<T>,
}

impl<T> Rule<T> {
    pub const fn once(tag: &'static str, slot: u8, apply: Apply<T>) -> Self {
        Self {
            tag,
            slot: Some(slot),
            apply,
        }
    }

    pub const fn repeated(tag: &'static str, apply: Apply<T>) -> Self {
        Self {
            tag,
            slot: None,
            apply,
        }
    }
}

/// Elements already seen at one nesting level.
#[derive(Debug, Default, Clone, Copy)]
struct SeenSlots(u64);

impl SeenSlots {
    /// Marks a slot; false if it was already marked.
    fn insert(&mut self, slot: u8) -> bool {
        let bit = 1u64 << slot;
        let fresh = self.0 & bit == 0;
        self.0 |= bit;
        fresh
    }
}

/// Runs every element child of `parent` through the matching rule.
pub(crate) fn dispatch<T>(
    parent: Element<'_>,
    rules: &[Rule<T>],
    target: &mut T,
) -> Result<(), FeedError> {
    let mut seen = SeenSlots::default();
    for child in parent.child_elements() {
        let child = child?;
        let rule = rules
            .iter()
            .find(|rule| rule.tag == child.name())
            .ok_or_else(|| FeedError::unknown_element(parent.name(), child.name()))?;
        if let Some(slot) = rule.slot {
            if !seen.insert(slot) {
                return Err(FeedError::duplicate(parent.name(), child.name()));
            }
        }
        trace!(parent = parent.name(), element = child.name(), "dispatch");
        (rule.apply)(target, child)?;
    }
    Ok(())
}

pub(crate) fn no_attributes(element: Element<'_>) -> Result<(), FeedError> {
    match element.attributes().first() {
        Some(attr) => Err(FeedError::unexpected_attribute(element.name(), &attr.name)),
        None => Ok(()),
    }
}

/// Rejects any attribute outside `allowed`.
pub(crate) fn allow_attributes(element: Element<'_>, allowed: &[&str]) -> Result<(), FeedError> {
    for attr in element.attributes() {
        if !allowed.contains(&attr.name.as_str()) {
            return Err(FeedError::unexpected_attribute(element.name(), &attr.name));
        }
    }
    Ok(())
}

pub(crate) fn required_attribute<'a>(
    element: Element<'a>,
    name: &str,
) -> Result<&'a str, FeedError> {
    element
        .attribute(name)
        .ok_or_else(|| FeedError::missing_attribute(element.name(), name))
}

/// Requires an element with no content besides whitespace or comments.
pub(crate) fn no_content(element: Element<'_>) -> Result<(), FeedError> {
    if element.text()?.is_empty() {
        Ok(())
    } else {
        Err(FeedError::schema(format!(
            "<{}> must not have content",
            element.name()
        )))
    }
}

/// Text of an element that carries no attributes.
pub(crate) fn plain_text(element: Element<'_>) -> Result<String, FeedError> {
    no_attributes(element)?;
    element.text()
}

/// A strictly positive integer value.
pub(crate) fn positive_number(element: Element<'_>) -> Result<u32, FeedError> {
    let text = plain_text(element)?;
    match parse_unsigned::<u32>(&text) {
        Some(0) => Err(FeedError::value(format!(
            "<{}> must be greater than zero",
            element.name()
        ))),
        Some(n) => Ok(n),
        None => Err(FeedError::value(format!(
            "<{}> is not a number: \"{}\"",
            element.name(),
            text
        ))),
    }
}

/// An RFC 822 date value.
pub(crate) fn date(element: Element<'_>) -> Result<DateTime<Utc>, FeedError> {
    let text = plain_text(element)?;
    parse_rfc822(&text).ok_or_else(|| {
        FeedError::value(format!(
            "<{}> is not an RFC 822 date: \"{}\"",
            element.name(),
            text
        ))
    })
}
