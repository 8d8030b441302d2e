// ABOUTME: Byte-level entry points that build the XML tree and decode it.
// ABOUTME: The RSS version is taken from the root element's version attribute.

use crate::decoder::{decode_document, decode_version, RssVersion};
use crate::error::FeedError;
use crate::models::Channel;
use crate::tree::Document;

/// Parses feed bytes into a Channel.
///
/// # Arguments
/// * `data` - Raw RSS 0.91 or 2.0 document bytes
///
/// # Returns
/// * `Ok(Channel)` - The fully decoded channel
/// * `Err(FeedError)` - Malformed XML or the first schema violation found
pub fn parse_feed_bytes(data: &[u8]) -> Result<Channel, FeedError> {
    let doc = Document::parse(data)?;
    decode_document(&doc)
}

pub fn parse_feed_str(s: &str) -> Result<Channel, FeedError> {
    parse_feed_bytes(s.as_bytes())
}

/// Like [`parse_feed_bytes`], but the document must declare `version`.
pub fn parse_feed_version(data: &[u8], version: RssVersion) -> Result<Channel, FeedError> {
    let doc = Document::parse(data)?;
    decode_version(&doc, version)
}
