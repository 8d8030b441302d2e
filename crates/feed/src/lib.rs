// ABOUTME: Core library for rssmerge: strict RSS 0.91 / 2.0 decoding, merging, and RSS 2.0 encoding.
// ABOUTME: Provides the channel model, the XML tree, RFC 822 dates, and atomic feed output.

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod merge;
pub mod models;
pub mod options;
pub mod parser;
pub mod text_parse;
pub mod time_parse;
pub mod tree;

pub use decoder::{decode_document, decode_version, RssVersion};
pub use encoder::{encode_channel, encode_to_file, encode_to_string, encode_to_vec};
pub use error::{ErrorClass, FeedError};
pub use merge::{merge, merge_with};
pub use models::{
    Category, Channel, Cloud, CloudProtocol, Day, Enclosure, Guid, Image, Item, Source,
    TextInput,
};
pub use options::{EncodeOptions, MergeOptions};
pub use parser::{parse_feed_bytes, parse_feed_str, parse_feed_version};
pub use time_parse::{format_rfc822, parse_rfc822};
pub use tree::Document;
