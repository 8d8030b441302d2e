// ABOUTME: In-memory RSS document model: Channel, Item, and their sub-elements.
// ABOUTME: Value types with structural equality and per-entity emptiness invariants.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FeedError;

/// A category with an optional taxonomy domain.
///
/// Ordered by (name, domain) so category sets iterate deterministically.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Category {
    pub name: String,
    pub domain: String,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: String::new(),
        }
    }

    pub fn with_domain(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
        }
    }

    /// A domain without a name does not make a category.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

/// The channel logo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub title: String,
    pub link: String,
    /// Width in pixels; zero is treated as absent.
    pub width: Option<u32>,
    /// Height in pixels; zero is treated as absent.
    pub height: Option<u32>,
    pub description: String,
}

impl Image {
    pub fn is_empty(&self) -> bool {
        self.url.is_empty()
            && self.title.is_empty()
            && self.link.is_empty()
            && positive(self.width).is_none()
            && positive(self.height).is_none()
            && self.description.is_empty()
    }
}

/// Returns the value only when it is a positive number.
pub(crate) fn positive(value: Option<u32>) -> Option<u32> {
    value.filter(|v| *v > 0)
}

/// A text input box shown with the channel.
///
/// All four fields are required together: the input counts as empty as soon
/// as any one of them is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextInput {
    pub title: String,
    pub description: String,
    pub name: String,
    pub link: String,
}

impl TextInput {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            || self.description.is_empty()
            || self.name.is_empty()
            || self.link.is_empty()
    }
}

/// A media object attached to an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enclosure {
    pub url: String,
    /// Size in bytes.
    pub length: Option<u64>,
    pub mime_type: String,
}

impl Enclosure {
    pub fn new(url: impl Into<String>, length: u64, mime_type: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            length: Some(length),
            mime_type: mime_type.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.url.is_empty() && self.length.is_none() && self.mime_type.is_empty()
    }

    /// True when url, length, and type are all present.
    pub fn is_complete(&self) -> bool {
        !self.url.is_empty() && self.length.is_some() && !self.mime_type.is_empty()
    }
}

/// A unique identifier for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guid {
    pub value: String,
    pub is_permalink: bool,
}

impl Default for Guid {
    fn default() -> Self {
        Self {
            value: String::new(),
            is_permalink: true,
        }
    }
}

impl Guid {
    pub fn new(value: impl Into<String>, is_permalink: bool) -> Self {
        Self {
            value: value.into(),
            is_permalink,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// The channel an item was republished from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub url: String,
}

impl Source {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }

    /// Both the text and the url are required.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() || self.url.is_empty()
    }
}

/// Protocol used by a cloud registration endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CloudProtocol {
    #[default]
    None,
    XmlRpc,
    Soap,
    HttpPost,
}

impl CloudProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloudProtocol::None => "",
            CloudProtocol::XmlRpc => "xml-rpc",
            CloudProtocol::Soap => "soap",
            CloudProtocol::HttpPost => "http-post",
        }
    }
}

impl fmt::Display for CloudProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CloudProtocol {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xml-rpc" => Ok(CloudProtocol::XmlRpc),
            "soap" => Ok(CloudProtocol::Soap),
            "http-post" => Ok(CloudProtocol::HttpPost),
            other => Err(FeedError::value(format!(
                "unknown cloud protocol \"{}\"",
                other
            ))),
        }
    }
}

/// rssCloud registration endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cloud {
    pub domain: String,
    /// Zero means unset.
    pub port: u16,
    pub path: String,
    pub register_procedure: String,
    pub protocol: CloudProtocol,
}

impl Cloud {
    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
            && self.port == 0
            && self.path.is_empty()
            && self.register_procedure.is_empty()
            && self.protocol == CloudProtocol::None
    }
}

/// Day of the week used by skipDays.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Day::ALL
            .into_iter()
            .find(|day| day.as_str() == s)
            .ok_or_else(|| FeedError::value(format!("unknown day name \"{}\"", s)))
    }
}

/// A single entry within a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub title: String,
    pub link: String,
    pub description: String,
    pub author: String,
    pub categories: BTreeSet<Category>,
    pub comments: String,
    pub enclosure: Enclosure,
    pub guid: Guid,
    pub pub_date: Option<DateTime<Utc>>,
    pub source: Source,
}

impl Item {
    /// An item needs at least a title or a description.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.description.is_empty()
    }

    /// Orders items most recent first; undated items sort last.
    pub fn cmp_newest_first(&self, other: &Item) -> Ordering {
        match (self.pub_date, other.pub_date) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Maps a skipHours value onto 0-23: 24 is midnight, anything larger is None.
pub fn normalize_skip_hour(hour: u32) -> Option<u8> {
    match hour {
        24 => Some(0),
        0..=23 => u8::try_from(hour).ok(),
        _ => None,
    }
}

/// The top-level feed entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub title: String,
    pub link: String,
    pub description: String,
    pub language: String,
    pub copyright: String,
    pub managing_editor: String,
    pub webmaster: String,
    pub pub_date: Option<DateTime<Utc>>,
    pub last_build_date: Option<DateTime<Utc>>,
    pub docs: String,
    pub image: Image,
    /// PICS rating.
    pub rating: String,
    pub text_input: TextInput,
    pub skip_hours: BTreeSet<u8>,
    pub skip_days: BTreeSet<Day>,
    pub items: Vec<Item>,
    pub categories: BTreeSet<Category>,
    pub generator: String,
    pub cloud: Cloud,
    /// Minutes the channel may be cached; None means unset.
    pub ttl: Option<u32>,
}

impl Channel {
    /// Adds an hour to skipHours. 24 is folded to 0 and anything larger is
    /// dropped. Returns whether the hour is now present.
    pub fn add_skip_hour(&mut self, hour: u32) -> bool {
        match normalize_skip_hour(hour) {
            Some(h) => {
                self.skip_hours.insert(h);
                true
            }
            None => false,
        }
    }

    /// Stable sort of the items, most recent first.
    pub fn sort_items_newest_first(&mut self) {
        self.items.sort_by(Item::cmp_newest_first);
    }
}
