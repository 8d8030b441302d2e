// ABOUTME: Combines several decoded channels into a single channel.
// ABOUTME: Appends items in source order; itemless channels contribute one synthetic item.

use tracing::debug;

use crate::error::FeedError;
use crate::models::{Channel, Item};
use crate::options::MergeOptions;

/// Merges channels with the default placeholders.
///
/// * no channels: [`FeedError::NoChannels`]
/// * one channel: returned unchanged
/// * several: a new channel holding every item, sources in input order
pub fn merge(channels: Vec<Channel>) -> Result<Channel, FeedError> {
    merge_with(channels, &MergeOptions::default())
}

/// Merges channels using `options` for the synthesized title, link, and description.
pub fn merge_with(channels: Vec<Channel>, options: &MergeOptions) -> Result<Channel, FeedError> {
    let count = channels.len();
    if count <= 1 {
        return channels.into_iter().next().ok_or(FeedError::NoChannels);
    }

    let mut merged = Channel {
        title: options.title_for(count),
        link: options.link.clone(),
        description: options.description.clone(),
        ..Default::default()
    };

    for channel in channels {
        if channel.items.is_empty() {
            merged.items.push(channel_as_item(channel));
        } else {
            merged.items.extend(channel.items);
        }
    }

    debug!(sources = count, items = merged.items.len(), "merged channels");
    Ok(merged)
}

/// Stands in for an itemless channel inside a merged feed.
fn channel_as_item(channel: Channel) -> Item {
    Item {
        title: channel.title,
        link: channel.link,
        description: channel.description,
        author: channel.managing_editor,
        categories: channel.categories,
        pub_date: channel.pub_date,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn channel_with_items(title: &str, items: &[&str]) -> Channel {
        Channel {
            title: title.to_string(),
            link: format!("https://{}.example.com/", title),
            description: format!("{} feed", title),
            items: items
                .iter()
                .map(|t| Item {
                    title: t.to_string(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_nothing_fails() {
        assert!(matches!(merge(vec![]), Err(FeedError::NoChannels)));
    }

    #[test]
    fn test_merge_single_is_identity() {
        let mut channel = channel_with_items("solo", &[]);
        channel.ttl = Some(30);
        let merged = merge(vec![channel.clone()]).unwrap();
        assert_eq!(merged, channel);
    }

    #[test]
    fn test_merge_appends_in_source_order() {
        let a = channel_with_items("a", &["a1", "a2"]);
        let b = channel_with_items("b", &["b1"]);
        let merged = merge(vec![a, b]).unwrap();

        assert_eq!(merged.title, "Merged feed (composed from 2 individual feeds)");
        assert_eq!(merged.link, crate::options::DEFAULT_MERGED_LINK);
        assert_eq!(
            merged.description,
            crate::options::DEFAULT_MERGED_DESCRIPTION
        );
        let titles: Vec<_> = merged.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["a1", "a2", "b1"]);
    }

    #[test]
    fn test_itemless_channel_becomes_item() {
        let published = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let first = channel_with_items("first", &["i1"]);
        let mut second = channel_with_items("second", &[]);
        second.managing_editor = "editor@second.example.com".to_string();
        second.pub_date = Some(published);
        second.categories.insert(Category::new("news"));
        second.copyright = "not carried over".to_string();

        let merged = merge(vec![first, second]).unwrap();
        assert_eq!(merged.items.len(), 2);
        assert_eq!(merged.items[0].title, "i1");

        let synthetic = &merged.items[1];
        assert_eq!(synthetic.title, "second");
        assert_eq!(synthetic.link, "https://second.example.com/");
        assert_eq!(synthetic.description, "second feed");
        assert_eq!(synthetic.author, "editor@second.example.com");
        assert_eq!(synthetic.pub_date, Some(published));
        assert!(synthetic.categories.contains(&Category::new("news")));
        assert!(synthetic.guid.is_empty());
    }

    #[test]
    fn test_merge_options_override_placeholders() {
        let options = MergeOptions::builder()
            .title("Planet")
            .description("All the things")
            .build();
        let merged = merge_with(
            vec![channel_with_items("a", &[]), channel_with_items("b", &[])],
            &options,
        )
        .unwrap();
        assert_eq!(merged.title, "Planet");
        assert_eq!(merged.description, "All the things");
    }

    #[test]
    fn test_merge_does_not_dedupe_or_sort() {
        let early = Item {
            title: "same".to_string(),
            pub_date: Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        let late = Item {
            pub_date: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            ..early.clone()
        };
        let a = Channel {
            items: vec![early.clone()],
            ..Default::default()
        };
        let b = Channel {
            items: vec![late.clone(), early.clone()],
            ..Default::default()
        };
        let merged = merge(vec![a, b]).unwrap();
        assert_eq!(merged.items, vec![early.clone(), late, early]);
    }
}
