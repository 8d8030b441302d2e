// ABOUTME: Channel-level decoding tables for RSS 0.91 and RSS 2.0.
// ABOUTME: Maps each channel child tag to its handler and at-most-once slot.

use super::elements;
use super::item::{self, RSS091_ITEM_RULES, RSS20_ITEM_RULES};
use super::{date, plain_text, positive_number, Rule};
use crate::error::FeedError;
use crate::models::Channel;
use crate::tree::Element;

macro_rules! text_field {
    ($name:ident, $field:ident) => {
        fn $name(channel: &mut Channel, element: Element<'_>) -> Result<(), FeedError> {
            channel.$field = plain_text(element)?;
            Ok(())
        }
    };
}

text_field!(title, title);
text_field!(link, link);
text_field!(description, description);
text_field!(language, language);
text_field!(copyright, copyright);
text_field!(managing_editor, managing_editor);
text_field!(webmaster, webmaster);
text_field!(docs, docs);
text_field!(rating, rating);
text_field!(generator, generator);

fn pub_date(channel: &mut Channel, element: Element<'_>) -> Result<(), FeedError> {
    channel.pub_date = Some(date(element)?);
    Ok(())
}

fn last_build_date(channel: &mut Channel, element: Element<'_>) -> Result<(), FeedError> {
    channel.last_build_date = Some(date(element)?);
    Ok(())
}

fn ttl(channel: &mut Channel, element: Element<'_>) -> Result<(), FeedError> {
    channel.ttl = Some(positive_number(element)?);
    Ok(())
}

fn image(channel: &mut Channel, element: Element<'_>) -> Result<(), FeedError> {
    channel.image = elements::decode_image(element)?;
    Ok(())
}

fn text_input(channel: &mut Channel, element: Element<'_>) -> Result<(), FeedError> {
    channel.text_input = elements::decode_text_input(element)?;
    Ok(())
}

fn skip_hours(channel: &mut Channel, element: Element<'_>) -> Result<(), FeedError> {
    channel.skip_hours = elements::decode_skip_hours(element)?;
    Ok(())
}

fn skip_days(channel: &mut Channel, element: Element<'_>) -> Result<(), FeedError> {
    channel.skip_days = elements::decode_skip_days(element)?;
    Ok(())
}

fn cloud(channel: &mut Channel, element: Element<'_>) -> Result<(), FeedError> {
    channel.cloud = elements::decode_cloud(element)?;
    Ok(())
}

fn category(channel: &mut Channel, element: Element<'_>) -> Result<(), FeedError> {
    channel.categories.insert(elements::decode_category(element)?);
    Ok(())
}

fn item_091(channel: &mut Channel, element: Element<'_>) -> Result<(), FeedError> {
    channel
        .items
        .push(item::decode_item(element, RSS091_ITEM_RULES)?);
    Ok(())
}

fn item_20(channel: &mut Channel, element: Element<'_>) -> Result<(), FeedError> {
    channel
        .items
        .push(item::decode_item(element, RSS20_ITEM_RULES)?);
    Ok(())
}

pub(crate) static RSS091_RULES: &[Rule<Channel>] = &[
    Rule::once("title", 0, title),
    Rule::once("link", 1, link),
    Rule::once("description", 2, description),
    Rule::once("language", 3, language),
    Rule::once("copyright", 4, copyright),
    Rule::once("managingEditor", 5, managing_editor),
    Rule::once("webMaster", 6, webmaster),
    Rule::once("pubDate", 7, pub_date),
    Rule::once("lastBuildDate", 8, last_build_date),
    Rule::once("docs", 9, docs),
    Rule::once("image", 10, image),
    Rule::once("rating", 11, rating),
    Rule::once("textInput", 12, text_input),
    // Netscape's 0.91 spelled it in lower case.
    Rule::once("textinput", 12, text_input),
    Rule::once("skipHours", 13, skip_hours),
    Rule::once("skipDays", 14, skip_days),
    Rule::repeated("item", item_091),
];

pub(crate) static RSS20_RULES: &[Rule<Channel>] = &[
    Rule::once("title", 0, title),
    Rule::once("link", 1, link),
    Rule::once("description", 2, description),
    Rule::once("language", 3, language),
    Rule::once("copyright", 4, copyright),
    Rule::once("managingEditor", 5, managing_editor),
    Rule::once("webMaster", 6, webmaster),
    Rule::once("pubDate", 7, pub_date),
    Rule::once("lastBuildDate", 8, last_build_date),
    Rule::once("docs", 9, docs),
    Rule::once("image", 10, image),
    Rule::once("rating", 11, rating),
    Rule::once("textInput", 12, text_input),
    Rule::once("skipHours", 13, skip_hours),
    Rule::once("skipDays", 14, skip_days),
    Rule::once("generator", 15, generator),
    Rule::once("cloud", 16, cloud),
    Rule::once("ttl", 17, ttl),
    Rule::repeated("category", category),
    Rule::repeated("item", item_20),
];
