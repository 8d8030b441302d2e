// ABOUTME: Item-level decoding tables for RSS 0.91 and RSS 2.0.
// ABOUTME: Decodes one <item> and enforces the title-or-description invariant.

use super::elements;
use super::{date, dispatch, no_attributes, plain_text, Rule};
use crate::error::FeedError;
use crate::models::Item;
use crate::tree::Element;

/// Decodes an `<item>` with the given version's table.
pub(crate) fn decode_item(element: Element<'_>, rules: &[Rule<Item>]) -> Result<Item, FeedError> {
    no_attributes(element)?;
    let mut item = Item::default();
    dispatch(element, rules, &mut item)?;
    if item.is_empty() {
        return Err(FeedError::model("<item> needs a title or a description"));
    }
    Ok(item)
}

macro_rules! text_field {
    ($name:ident, $field:ident) => {
        fn $name(item: &mut Item, element: Element<'_>) -> Result<(), FeedError> {
            item.$field = plain_text(element)?;
            Ok(())
        }
    };
}

text_field!(title, title);
text_field!(link, link);
text_field!(description, description);
text_field!(author, author);
text_field!(comments, comments);

fn category(item: &mut Item, element: Element<'_>) -> Result<(), FeedError> {
    item.categories.insert(elements::decode_category(element)?);
    Ok(())
}

fn enclosure(item: &mut Item, element: Element<'_>) -> Result<(), FeedError> {
    item.enclosure = elements::decode_enclosure(element)?;
    Ok(())
}

fn guid(item: &mut Item, element: Element<'_>) -> Result<(), FeedError> {
    item.guid = elements::decode_guid(element)?;
    Ok(())
}

fn pub_date(item: &mut Item, element: Element<'_>) -> Result<(), FeedError> {
    item.pub_date = Some(date(element)?);
    Ok(())
}

fn source(item: &mut Item, element: Element<'_>) -> Result<(), FeedError> {
    item.source = elements::decode_source(element)?;
    Ok(())
}

pub(crate) static RSS091_ITEM_RULES: &[Rule<Item>] = &[
    Rule::once("title", 0, title),
    Rule::once("link", 1, link),
    Rule::once("description", 2, description),
];

pub(crate) static RSS20_ITEM_RULES: &[Rule<Item>] = &[
    Rule::once("title", 0, title),
    Rule::once("link", 1, link),
    Rule::once("description", 2, description),
    Rule::once("author", 3, author),
    Rule::once("comments", 4, comments),
    Rule::once("enclosure", 5, enclosure),
    Rule::once("guid", 6, guid),
    Rule::once("pubDate", 7, pub_date),
    Rule::once("source", 8, source),
    Rule::repeated("category", category),
];
