// ABOUTME: Sub-element decoders shared by both RSS versions.
// ABOUTME: image, textInput, skipHours, skipDays, cloud, enclosure, guid, source, and category.

use std::collections::BTreeSet;

use super::{
    allow_attributes, dispatch, no_attributes, no_content, plain_text, positive_number,
    required_attribute, Rule,
};
use crate::error::FeedError;
use crate::models::{
    normalize_skip_hour, Category, Cloud, CloudProtocol, Day, Enclosure, Guid, Image, Source,
    TextInput,
};
use crate::text_parse::{parse_bool, parse_unsigned};
use crate::tree::Element;

// ----------------------------------------------------------------------------
// image
// ----------------------------------------------------------------------------

fn image_url(image: &mut Image, element: Element<'_>) -> Result<(), FeedError> {
    image.url = plain_text(element)?;
    Ok(())
}

fn image_title(image: &mut Image, element: Element<'_>) -> Result<(), FeedError> {
    image.title = plain_text(element)?;
    Ok(())
}

fn image_link(image: &mut Image, element: Element<'_>) -> Result<(), FeedError> {
    image.link = plain_text(element)?;
    Ok(())
}

fn image_width(image: &mut Image, element: Element<'_>) -> Result<(), FeedError> {
    image.width = Some(positive_number(element)?);
    Ok(())
}

fn image_height(image: &mut Image, element: Element<'_>) -> Result<(), FeedError> {
    image.height = Some(positive_number(element)?);
    Ok(())
}

fn image_description(image: &mut Image, element: Element<'_>) -> Result<(), FeedError> {
    image.description = plain_text(element)?;
    Ok(())
}

static IMAGE_RULES: &[Rule<Image>] = &[
    Rule::once("url", 0, image_url),
    Rule::once("title", 1, image_title),
    Rule::once("link", 2, image_link),
    Rule::once("width", 3, image_width),
    Rule::once("height", 4, image_height),
    Rule::once("description", 5, image_description),
];

/// Decodes `<image>`; url, title, and link are required.
pub(crate) fn decode_image(element: Element<'_>) -> Result<Image, FeedError> {
    no_attributes(element)?;
    let mut image = Image::default();
    dispatch(element, IMAGE_RULES, &mut image)?;

    for (tag, value) in [
        ("url", &image.url),
        ("title", &image.title),
        ("link", &image.link),
    ] {
        if value.is_empty() {
            return Err(FeedError::missing_element(element.name(), tag));
        }
    }
    Ok(image)
}

// ----------------------------------------------------------------------------
// textInput
// ----------------------------------------------------------------------------

fn input_title(input: &mut TextInput, element: Element<'_>) -> Result<(), FeedError> {
    input.title = plain_text(element)?;
    Ok(())
}

fn input_description(input: &mut TextInput, element: Element<'_>) -> Result<(), FeedError> {
    input.description = plain_text(element)?;
    Ok(())
}

fn input_name(input: &mut TextInput, element: Element<'_>) -> Result<(), FeedError> {
    input.name = plain_text(element)?;
    Ok(())
}

fn input_link(input: &mut TextInput, element: Element<'_>) -> Result<(), FeedError> {
    input.link = plain_text(element)?;
    Ok(())
}

static TEXT_INPUT_RULES: &[Rule<TextInput>] = &[
    Rule::once("title", 0, input_title),
    Rule::once("description", 1, input_description),
    Rule::once("name", 2, input_name),
    Rule::once("link", 3, input_link),
];

/// Decodes `<textInput>`; all four children are required.
pub(crate) fn decode_text_input(element: Element<'_>) -> Result<TextInput, FeedError> {
    no_attributes(element)?;
    let mut input = TextInput::default();
    dispatch(element, TEXT_INPUT_RULES, &mut input)?;
    if input.is_empty() {
        return Err(FeedError::model(format!(
            "<{}> requires title, description, name and link",
            element.name()
        )));
    }
    Ok(input)
}

// ----------------------------------------------------------------------------
// skipHours / skipDays
// ----------------------------------------------------------------------------

fn hour(hours: &mut BTreeSet<u8>, element: Element<'_>) -> Result<(), FeedError> {
    let text = plain_text(element)?;
    let value = parse_unsigned::<u32>(&text).ok_or_else(|| {
        FeedError::value(format!("<hour> is not a number: \"{}\"", text))
    })?;
    let hour = normalize_skip_hour(value)
        .ok_or_else(|| FeedError::value(format!("<hour> out of range: {}", value)))?;
    hours.insert(hour);
    Ok(())
}

fn day(days: &mut BTreeSet<Day>, element: Element<'_>) -> Result<(), FeedError> {
    days.insert(plain_text(element)?.parse()?);
    Ok(())
}

static SKIP_HOURS_RULES: &[Rule<BTreeSet<u8>>] = &[Rule::repeated("hour", hour)];

static SKIP_DAYS_RULES: &[Rule<BTreeSet<Day>>] = &[Rule::repeated("day", day)];

/// Decodes `<skipHours>`. 24 is read as 0; repeated hours collapse.
pub(crate) fn decode_skip_hours(element: Element<'_>) -> Result<BTreeSet<u8>, FeedError> {
    no_attributes(element)?;
    let mut hours = BTreeSet::new();
    dispatch(element, SKIP_HOURS_RULES, &mut hours)?;
    Ok(hours)
}

pub(crate) fn decode_skip_days(element: Element<'_>) -> Result<BTreeSet<Day>, FeedError> {
    no_attributes(element)?;
    let mut days = BTreeSet::new();
    dispatch(element, SKIP_DAYS_RULES, &mut days)?;
    Ok(days)
}

// ----------------------------------------------------------------------------
// attribute-only elements
// ----------------------------------------------------------------------------

const CLOUD_ATTRIBUTES: [&str; 5] = ["domain", "port", "path", "registerProcedure", "protocol"];

/// Decodes `<cloud>`, which carries exactly its five attributes.
pub(crate) fn decode_cloud(element: Element<'_>) -> Result<Cloud, FeedError> {
    allow_attributes(element, &CLOUD_ATTRIBUTES)?;
    no_content(element)?;

    let port = required_attribute(element, "port")?;
    let port = match parse_unsigned::<u16>(port) {
        Some(p) if p > 0 => p,
        _ => {
            return Err(FeedError::value(format!(
                "<cloud> port out of range: \"{}\"",
                port
            )))
        }
    };

    Ok(Cloud {
        domain: required_attribute(element, "domain")?.to_string(),
        port,
        path: required_attribute(element, "path")?.to_string(),
        register_procedure: required_attribute(element, "registerProcedure")?.to_string(),
        protocol: required_attribute(element, "protocol")?.parse::<CloudProtocol>()?,
    })
}

/// Decodes `<enclosure url=".." length=".." type=".."/>`.
pub(crate) fn decode_enclosure(element: Element<'_>) -> Result<Enclosure, FeedError> {
    allow_attributes(element, &["url", "length", "type"])?;
    no_content(element)?;

    let url = required_attribute(element, "url")?;
    let length = required_attribute(element, "length")?;
    let mime_type = required_attribute(element, "type")?;

    let length = parse_unsigned::<u64>(length).ok_or_else(|| {
        FeedError::value(format!("<enclosure> length is not a number: \"{}\"", length))
    })?;
    if url.trim().is_empty() || mime_type.trim().is_empty() {
        return Err(FeedError::model("<enclosure> needs a url and a type"));
    }

    Ok(Enclosure {
        url: url.trim().to_string(),
        length: Some(length),
        mime_type: mime_type.trim().to_string(),
    })
}

// ----------------------------------------------------------------------------
// text elements with attributes
// ----------------------------------------------------------------------------

/// Decodes `<guid>`; isPermaLink defaults to true.
pub(crate) fn decode_guid(element: Element<'_>) -> Result<Guid, FeedError> {
    allow_attributes(element, &["isPermaLink"])?;
    let is_permalink = match element.attribute("isPermaLink") {
        Some(raw) => parse_bool(raw).ok_or_else(|| {
            FeedError::value(format!("<guid> isPermaLink must be true or false: \"{}\"", raw))
        })?,
        None => true,
    };
    let guid = Guid {
        value: element.text()?,
        is_permalink,
    };
    if guid.is_empty() {
        return Err(FeedError::model("<guid> has no value"));
    }
    Ok(guid)
}

pub(crate) fn decode_source(element: Element<'_>) -> Result<Source, FeedError> {
    allow_attributes(element, &["url"])?;
    let source = Source {
        url: required_attribute(element, "url")?.trim().to_string(),
        title: element.text()?,
    };
    if source.is_empty() {
        return Err(FeedError::model("<source> needs both text and a url"));
    }
    Ok(source)
}

pub(crate) fn decode_category(element: Element<'_>) -> Result<Category, FeedError> {
    allow_attributes(element, &["domain"])?;
    let category = Category {
        name: element.text()?,
        domain: element
            .attribute("domain")
            .map(|d| d.trim().to_string())
            .unwrap_or_default(),
    };
    if category.is_empty() {
        return Err(FeedError::model("<category> has no name"));
    }
    Ok(category)
}
