// ABOUTME: Configuration for encoding and merging, with fluent builders.
// ABOUTME: EncodeOptions controls output layout; MergeOptions supplies the merged channel's placeholders.

/// Default link of a merged channel.
pub const DEFAULT_MERGED_LINK: &str = "http://localhost/";

/// Default description of a merged channel.
pub const DEFAULT_MERGED_DESCRIPTION: &str = "Items collected from several feeds";

/// Layout options for the RSS encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Spaces per nesting level; None writes everything on one line.
    pub indent: Option<usize>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self { indent: Some(2) }
    }
}

impl EncodeOptions {
    pub fn builder() -> EncodeOptionsBuilder {
        EncodeOptionsBuilder::new()
    }

    /// Single-line output.
    pub fn compact() -> Self {
        Self { indent: None }
    }
}

/// Builder for [`EncodeOptions`].
#[derive(Debug, Clone, Default)]
pub struct EncodeOptionsBuilder {
    opts: EncodeOptions,
}

impl EncodeOptionsBuilder {
    pub fn new() -> Self {
        Self {
            opts: EncodeOptions::default(),
        }
    }

    /// Indent nested elements by `width` spaces.
    pub fn indent(mut self, width: usize) -> Self {
        self.opts.indent = Some(width);
        self
    }

    /// Write the document without line breaks.
    pub fn compact(mut self) -> Self {
        self.opts.indent = None;
        self
    }

    pub fn build(self) -> EncodeOptions {
        self.opts
    }
}

/// Settings for the channel synthesized by a multi-feed merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOptions {
    /// Replaces the generated "Merged feed (...)" title.
    pub title: Option<String>,
    pub link: String,
    pub description: String,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            title: None,
            link: DEFAULT_MERGED_LINK.to_string(),
            description: DEFAULT_MERGED_DESCRIPTION.to_string(),
        }
    }
}

impl MergeOptions {
    pub fn builder() -> MergeOptionsBuilder {
        MergeOptionsBuilder::new()
    }

    /// Title of a channel merged from `count` sources.
    pub fn title_for(&self, count: usize) -> String {
        match self.title {
            Some(ref title) => title.clone(),
            None => format!("Merged feed (composed from {} individual feeds)", count),
        }
    }
}

/// Builder for [`MergeOptions`].
#[derive(Debug, Clone, Default)]
pub struct MergeOptionsBuilder {
    opts: MergeOptions,
}

impl MergeOptionsBuilder {
    pub fn new() -> Self {
        Self {
            opts: MergeOptions::default(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.opts.title = Some(title.into());
        self
    }

    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.opts.link = link.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.opts.description = description.into();
        self
    }

    pub fn build(self) -> MergeOptions {
        self.opts
    }
}
