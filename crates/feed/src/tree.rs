// ABOUTME: Read-only XML document tree built from quick-xml events into an ego-tree.
// ABOUTME: Exposes tag names, attributes, sibling navigation, and text content to the decoder.

use ego_tree::{NodeId, NodeRef, Tree};
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::FeedError;

/// A name/value attribute pair, already unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// One node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Document,
    Element {
        name: String,
        attributes: Vec<Attribute>,
    },
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

impl XmlNode {
    pub fn is_element(&self) -> bool {
        matches!(self, XmlNode::Element { .. })
    }

    /// Nodes that may sit between elements without meaning anything:
    /// comments, processing instructions, and whitespace-only text.
    pub fn is_ignorable(&self) -> bool {
        match self {
            XmlNode::Comment(_) | XmlNode::ProcessingInstruction(_) => true,
            XmlNode::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }
}

/// A parsed XML document.
#[derive(Debug, Clone)]
pub struct Document {
    tree: Tree<XmlNode>,
}

impl Document {
    /// Builds a tree from raw document bytes.
    ///
    /// Whitespace text is kept so that element text round-trips; entity and
    /// character references are resolved into the surrounding text node.
    pub fn parse(data: &[u8]) -> Result<Self, FeedError> {
        let mut reader = Reader::from_reader(data);
        reader.config_mut().trim_text(false);

        let mut tree = Tree::new(XmlNode::Document);
        let mut stack: Vec<NodeId> = vec![tree.root().id()];
        let mut buf = Vec::new();

        loop {
            let event = reader.read_event_into(&mut buf).map_err(|e| {
                FeedError::xml(format!("at byte {}: {}", reader.error_position(), e))
            })?;
            let parent = *stack.last().unwrap_or(&tree.root().id());

            match event {
                Event::Start(ref e) => {
                    let node = element_node(e, &reader)?;
                    let id = append(&mut tree, parent, node)?;
                    stack.push(id);
                }
                Event::Empty(ref e) => {
                    let node = element_node(e, &reader)?;
                    append(&mut tree, parent, node)?;
                }
                Event::End(_) => {
                    // quick-xml has already matched the end tag against its start
                    if stack.len() <= 1 {
                        return Err(FeedError::xml("closing tag without an open element"));
                    }
                    stack.pop();
                }
                Event::Text(ref e) => {
                    let text = e.decode().map_err(FeedError::xml)?;
                    append_text(&mut tree, parent, &text)?;
                }
                Event::GeneralRef(ref e) => {
                    let text = resolve_reference(e)?;
                    append_text(&mut tree, parent, &text)?;
                }
                Event::CData(ref e) => {
                    let text = e.decode().map_err(FeedError::xml)?;
                    append(&mut tree, parent, XmlNode::CData(text.into_owned()))?;
                }
                Event::Comment(ref e) => {
                    let text = e.decode().map_err(FeedError::xml)?;
                    append(&mut tree, parent, XmlNode::Comment(text.into_owned()))?;
                }
                Event::PI(ref e) => {
                    let content = String::from_utf8_lossy(e).into_owned();
                    append(&mut tree, parent, XmlNode::ProcessingInstruction(content))?;
                }
                Event::Decl(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
            buf.clear();
        }

        if stack.len() > 1 {
            return Err(FeedError::xml("document ended inside an open element"));
        }

        let document = Document { tree };
        let top_level = document.tree.root().children();
        let mut roots = 0;
        for node in top_level {
            match node.value() {
                XmlNode::Element { .. } => roots += 1,
                other if other.is_ignorable() => {}
                _ => return Err(FeedError::xml("content outside the root element")),
            }
        }
        if roots != 1 {
            return Err(FeedError::xml(format!(
                "expected exactly one root element, found {}",
                roots
            )));
        }

        Ok(document)
    }

    pub fn parse_str(s: &str) -> Result<Self, FeedError> {
        Self::parse(s.as_bytes())
    }

    /// The document node (parent of the root element).
    pub fn root(&self) -> NodeRef<'_, XmlNode> {
        self.tree.root()
    }

    /// The single top-level element.
    pub fn root_element(&self) -> Option<Element<'_>> {
        self.tree.root().children().find_map(Element::from_node)
    }
}

fn element_node(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<XmlNode, FeedError> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(FeedError::xml)?;
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(FeedError::xml)?;
        attributes.push(Attribute {
            name: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            value: value.into_owned(),
        });
    }
    Ok(XmlNode::Element { name, attributes })
}

fn resolve_reference(e: &BytesRef<'_>) -> Result<String, FeedError> {
    if let Some(ch) = e.resolve_char_ref().map_err(FeedError::xml)? {
        return Ok(ch.to_string());
    }
    let name = e.decode().map_err(FeedError::xml)?;
    resolve_predefined_entity(&name)
        .map(str::to_string)
        .ok_or_else(|| FeedError::xml(format!("unknown entity &{};", name)))
}

fn append(tree: &mut Tree<XmlNode>, parent: NodeId, node: XmlNode) -> Result<NodeId, FeedError> {
    let mut parent = tree
        .get_mut(parent)
        .ok_or_else(|| FeedError::xml("dangling parent node"))?;
    Ok(parent.append(node).id())
}

/// Appends text, merging with a directly preceding text node.
fn append_text(tree: &mut Tree<XmlNode>, parent: NodeId, text: &str) -> Result<(), FeedError> {
    if text.is_empty() {
        return Ok(());
    }
    let mut parent = tree
        .get_mut(parent)
        .ok_or_else(|| FeedError::xml("dangling parent node"))?;
    if let Some(mut last) = parent.last_child() {
        if let XmlNode::Text(existing) = last.value() {
            existing.push_str(text);
            return Ok(());
        }
    }
    parent.append(XmlNode::Text(text.to_string()));
    Ok(())
}

/// Advances from `node` to the first element node, skipping anything else.
pub fn skip_to_element<'a>(
    mut node: Option<NodeRef<'a, XmlNode>>,
) -> Option<NodeRef<'a, XmlNode>> {
    while let Some(current) = node {
        if current.value().is_element() {
            return Some(current);
        }
        node = current.next_sibling();
    }
    None
}

/// A borrowed view of an element node.
#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    node: NodeRef<'a, XmlNode>,
    name: &'a str,
    attributes: &'a [Attribute],
}

impl<'a> Element<'a> {
    pub fn from_node(node: NodeRef<'a, XmlNode>) -> Option<Self> {
        match node.value() {
            XmlNode::Element { name, attributes } => Some(Self {
                node,
                name,
                attributes,
            }),
            _ => None,
        }
    }

    pub fn node(&self) -> NodeRef<'a, XmlNode> {
        self.node
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn attributes(&self) -> &'a [Attribute] {
        self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn first_child(&self) -> Option<NodeRef<'a, XmlNode>> {
        self.node.first_child()
    }

    pub fn next_element_sibling(&self) -> Option<Element<'a>> {
        skip_to_element(self.node.next_sibling()).and_then(Element::from_node)
    }

    pub fn prev_element_sibling(&self) -> Option<Element<'a>> {
        let mut node = self.node.prev_sibling();
        while let Some(current) = node {
            if let Some(element) = Element::from_node(current) {
                return Some(element);
            }
            node = current.prev_sibling();
        }
        None
    }

    /// Iterates element children in document order.
    ///
    /// Ignorable nodes are skipped; non-whitespace text or CDATA where an
    /// element is expected yields a structural error and ends the iteration.
    pub fn child_elements(&self) -> ChildElements<'a> {
        ChildElements {
            parent: self.name,
            next: self.node.first_child(),
        }
    }

    /// Concatenated text and CDATA content, trimmed.
    ///
    /// Fails if the element has element children.
    pub fn text(&self) -> Result<String, FeedError> {
        let mut out = String::new();
        for child in self.node.children() {
            match child.value() {
                XmlNode::Text(text) | XmlNode::CData(text) => out.push_str(text),
                XmlNode::Element { name, .. } => {
                    return Err(FeedError::unknown_element(self.name, name));
                }
                _ => {}
            }
        }
        Ok(out.trim().to_string())
    }
}

/// Iterator returned by [`Element::child_elements`].
pub struct ChildElements<'a> {
    parent: &'a str,
    next: Option<NodeRef<'a, XmlNode>>,
}

impl<'a> Iterator for ChildElements<'a> {
    type Item = Result<Element<'a>, FeedError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.next {
            self.next = node.next_sibling();
            if let Some(element) = Element::from_node(node) {
                return Some(Ok(element));
            }
            if !node.value().is_ignorable() {
                self.next = None;
                return Some(Err(FeedError::structural(format!(
                    "unexpected text inside <{}>",
                    self.parent
                ))));
            }
        }
        None
    }
}
