//! A minimal owned element tree between `quick_xml` events and components.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::error::{XmlError, XmlErrorKind, XmlResult};

/// One XML element with its resolved namespace and collected text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Local name, without prefix.
    pub name: String,
    /// Namespace URI the prefix resolved to.
    pub namespace: Option<String>,
    /// Non-namespace attributes in document order.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    /// Concatenated character data (entities resolved).
    pub text: String,
    /// 1-based line of the start tag; 0 for built elements.
    pub line: usize,
}

impl Element {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::new(name)
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First child with this local name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Children with this local name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }
}

/// Reads a document into its root element, resolving namespace prefixes.
///
/// ## Errors
/// Returns an error for malformed XML, undecodable text, or nesting deeper
/// than `max_depth`.
pub fn read(input: &str, max_depth: usize) -> XmlResult<Element> {
    let mut reader = Reader::from_str(input);
    let mut stack: Vec<Element> = Vec::new();
    let mut scopes: Vec<Vec<(String, String)>> = Vec::new();
    let mut root = None;
    let mut lines = LineCounter::default();

    loop {
        let offset = usize::try_from(reader.buffer_position()).unwrap_or(input.len());
        match reader.read_event()? {
            Event::Start(e) => {
                check_depth(stack.len(), max_depth)?;
                let mut element = open(&e, &mut scopes)?;
                element.line = lines.line_at(input, offset);
                stack.push(element);
            }
            Event::Empty(e) => {
                check_depth(stack.len(), max_depth)?;
                let mut element = open(&e, &mut scopes)?;
                element.line = lines.line_at(input, offset);
                scopes.pop();
                close(element, &mut stack, &mut root);
            }
            Event::End(_) => {
                scopes.pop();
                let element = stack
                    .pop()
                    .ok_or_else(|| XmlError::xml("end tag without start tag"))?;
                close(element, &mut stack, &mut root);
            }
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(std::str::from_utf8(&text)?);
                }
            }
            Event::CData(data) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(std::str::from_utf8(&data)?);
                }
            }
            Event::GeneralRef(reference) => {
                if let Some(top) = stack.last_mut() {
                    let entity = format!("&{};", std::str::from_utf8(&reference)?);
                    let resolved = quick_xml::escape::unescape(&entity)?;
                    top.text.push_str(&resolved);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(XmlError::xml("unexpected end of input"));
    }
    root.ok_or_else(|| XmlError::missing_element("document element"))
}

/// Line numbers for increasing byte offsets, counted once.
#[derive(Default)]
struct LineCounter {
    offset: usize,
    line: usize,
}

impl LineCounter {
    fn line_at(&mut self, input: &str, offset: usize) -> usize {
        let offset = offset.min(input.len());
        if offset > self.offset {
            self.line += input
                .get(self.offset..offset)
                .map_or(0, |skipped| skipped.matches('\n').count());
            self.offset = offset;
        }
        self.line + 1
    }
}

fn check_depth(depth: usize, max_depth: usize) -> XmlResult<()> {
    if depth >= max_depth {
        return Err(XmlError::new(
            XmlErrorKind::DepthExceeded,
            format!("limit {max_depth}"),
        ));
    }
    Ok(())
}

fn open(start: &BytesStart<'_>, scopes: &mut Vec<Vec<(String, String)>>) -> XmlResult<Element> {
    let mut declarations = Vec::new();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = quick_xml::escape::unescape(std::str::from_utf8(&attr.value)?)?.into_owned();
        if key == "xmlns" {
            declarations.push((String::new(), value));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            declarations.push((prefix.to_string(), value));
        } else {
            attributes.push((key.to_string(), value));
        }
    }
    scopes.push(declarations);

    let qualified = std::str::from_utf8(start.name().as_ref())?.to_string();
    let (prefix, local) = qualified
        .split_once(':')
        .map_or(("", qualified.as_str()), |(p, l)| (p, l));
    let namespace = scopes
        .iter()
        .rev()
        .flat_map(|scope| scope.iter().rev())
        .find(|(p, _)| p == prefix)
        .map(|(_, uri)| uri.clone());

    Ok(Element {
        name: local.to_string(),
        namespace,
        attributes,
        children: Vec::new(),
        text: String::new(),
        line: 0,
    })
}

fn close(element: Element, stack: &mut [Element], root: &mut Option<Element>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

/// Writes an element tree as a UTF-8 document with an XML declaration.
///
/// ## Errors
/// Returns an error if the writer fails.
pub fn write(root: &Element) -> XmlResult<String> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut writer, root)?;
    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, element: &Element) -> XmlResult<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if element.children.is_empty() && element.text.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;
    if !element.text.is_empty() {
        writer.write_event(Event::Text(BytesText::new(&element.text)))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}
