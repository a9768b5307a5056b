//! Main extraction logic for RDF descriptors.

use std::path::Path;

use exn::{OptionExt, ResultExt};
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::instrument;

use crate::consts;
use crate::error::{ErrorKind, Result};
use crate::models::{CatalogEntry, ContentType, Descriptor};

/// Where the text of the current node should be collected, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    Title,
    ContentType,
}

#[derive(Debug, Default)]
struct State {
    /// Qualified names of the currently open elements.
    stack: Vec<String>,
    found_ebook: bool,
    about: Option<String>,
    title: Option<String>,
    content_type: Option<String>,
    variants: Vec<String>,
    capture: Option<(Capture, String)>,
}
impl State {
    fn open(&mut self, reader: &Reader<&[u8]>, element: &BytesStart<'_>) -> Result<String> {
        let name = qualified_name(reader, element.name().as_ref())?;
        match name.as_str() {
            consts::EBOOK if !self.found_ebook => {
                self.found_ebook = true;
                self.about = attribute(reader, element, consts::ABOUT)?;
            },
            consts::FILE => {
                if let Some(locator) = attribute(reader, element, consts::ABOUT)? {
                    self.variants.push(locator);
                }
            },
            consts::TITLE if self.title.is_none() && self.capture.is_none() => {
                self.capture = Some((Capture::Title, String::new()));
            },
            consts::VALUE
                if self.content_type.is_none()
                    && self.capture.is_none()
                    && self.stack.iter().any(|open| open == consts::TYPE) =>
            {
                self.capture = Some((Capture::ContentType, String::new()));
            },
            _ => {},
        }
        Ok(name)
    }

    fn close(&mut self, name: &str) {
        self.stack.pop();
        let finished = match (&self.capture, name) {
            (Some((Capture::Title, _)), consts::TITLE) => true,
            (Some((Capture::ContentType, _)), consts::VALUE) => true,
            _ => false,
        };
        if finished && let Some((capture, text)) = self.capture.take() {
            match capture {
                Capture::Title => self.title = Some(text),
                Capture::ContentType => self.content_type = Some(text),
            }
        }
    }

    fn text(&mut self, text: &str) {
        if let Some((_, buffer)) = self.capture.as_mut() {
            buffer.push_str(text);
        }
    }

    fn into_descriptor(self, path: &Path) -> Result<Descriptor> {
        if !self.found_ebook {
            exn::bail!(ErrorKind::InvalidDocument);
        }
        let id = self::id(self.about.as_deref())?;
        let title = self
            .title
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty())
            .ok_or_raise(|| ErrorKind::MissingField("title"))?;
        let content_type = self.content_type.as_deref().map(ContentType::from).unwrap_or_default();
        tracing::Span::current().record("id", id);
        Ok(Descriptor {
            entry: CatalogEntry {
                id,
                title,
                content_type,
                descriptor: path.to_path_buf(),
            },
            variants: self.variants,
        })
    }
}

/// Extracts a [`Descriptor`] from raw RDF/XML bytes.
///
/// `path` is recorded as the entry's descriptor reference and is otherwise
/// unused; nothing is read from disk.
///
/// # Errors
///
/// Returns an error if:
/// - The XML is not well-formed
/// - There is no `pgterms:ebook` element
/// - The identifier or the title is missing or cannot be parsed
#[instrument(skip(xml), fields(xml_size = xml.len(), id))]
pub fn extract(xml: &[u8], path: impl AsRef<Path> + std::fmt::Debug) -> Result<Descriptor> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut state = State::default();
    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event()
            .or_raise(|| ErrorKind::MalformedXml(format!("unreadable event near byte {position}")))?;
        match event {
            Event::Start(element) => {
                let name = state.open(&reader, &element)?;
                state.stack.push(name);
            },
            Event::Empty(element) => {
                let name = state.open(&reader, &element)?;
                state.stack.push(name.clone());
                state.close(&name);
            },
            Event::End(element) => {
                let name = qualified_name(&reader, element.name().as_ref())?;
                state.close(&name);
            },
            Event::Text(text) => {
                let text = text.decode().or_raise(|| ErrorKind::MalformedXml("text is not valid UTF-8".to_string()))?;
                state.text(&text);
            },
            Event::CData(data) => {
                let text = reader
                    .decoder()
                    .decode(&data)
                    .or_raise(|| ErrorKind::MalformedXml("CDATA is not valid UTF-8".to_string()))?;
                state.text(&text);
            },
            Event::GeneralRef(reference) => {
                let name = reference
                    .decode()
                    .or_raise(|| ErrorKind::MalformedXml("entity name is not valid UTF-8".to_string()))?;
                let entity = format!("&{name};");
                let resolved = unescape(&entity).or_raise(|| ErrorKind::MalformedXml(format!("unknown entity {entity}")))?;
                state.text(&resolved);
            },
            Event::Eof => break,
            _ => {},
        }
    }
    state.into_descriptor(path.as_ref())
}

/// Parses the catalog identifier out of the ebook's `rdf:about` reference.
#[instrument(level = "trace")]
pub(crate) fn id(about: Option<&str>) -> Result<u64> {
    let about = about.ok_or_raise(|| ErrorKind::MissingField("id"))?;
    let digits = consts::EBOOK_ID_REGEX
        .captures(about.trim())
        .and_then(|captures| captures.get(1))
        .ok_or_raise(|| ErrorKind::ParseError {
            field: "id",
            value: about.to_string(),
        })?;
    let id = digits.as_str().parse::<u64>().or_raise(|| ErrorKind::ParseError {
        field: "id",
        value: about.to_string(),
    })?;
    if id == 0 {
        exn::bail!(ErrorKind::ParseError {
            field: "id",
            value: about.to_string(),
        });
    }
    Ok(id)
}

fn qualified_name(reader: &Reader<&[u8]>, raw: &[u8]) -> Result<String> {
    let name = reader
        .decoder()
        .decode(raw)
        .or_raise(|| ErrorKind::MalformedXml("element name is not valid UTF-8".to_string()))?;
    Ok(name.into_owned())
}

fn attribute(reader: &Reader<&[u8]>, element: &BytesStart<'_>, key: &'static str) -> Result<Option<String>> {
    let Some(attribute) = element
        .try_get_attribute(key)
        .or_raise(|| ErrorKind::MalformedXml(format!("broken attributes while looking for {key}")))?
    else {
        return Ok(None);
    };
    let raw = reader
        .decoder()
        .decode(&attribute.value)
        .or_raise(|| ErrorKind::ParseError { field: key, value: "not valid UTF-8".to_string() })?;
    let value = unescape(&raw).or_raise(|| ErrorKind::ParseError { field: key, value: raw.to_string() })?;
    Ok(Some(value.into_owned()))
}
