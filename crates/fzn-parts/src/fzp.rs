//! Permissive reader for Fritzing part definition (`.fzp`) documents.
//!
//! Catalog documents in the wild carry unbalanced tags and raw rich text, so
//! this is a streaming reader that recovers instead of a DOM parse: a stray
//! closing tag pops back to the nearest matching open element, and a reader
//! error after the module id was seen keeps everything parsed so far.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::part::{PartPin, Properties, StaticPart, clean_pin_name};
use crate::text::{TextFlattener, html_to_text, looks_like_html};
use crate::{PartsError, Result};

/// Designator prefix for parts whose document has no `<label>`.
pub const DEFAULT_DESIGNATOR_PREFIX: &str = "U";

#[derive(Debug)]
enum Field {
    Title,
    Label,
    Description,
    Property(String),
    PinDescription(usize),
}

#[derive(Debug, Default)]
struct PartBuilder {
    module_id: Option<String>,
    title: Option<String>,
    label: Option<String>,
    description: Option<String>,
    properties: Properties,
    label_properties: Vec<String>,
    pins: Vec<PartPin>,
}

impl PartBuilder {
    fn start(&mut self, path: &[String], e: &BytesStart<'_>) -> Option<Field> {
        let path: Vec<&str> = path.iter().map(String::as_str).collect();
        match path.as_slice() {
            ["module"] => {
                self.module_id = attr(e, "moduleId");
                None
            }
            ["module", "title"] => Some(Field::Title),
            ["module", "label"] => Some(Field::Label),
            ["module", "description"] => Some(Field::Description),
            ["module", "properties", "property"] => {
                let name = attr(e, "name")?.trim().to_lowercase();
                if attr(e, "showInLabel").is_some_and(|v| v.eq_ignore_ascii_case("yes")) {
                    self.label_properties.push(name.clone());
                }
                if let Some(value) = attr(e, "value") {
                    self.properties.insert(name.clone(), value.trim().to_string());
                }
                Some(Field::Property(name))
            }
            ["module", "connectors", "connector"] => {
                let pin_id = attr(e, "id")?;
                let name = attr(e, "name").unwrap_or_else(|| pin_id.clone());
                self.pins.push(PartPin {
                    short_name: clean_pin_name(&name),
                    pin_id,
                    description: None,
                });
                None
            }
            ["module", "connectors", "connector", "description"] => {
                self.pins.len().checked_sub(1).map(Field::PinDescription)
            }
            _ => None,
        }
    }

    fn finish_field(&mut self, field: Field, flattener: TextFlattener) {
        let text = flattener.finish();
        match field {
            Field::Title => self.title = Some(text),
            Field::Label => self.label = Some(text),
            Field::Description => self.description = rich_text(text),
            Field::Property(name) => {
                if !text.is_empty() || !self.properties.contains_key(&name) {
                    self.properties.insert(name, text);
                }
            }
            Field::PinDescription(idx) => {
                if let Some(pin) = self.pins.get_mut(idx) {
                    pin.description = rich_text(text);
                }
            }
        }
    }

    fn build(self) -> Result<StaticPart> {
        let id = self.module_id.ok_or(PartsError::MissingModuleId)?;
        let designator_prefix = self
            .label
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| DEFAULT_DESIGNATOR_PREFIX.to_string());
        let title = self
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| id.clone());

        Ok(StaticPart {
            id,
            title,
            description: self.description,
            designator_prefix,
            pins: self.pins,
            properties: self.properties,
            label_properties: self.label_properties,
        })
    }
}

fn rich_text(text: String) -> Option<String> {
    let text = if looks_like_html(&text) {
        html_to_text(&text)
    } else {
        text
    };
    (!text.is_empty()).then_some(text)
}

fn attr(e: &BytesStart<'_>, name: &str) -> Option<String> {
    e.html_attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name.as_bytes())
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Parse one part definition document into a static part.
pub fn parse_part(xml: &str) -> Result<StaticPart> {
    let mut reader = Reader::from_str(xml);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut builder = PartBuilder::default();
    let mut stack: Vec<String> = Vec::new();
    // Field being captured and the stack depth that owns it.
    let mut capture: Option<(usize, Field, TextFlattener)> = None;

    loop {
        let event = match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(event) => event,
            Err(e) if builder.module_id.is_some() => {
                log::warn!(
                    "Recovering part {:?} after malformed markup at byte {}: {e}",
                    builder.module_id,
                    reader.buffer_position()
                );
                break;
            }
            Err(e) => return Err(e.into()),
        };

        match &event {
            Event::Start(e) => {
                stack.push(local_name(e));
                if let Some((_, _, flattener)) = capture.as_mut() {
                    flattener.feed(&event);
                } else if let Some(field) = builder.start(&stack, e) {
                    capture = Some((stack.len(), field, TextFlattener::new()));
                }
            }
            Event::Empty(e) => {
                if let Some((_, _, flattener)) = capture.as_mut() {
                    flattener.feed(&event);
                } else {
                    stack.push(local_name(e));
                    if let Some(field) = builder.start(&stack, e) {
                        builder.finish_field(field, TextFlattener::new());
                    }
                    stack.pop();
                }
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                let Some(pos) = stack.iter().rposition(|open| *open == name) else {
                    continue;
                };
                stack.truncate(pos);
                match capture.take() {
                    Some((depth, field, flattener)) if stack.len() < depth => {
                        builder.finish_field(field, flattener);
                    }
                    Some((depth, field, mut flattener)) => {
                        flattener.feed(&event);
                        capture = Some((depth, field, flattener));
                    }
                    None => {}
                }
            }
            _ => {
                if let Some((_, _, flattener)) = capture.as_mut() {
                    flattener.feed(&event);
                }
            }
        }
    }

    if let Some((_, field, flattener)) = capture {
        builder.finish_field(field, flattener);
    }
    builder.build()
}
