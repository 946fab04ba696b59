//! Rich-text flattening for part and pin descriptions.
//!
//! Fritzing stores descriptions as Qt rich text, either escaped inside the
//! `<description>` element or as raw (often unbalanced) markup. Both end up
//! here and come out as plain text.

use quick_xml::Reader;
use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::{BytesRef, Event};

const SKIPPED: &[&str] = &["head", "style", "script", "title"];
/// HTML elements that never take an end tag.
const VOID: &[&str] = &["meta", "link", "br", "img", "hr", "input"];
const BLOCKS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "tr", "table", "h1", "h2", "h3", "h4", "h5", "h6", "body",
];

/// Accumulates the visible text of a stream of markup events.
#[derive(Debug, Default)]
pub struct TextFlattener {
    out: String,
    /// Element whose content is being dropped, with its nesting depth.
    skipping: Option<(String, usize)>,
}

impl TextFlattener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, event: &Event<'_>) {
        match event {
            Event::Start(e) => self.open(&element_name(e.local_name().as_ref())),
            Event::Empty(e) => self.empty(&element_name(e.local_name().as_ref())),
            Event::End(e) => self.close(&element_name(e.local_name().as_ref())),
            Event::Text(t) => {
                if let Ok(text) = t.decode() {
                    self.push_str(&text);
                }
            }
            Event::CData(c) => {
                if let Ok(text) = c.decode() {
                    self.push_str(&text);
                }
            }
            Event::GeneralRef(r) => self.push_ref(r),
            _ => {}
        }
    }

    fn is_skipping(&self) -> bool {
        self.skipping.is_some()
    }

    fn open(&mut self, name: &str) {
        if VOID.contains(&name) {
            self.empty(name);
            return;
        }
        if let Some((skipped, depth)) = &mut self.skipping {
            if *skipped == name {
                *depth += 1;
            }
            return;
        }
        if SKIPPED.contains(&name) {
            self.skipping = Some((name.to_string(), 1));
            return;
        }
        if BLOCKS.contains(&name) {
            self.out.push('\n');
        }
    }

    fn empty(&mut self, name: &str) {
        if !self.is_skipping() && name == "br" {
            self.out.push('\n');
        }
    }

    fn close(&mut self, name: &str) {
        if let Some((skipped, depth)) = &mut self.skipping {
            // Only the skipped element's own end tag counts; stray ones inside are ignored.
            if *skipped == name {
                *depth -= 1;
                if *depth == 0 {
                    self.skipping = None;
                }
            }
            return;
        }
        if BLOCKS.contains(&name) {
            self.out.push('\n');
        }
    }

    pub fn push_str(&mut self, text: &str) {
        if !self.is_skipping() {
            self.out.push_str(text);
        }
    }

    fn push_ref(&mut self, r: &BytesRef<'_>) {
        if self.is_skipping() {
            return;
        }
        if let Ok(Some(ch)) = r.resolve_char_ref() {
            self.out.push(ch);
            return;
        }
        let Ok(name) = r.decode() else {
            return;
        };
        match resolve_html5_entity(&name) {
            Some(text) => self.out.push_str(text),
            None => {
                self.out.push('&');
                self.out.push_str(&name);
                self.out.push(';');
            }
        }
    }

    /// Collapse whitespace on every line and drop blank lines.
    pub fn finish(self) -> String {
        self.out
            .lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn element_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

/// Whether a description holds rich-text markup rather than plain prose.
pub fn looks_like_html(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("<!doctype") || lower.contains("<html") || lower.contains("<p>")
}

/// Flatten an HTML fragment to plain text. Never fails: on unrecoverable
/// markup the text seen so far is returned.
pub fn html_to_text(html: &str) -> String {
    let mut reader = Reader::from_str(html);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut flattener = TextFlattener::new();
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(event) => flattener.feed(&event),
            Err(e) => {
                log::debug!(
                    "Stopping rich-text flattening at byte {}: {e}",
                    reader.buffer_position()
                );
                break;
            }
        }
    }
    flattener.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const QT_RICH_TEXT: &str = r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.0//EN" "http://www.w3.org/TR/REC-html40/strict.dtd">
<html><head><meta name="qrichtext" content="1" /><style type="text/css">
p, li { white-space: pre-wrap; }
</style></head><body style=" font-family:'Droid Sans';">
<p style=" margin-top:0px;">A 220&Omega; resistor.</p>
<p>Limits   current&nbsp;flow.<br/>Use with LEDs.</p></body></html>"#;

    #[test]
    fn flattens_qt_rich_text() {
        assert_eq!(
            html_to_text(QT_RICH_TEXT),
            "A 220Ω resistor.\nLimits current flow.\nUse with LEDs."
        );
    }

    #[test]
    fn tolerates_unbalanced_markup() {
        let text = html_to_text("<p>first<b>bold</p><p>second</i></p>");
        assert_eq!(text, "firstbold\nsecond");
    }

    #[test]
    fn unclosed_void_elements_do_not_swallow_the_body() {
        let text = html_to_text(
            r#"<!DOCTYPE HTML><html><head><meta name="qrichtext" content="1"><style>p{}</style></head><body><p>Visible text</p></body></html>"#,
        );
        assert_eq!(text, "Visible text");
    }

    #[test]
    fn skipping_ends_only_at_the_matching_tag() {
        let text = html_to_text("<head><title>T</b></title>hidden</head><p>one<img src=x>two</p>");
        assert_eq!(text, "onetwo");
    }

    #[test]
    fn resolves_html_entities() {
        let text = html_to_text("<p>&plusmn;5&deg;C &amp; 10&micro;F &frac12; &bogus;</p>");
        assert_eq!(text, "±5°C & 10µF ½ &bogus;");
    }

    #[test]
    fn detects_markup() {
        assert!(looks_like_html(QT_RICH_TEXT));
        assert!(!looks_like_html("A plain description, 1 < 2"));
    }
}
