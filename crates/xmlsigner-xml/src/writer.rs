#![forbid(unsafe_code)]

//! XML writing utilities using quick-xml's `Writer`.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use xmlsigner_core::Error;

/// A compact XML writer: no declaration, no indentation.
pub struct XmlWriter {
    writer: quick_xml::Writer<Vec<u8>>,
}

impl XmlWriter {
    /// Create a new XML writer.
    pub fn new() -> Self {
        Self {
            writer: quick_xml::Writer::new(Vec::new()),
        }
    }

    /// Start an element with the given name and attributes.
    pub fn start_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), Error> {
        self.write(Event::Start(start_tag(name, attrs)))
    }

    /// Write an empty element (self-closing).
    pub fn empty_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), Error> {
        self.write(Event::Empty(start_tag(name, attrs)))
    }

    /// End the current element.
    pub fn end_element(&mut self, name: &str) -> Result<(), Error> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    /// Write text content. Only `<`, `>` and `&` are escaped; quotes are
    /// left as they are.
    pub fn write_text(&mut self, text: &str) -> Result<(), Error> {
        let escaped = quick_xml::escape::partial_escape(text);
        self.write(Event::Text(BytesText::from_escaped(escaped)))
    }

    /// Finish writing and return the XML bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_inner()
    }

    /// Finish writing and return the XML as a string.
    pub fn into_string(self) -> Result<String, Error> {
        String::from_utf8(self.into_bytes()).map_err(|e| Error::XmlWrite(e.to_string()))
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), Error> {
        self.writer
            .write_event(event)
            .map_err(|e| Error::XmlWrite(e.to_string()))
    }
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn start_tag<'a>(name: &'a str, attrs: &[(&'a str, &'a str)]) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    for &(key, value) in attrs {
        start.push_attribute((key, value));
    }
    start
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_nested() {
        let mut w = XmlWriter::new();
        w.start_element("a", &[("x", "1")]).unwrap();
        w.empty_element("b", &[]).unwrap();
        w.write_text("t").unwrap();
        w.end_element("a").unwrap();
        assert_eq!(w.into_string().unwrap(), r#"<a x="1"><b/>t</a>"#);
    }

    #[test]
    fn test_text_keeps_quotes() {
        let mut w = XmlWriter::new();
        w.start_element("n", &[]).unwrap();
        w.write_text("O'Brien \"Ltd\" > Co").unwrap();
        w.end_element("n").unwrap();
        assert_eq!(w.into_string().unwrap(), "<n>O'Brien \"Ltd\" &gt; Co</n>");
    }

    #[test]
    fn test_escaping() {
        let mut w = XmlWriter::new();
        w.start_element("a", &[("v", "x<y&z")]).unwrap();
        w.write_text("1 < 2 & 3").unwrap();
        w.end_element("a").unwrap();
        assert_eq!(
            w.into_string().unwrap(),
            r#"<a v="x&lt;y&amp;z">1 &lt; 2 &amp; 3</a>"#
        );
    }
}
