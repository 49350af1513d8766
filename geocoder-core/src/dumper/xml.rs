//! Small wrapper over `quick_xml::Writer` shared by the XML dumpers.

use quick_xml::{
    Writer,
    events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::error::{Error, Result};

pub(crate) struct XmlDocument {
    format: &'static str,
    writer: Writer<Vec<u8>>,
}

impl XmlDocument {
    /// Starts a UTF-8 document, indented by four spaces.
    pub(crate) fn new(format: &'static str, standalone: Option<&str>) -> Result<Self> {
        let mut doc = Self {
            format,
            writer: Writer::new_with_indent(Vec::new(), b' ', 4),
        };
        doc.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), standalone)))?;
        Ok(doc)
    }

    pub(crate) fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let element = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.write(Event::Start(element))
    }

    pub(crate) fn end(&mut self, name: &str) -> Result<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    pub(crate) fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let element = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.write(Event::Empty(element))
    }

    /// `<name>text</name>`, with `text` escaped.
    pub(crate) fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.start(name, &[])?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    /// `<name><![CDATA[text]]></name>`; embedded `]]>` is split across sections.
    pub(crate) fn cdata_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.start(name, &[])?;
        let mut rest = text;
        while let Some(idx) = rest.find("]]>") {
            self.write(Event::CData(BytesCData::new(&rest[..idx + 2])))?;
            rest = &rest[idx + 2..];
        }
        self.write(Event::CData(BytesCData::new(rest)))?;
        self.end(name)
    }

    pub(crate) fn finish(self) -> Result<String> {
        let mut bytes = self.writer.into_inner();
        bytes.push(b'\n');
        String::from_utf8(bytes).map_err(|e| document_error(self.format, e))
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer.write_event(event).map_err(|e| document_error(self.format, e))
    }
}

fn document_error(format: &'static str, err: impl std::fmt::Display) -> Error {
    Error::Document { format, reason: err.to_string() }
}
