//! Small helpers over quick-xml shared by metadata and POM handling.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use graven_util::errors::GravenError;

/// Walk an XML document, calling `on_close(path, text)` as each element
/// ends. `path` joins the open element names with `>` (e.g.
/// `metadata>versioning>latest`); `text` is the element's own text, `None`
/// for containers and empty elements.
pub(crate) fn walk(
    xml: &str,
    what: &str,
    mut on_close: impl FnMut(&str, Option<String>),
) -> miette::Result<()> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut text: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                stack.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                text = None;
            }
            Ok(Event::Text(e)) => {
                let value = e.unescape().map_err(|err| parse_error(what, err))?;
                text = Some(value.into_owned());
            }
            Ok(Event::End(_)) => {
                on_close(&stack.join(">"), text.take());
                stack.pop();
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(parse_error(what, e)),
        }
    }

    Ok(())
}

fn parse_error(what: &str, e: impl std::fmt::Display) -> miette::Report {
    GravenError::Publish {
        message: format!("Failed to parse {what}: {e}"),
    }
    .into()
}

/// Indented XML document builder.
pub(crate) struct XmlDoc {
    writer: Writer<Vec<u8>>,
}

impl XmlDoc {
    pub(crate) fn new() -> miette::Result<Self> {
        let mut doc = Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        };
        doc.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(doc)
    }

    pub(crate) fn open(&mut self, tag: &str) -> miette::Result<()> {
        self.event(Event::Start(BytesStart::new(tag)))
    }

    pub(crate) fn open_with(&mut self, tag: &str, attrs: &[(&str, &str)]) -> miette::Result<()> {
        let start = BytesStart::new(tag).with_attributes(attrs.iter().copied());
        self.event(Event::Start(start))
    }

    pub(crate) fn close(&mut self, tag: &str) -> miette::Result<()> {
        self.event(Event::End(BytesEnd::new(tag)))
    }

    /// `<tag>text</tag>`
    pub(crate) fn leaf(&mut self, tag: &str, text: &str) -> miette::Result<()> {
        self.open(tag)?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.close(tag)
    }

    /// Like [`leaf`](Self::leaf) but skips absent values.
    pub(crate) fn leaf_opt(&mut self, tag: &str, text: Option<&str>) -> miette::Result<()> {
        match text {
            Some(text) => self.leaf(tag, text),
            None => Ok(()),
        }
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        let mut bytes = self.writer.into_inner();
        bytes.push(b'\n');
        bytes
    }

    fn event(&mut self, event: Event<'_>) -> miette::Result<()> {
        self.writer.write_event(event).map_err(|e| {
            GravenError::Publish {
                message: format!("Failed to write XML: {e}"),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closes(xml: &str) -> Vec<(String, Option<String>)> {
        let mut out = Vec::new();
        walk(xml, "test", |path, text| out.push((path.to_string(), text))).unwrap();
        out
    }

    #[test]
    fn walk_reports_leaves_and_containers() {
        let events = closes("<a><b>one</b><c><d>two</d></c><e/></a>");
        assert_eq!(
            events,
            vec![
                ("a>b".to_string(), Some("one".to_string())),
                ("a>c>d".to_string(), Some("two".to_string())),
                ("a>c".to_string(), None),
                ("a".to_string(), None),
            ]
        );
    }

    #[test]
    fn walk_rejects_mismatched_tags() {
        let err = walk("<a><b>x</c></a>", "broken.xml", |_, _| {}).unwrap_err();
        assert!(err.to_string().contains("Failed to parse broken.xml"));
    }

    #[test]
    fn doc_escapes_text() {
        let mut doc = XmlDoc::new().unwrap();
        doc.open("root").unwrap();
        doc.leaf("name", "a & b").unwrap();
        doc.close("root").unwrap();
        let xml = String::from_utf8(doc.finish()).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<name>a &amp; b</name>"));
    }
}
