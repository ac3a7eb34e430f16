//! Structured rewrite of a service settings document.

use quick_xml::events::{BytesText, Event};
use quick_xml::{Reader, Writer};

use super::XmlError;

/// Replace the text of every `field` element in `xml` with `value`.
///
/// The document is re-serialized event by event, so everything outside the
/// target element is preserved. Self-closing `<field/>` is expanded. Fails
/// with [`XmlError::MissingElement`] when no such element exists.
pub fn set_element_text(xml: &str, field: &str, value: &str) -> Result<String, XmlError> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let target = field.as_bytes();

    let mut replaced = 0usize;
    // Nesting depth inside the element being replaced; 0 when outside.
    let mut depth = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| XmlError::Malformed(e.to_string()))?;

        if depth > 0 {
            match event {
                Event::Start(_) => depth += 1,
                Event::End(e) => {
                    depth -= 1;
                    if depth == 0 {
                        write(&mut writer, Event::End(e))?;
                    }
                }
                Event::Eof => {
                    return Err(XmlError::Malformed(format!("unclosed <{}>", field)));
                }
                _ => {}
            }
            continue;
        }

        match event {
            Event::Eof => break,
            Event::Start(e) if e.local_name().as_ref() == target => {
                write(&mut writer, Event::Start(e))?;
                write(&mut writer, Event::Text(BytesText::new(value)))?;
                depth = 1;
                replaced += 1;
            }
            Event::Empty(e) if e.local_name().as_ref() == target => {
                let end = e.to_end().into_owned();
                write(&mut writer, Event::Start(e))?;
                write(&mut writer, Event::Text(BytesText::new(value)))?;
                write(&mut writer, Event::End(end))?;
                replaced += 1;
            }
            other => write(&mut writer, other)?,
        }
    }

    if replaced == 0 {
        return Err(XmlError::MissingElement(field.to_string()));
    }

    String::from_utf8(writer.into_inner()).map_err(|e| XmlError::Write(e.to_string()))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), XmlError> {
    writer
        .write_event(event)
        .map_err(|e| XmlError::Write(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WMS_SETTINGS: &str = r#"<wms>
  <enabled>true</enabled>
  <name>WMS</name>
  <maxBuffer>25</maxBuffer>
  <maxRequestMemory>65536</maxRequestMemory>
  <maxRenderingTime>60</maxRenderingTime>
</wms>"#;

    #[test]
    fn test_replaces_field_and_keeps_the_rest() {
        let rewritten = set_element_text(WMS_SETTINGS, "maxRequestMemory", "0").unwrap();
        assert!(rewritten.contains("<maxRequestMemory>0</maxRequestMemory>"));
        assert!(!rewritten.contains("65536"));
        assert!(rewritten.contains("<maxBuffer>25</maxBuffer>"));
        assert!(rewritten.contains("<maxRenderingTime>60</maxRenderingTime>"));
        assert!(rewritten.starts_with("<wms>"));
        assert!(rewritten.ends_with("</wms>"));
    }

    #[test]
    fn test_keeps_declaration_and_attributes() {
        let xml = r#"<?xml version="1.0"?><wms id="x"><maxRequestMemory>1</maxRequestMemory></wms>"#;
        let rewritten = set_element_text(xml, "maxRequestMemory", "0").unwrap();
        assert_eq!(
            rewritten,
            r#"<?xml version="1.0"?><wms id="x"><maxRequestMemory>0</maxRequestMemory></wms>"#
        );
    }

    #[test]
    fn test_expands_self_closing_field() {
        let xml = "<wms><maxRequestMemory/></wms>";
        let rewritten = set_element_text(xml, "maxRequestMemory", "0").unwrap();
        assert_eq!(rewritten, "<wms><maxRequestMemory>0</maxRequestMemory></wms>");
    }

    #[test]
    fn test_similar_names_are_untouched() {
        let xml = "<wms><maxRequestMemoryHint>5</maxRequestMemoryHint>\
                   <maxRequestMemory>7</maxRequestMemory></wms>";
        let rewritten = set_element_text(xml, "maxRequestMemory", "0").unwrap();
        assert!(rewritten.contains("<maxRequestMemoryHint>5</maxRequestMemoryHint>"));
        assert!(rewritten.contains("<maxRequestMemory>0</maxRequestMemory>"));
    }

    #[test]
    fn test_value_is_escaped() {
        let xml = "<wms><title>old</title></wms>";
        let rewritten = set_element_text(xml, "title", "a<b").unwrap();
        assert_eq!(rewritten, "<wms><title>a&lt;b</title></wms>");
    }

    #[test]
    fn test_missing_field() {
        let xml = "<wms><maxBuffer>25</maxBuffer></wms>";
        assert_eq!(
            set_element_text(xml, "maxRequestMemory", "0"),
            Err(XmlError::MissingElement("maxRequestMemory".to_string()))
        );
    }

    #[test]
    fn test_malformed_document() {
        let xml = "<wms><maxRequestMemory>1</maxBuffer></wms>";
        assert!(matches!(
            set_element_text(xml, "maxRequestMemory", "0"),
            Err(XmlError::Malformed(_))
        ));
    }
}
