//! Feature type listing parser.

use quick_xml::events::Event;
use quick_xml::Reader;

use super::XmlError;

const NAME_ELEMENT: &[u8] = b"featureTypeName";

/// Extract every `featureTypeName` from a feature type listing.
///
/// Order follows the document; blank names are dropped and repeats are kept once.
pub fn parse_feature_type_names(xml: &str) -> Result<Vec<String>, XmlError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut names: Vec<String> = Vec::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == NAME_ELEMENT => {
                current = Some(String::new());
            }
            Ok(Event::Text(t)) => {
                if let Some(name) = current.as_mut() {
                    let text = t.unescape().map_err(|e| XmlError::Malformed(e.to_string()))?;
                    name.push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(name) = current.as_mut() {
                    name.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == NAME_ELEMENT => {
                if let Some(name) = current.take() {
                    let name = name.trim().to_string();
                    if !name.is_empty() && !names.contains(&name) {
                        names.push(name);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XmlError::Malformed(e.to_string())),
            _ => {}
        }
    }

    Ok(names)
}
