//! XML utility functions
//!
//! Reading and writing the `<GDALMetadata>` document GDAL stores in TIFF
//! tag 42112.

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

/// One `<Item>` of a GDALMetadata document
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataItem {
    pub name: String,
    /// 0-based band the item applies to, `None` for dataset-level items
    pub sample: Option<u32>,
    pub role: Option<String>,
    pub value: String,
}

impl MetadataItem {
    /// A band-level item with a GDAL role, e.g. `SCALE` / `scale`
    pub fn band_item(name: &str, sample: u32, role: &str, value: String) -> Self {
        MetadataItem {
            name: name.to_string(),
            sample: Some(sample),
            role: Some(role.to_string()),
            value,
        }
    }
}

/// Parses the items of a GDALMetadata document
pub fn parse_gdal_metadata(xml: &str) -> Result<Vec<MetadataItem>, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<MetadataItem> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"Item" => {
                let mut item = MetadataItem { name: String::new(), sample: None, role: None, value: String::new() };

                for attr in e.attributes() {
                    let attr = attr.map_err(|e| e.to_string())?;
                    let value = attr.unescape_value().map_err(|e| e.to_string())?.into_owned();
                    match attr.key.as_ref() {
                        b"name" => item.name = value,
                        b"sample" => item.sample = value.trim().parse().ok(),
                        b"role" => item.role = Some(value),
                        _ => {}
                    }
                }

                current = Some(item);
            }
            Ok(Event::Text(t)) => {
                if let Some(item) = current.as_mut() {
                    item.value.push_str(&t.unescape().map_err(|e| e.to_string())?);
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"Item" => {
                if let Some(item) = current.take() {
                    items.push(item);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("XML error at position {}: {}", reader.buffer_position(), e)),
            _ => {}
        }
    }

    Ok(items)
}

/// Serialises items into a GDALMetadata document
pub fn build_gdal_metadata(items: &[MetadataItem]) -> String {
    let mut xml = String::from("<GDALMetadata>\n");

    for item in items {
        xml.push_str(&format!("  <Item name=\"{}\"", escape(item.name.as_str())));
        if let Some(sample) = item.sample {
            xml.push_str(&format!(" sample=\"{}\"", sample));
        }
        if let Some(role) = &item.role {
            xml.push_str(&format!(" role=\"{}\"", escape(role.as_str())));
        }
        xml.push_str(&format!(">{}</Item>\n", escape(item.value.as_str())));
    }

    xml.push_str("</GDALMetadata>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_band_scale_and_offset() {
        let xml = r#"<GDALMetadata>
  <Item name="STATISTICS_MAXIMUM" sample="0">412.5</Item>
  <Item name="OFFSET" sample="0" role="offset">-10</Item>
  <Item name="SCALE" sample="0" role="scale">0.01</Item>
</GDALMetadata>"#;

        let items = parse_gdal_metadata(xml).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].role.as_deref(), Some("offset"));
        assert_eq!(items[1].value, "-10");
        assert_eq!(items[2].sample, Some(0));
    }

    #[test]
    fn built_document_parses_back() {
        let items = vec![MetadataItem::band_item("SCALE", 0, "scale", "2".to_string())];
        let xml = build_gdal_metadata(&items);
        assert_eq!(parse_gdal_metadata(&xml).unwrap(), items);
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(parse_gdal_metadata("<GDALMetadata><Item name=\"a\">1</Value></GDALMetadata>").is_err());
    }
}
