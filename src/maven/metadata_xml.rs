use std::io::{BufReader, Read};

use anyhow::anyhow;
use xml::reader::{ParserConfig, XmlEvent};

/// The parts of a snapshot's maven-metadata.xml that are needed to build the timestamped file name.
///
/// See https://maven.apache.org/ref/3.9.5/maven-repository-metadata/repository-metadata.html
#[derive(Debug, Default, Eq, PartialEq)]
pub struct SnapshotInfo {
    pub timestamp: Option<String>,
    pub build_number: Option<String>,
}

impl SnapshotInfo {
    fn is_complete(&self) -> bool {
        self.timestamp.is_some() && self.build_number.is_some()
    }
}

enum Field {
    Timestamp,
    BuildNumber,
}

pub fn metadata_parser_config() -> ParserConfig {
    ParserConfig::new()
        .trim_whitespace(true)
        .cdata_to_characters(true)
        .ignore_comments(true)
}

/// Reads the first `<timestamp>` and the first `<buildNumber>` wherever they occur in the document.
///  Parsing stops as soon as both were seen, so the rest of the document is never read. Elements
///  that are missing or empty are left as `None`.
pub fn parse_snapshot_info<R: Read>(config: &ParserConfig, source: R) -> anyhow::Result<SnapshotInfo> {
    let reader = config.clone().create_reader(BufReader::new(source));

    let mut info = SnapshotInfo::default();
    let mut current: Option<Field> = None;
    let mut text = String::new();

    for event in reader {
        let event = event.map_err(|e| anyhow!("malformed maven-metadata.xml: {}", e))?;

        match event {
            XmlEvent::StartElement { name, .. } => {
                current = match name.local_name.as_str() {
                    "timestamp" if info.timestamp.is_none() => Some(Field::Timestamp),
                    "buildNumber" if info.build_number.is_none() => Some(Field::BuildNumber),
                    _ => None,
                };
                text.clear();
            }
            XmlEvent::Characters(s) => {
                if current.is_some() {
                    text.push_str(&s);
                }
            }
            XmlEvent::EndElement { .. } => {
                let value = Some(text.trim().to_string())
                    .filter(|s| !s.is_empty());

                match current.take() {
                    Some(Field::Timestamp) => info.timestamp = value,
                    Some(Field::BuildNumber) => info.build_number = value,
                    None => {}
                }

                if info.is_complete() {
                    break;
                }
            }
            _ => {}
        }
    }

    Ok(info)
}

#[cfg(test)]
pub(crate) const SAMPLE_SNAPSHOT_METADATA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<metadata modelVersion="1.1.0">
  <groupId>org.ex</groupId>
  <artifactId>lib</artifactId>
  <version>1.0.0-SNAPSHOT</version>
  <versioning>
    <snapshot>
      <timestamp>20240102.030405</timestamp>
      <buildNumber>7</buildNumber>
    </snapshot>
    <lastUpdated>20240102030405</lastUpdated>
    <snapshotVersions>
      <snapshotVersion>
        <extension>jar</extension>
        <value>1.0.0-20240102.030405-7</value>
        <updated>20240102030405</updated>
      </snapshotVersion>
    </snapshotVersions>
  </versioning>
</metadata>
"#;
