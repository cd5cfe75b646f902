use crate::config;
use crate::models::DumpPage;
use anyhow::{Context, Result};
use bzip2::read::BzDecoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::warn;

/// Text-bearing element the cursor is currently inside.
enum Field {
    Title,
    Ns,
    Id,
    Text,
}

/// Streaming reader over a bz2-compressed MediaWiki export. Decompression
/// and XML parsing are incremental, so memory stays flat regardless of dump
/// size.
pub struct DumpReader {
    reader: Reader<BufReader<BzDecoder<File>>>,
    buf: Vec<u8>,
    schema_checked: bool,
}

impl DumpReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open dump file: {}", path.display()))?;
        let decoder = BzDecoder::new(file);
        let reader = Reader::from_reader(BufReader::with_capacity(1 << 20, decoder));
        Ok(Self {
            reader,
            buf: Vec::new(),
            schema_checked: false,
        })
    }

    /// Reads the next `<page>` subtree, None once the dump is exhausted.
    pub fn next_page(&mut self) -> Result<Option<DumpPage>> {
        let mut page: Option<DumpPage> = None;
        let mut field: Option<Field> = None;
        let mut value = String::new();

        loop {
            self.buf.clear();
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .context("Malformed XML in dump stream")?;

            match event {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"mediawiki" => {
                        if !self.schema_checked {
                            self.schema_checked = true;
                            check_schema(&e);
                        }
                    }
                    b"page" => page = Some(DumpPage::default()),
                    b"redirect" => {
                        if let Some(p) = page.as_mut() {
                            p.redirect = true;
                        }
                    }
                    b"title" if page.is_some() => {
                        field = Some(Field::Title);
                        value.clear();
                    }
                    b"ns" if page.is_some() => {
                        field = Some(Field::Ns);
                        value.clear();
                    }
                    b"id" if page.is_some() => {
                        field = Some(Field::Id);
                        value.clear();
                    }
                    b"text" if page.is_some() => {
                        field = Some(Field::Text);
                        value.clear();
                    }
                    _ => {}
                },
                Event::Empty(e) => {
                    if e.local_name().as_ref() == b"redirect" {
                        if let Some(p) = page.as_mut() {
                            p.redirect = true;
                        }
                    }
                }
                Event::Text(e) => {
                    if field.is_some() {
                        let text = e.unescape().context("Invalid text encoding in dump")?;
                        value.push_str(&text);
                    }
                }
                Event::CData(e) => {
                    if field.is_some() {
                        value.push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"page" if page.is_some() => return Ok(page),
                    b"title" | b"ns" | b"id" | b"text" => {
                        if let (Some(p), Some(f)) = (page.as_mut(), field.take()) {
                            commit_field(p, f, &value);
                        }
                        value.clear();
                    }
                    _ => {}
                },
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }
}

impl Iterator for DumpReader {
    type Item = Result<DumpPage>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_page().transpose()
    }
}

// The page id element precedes the revision and contributor ids, so the
// first id committed per page is the page's own.
fn commit_field(page: &mut DumpPage, field: Field, value: &str) {
    match field {
        Field::Title => {
            if page.title.is_none() {
                page.title = Some(value.to_string());
            }
        }
        Field::Ns => {
            if page.ns.is_none() {
                page.ns = value.trim().parse::<i32>().ok();
            }
        }
        Field::Id => {
            if page.id.is_none() {
                page.id = value.trim().parse::<u32>().ok();
            }
        }
        Field::Text => {
            if page.text.is_none() {
                page.text = Some(value.to_string());
            }
        }
    }
}

fn check_schema(e: &BytesStart) {
    match e.try_get_attribute("xmlns") {
        Ok(Some(attr)) => {
            let value = String::from_utf8_lossy(&attr.value);
            if !value.starts_with(config::MEDIAWIKI_EXPORT_NS) {
                warn!(namespace = %value, "Unrecognized export schema, proceeding anyway");
            }
        }
        Ok(None) => warn!("Dump root carries no xmlns attribute"),
        Err(e) => warn!(error = %e, "Failed to read xmlns attribute"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bzip2::write::BzEncoder;
    use bzip2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_bz2(xml: &str) -> NamedTempFile {
        let mut encoder = BzEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(xml.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&compressed).unwrap();
        file.flush().unwrap();
        file
    }

    const SAMPLE: &str = r#"<mediawiki xmlns="http://www.mediawiki.org/xml/export-0.11/">
  <siteinfo><sitename>Test</sitename></siteinfo>
  <page>
    <title>First</title>
    <ns>0</ns>
    <id>10</id>
    <revision>
      <id>900</id>
      <text>Body of first</text>
    </revision>
  </page>
  <page>
    <title>Redirected</title>
    <ns>0</ns>
    <id>11</id>
    <redirect title="First" />
    <revision>
      <id>901</id>
      <text>#REDIRECT [[First]]</text>
    </revision>
  </page>
</mediawiki>"#;

    #[test]
    fn reads_pages_in_order() {
        let file = write_bz2(SAMPLE);
        let mut reader = DumpReader::open(file.path()).unwrap();

        let first = reader.next_page().unwrap().unwrap();
        assert_eq!(first.title.as_deref(), Some("First"));
        assert_eq!(first.ns, Some(0));
        assert_eq!(first.id, Some(10));
        assert_eq!(first.text.as_deref(), Some("Body of first"));
        assert!(!first.redirect);

        let second = reader.next_page().unwrap().unwrap();
        assert_eq!(second.title.as_deref(), Some("Redirected"));
        assert!(second.redirect);

        assert!(reader.next_page().unwrap().is_none());
        assert!(reader.next_page().unwrap().is_none());
    }

    #[test]
    fn page_id_wins_over_revision_id() {
        let file = write_bz2(SAMPLE);
        let mut reader = DumpReader::open(file.path()).unwrap();
        let page = reader.next_page().unwrap().unwrap();
        assert_eq!(page.id, Some(10));
    }

    #[test]
    fn cdata_text_preserved_verbatim() {
        let xml = r#"<mediawiki xmlns="http://www.mediawiki.org/xml/export-0.11/">
  <page>
    <title>Cdata</title>
    <ns>0</ns>
    <id>1</id>
    <revision><text><![CDATA[Raw <b>markup</b> & all]]></text></revision>
  </page>
</mediawiki>"#;
        let file = write_bz2(xml);
        let mut reader = DumpReader::open(file.path()).unwrap();
        let page = reader.next_page().unwrap().unwrap();
        assert_eq!(page.text.as_deref(), Some("Raw <b>markup</b> & all"));
    }

    #[test]
    fn entities_unescaped_in_text() {
        let xml = r#"<mediawiki xmlns="http://www.mediawiki.org/xml/export-0.11/">
  <page>
    <title>AT&amp;T</title>
    <ns>0</ns>
    <id>2</id>
    <revision><text>Ampersands &amp; angles &lt;here&gt;</text></revision>
  </page>
</mediawiki>"#;
        let file = write_bz2(xml);
        let mut reader = DumpReader::open(file.path()).unwrap();
        let page = reader.next_page().unwrap().unwrap();
        assert_eq!(page.title.as_deref(), Some("AT&T"));
        assert_eq!(page.text.as_deref(), Some("Ampersands & angles <here>"));
    }

    #[test]
    fn open_missing_file_errors() {
        assert!(DumpReader::open(Path::new("/nonexistent/dump.xml.bz2")).is_err());
    }

    #[test]
    fn iterator_yields_all_pages() {
        let file = write_bz2(SAMPLE);
        let reader = DumpReader::open(file.path()).unwrap();
        let pages: Result<Vec<DumpPage>> = reader.collect();
        assert_eq!(pages.unwrap().len(), 2);
    }
}
