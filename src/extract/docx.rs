// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::io::Cursor;
use std::io::Read;

use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;

use crate::error::ErrorReport;
use crate::error::Fallible;

/// Where a DOCX archive keeps the main document body.
const DOCUMENT_PART: &str = "word/document.xml";

pub fn extract_docx(bytes: &[u8]) -> Fallible<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ErrorReport::data(format!("not a valid DOCX archive: {e}")))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ErrorReport::data(format!("DOCX archive has no {DOCUMENT_PART}: {e}")))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    document_xml_to_text(&xml)
}

/// Flatten WordprocessingML into text: one line per paragraph, with tabs and
/// breaks kept as whitespace.
fn document_xml_to_text(xml: &str) -> Fallible<String> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text = true;
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => out.push('\t'),
                b"br" | b"cr" | b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text {
                    let text = e
                        .unescape()
                        .map_err(|e| ErrorReport::data(format!("bad text in DOCX: {e}")))?;
                    out.push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ErrorReport::data(format!(
                    "malformed DOCX XML at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }
    Ok(out.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    use super::*;

    const BODY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Rust is a language.</w:t></w:r></w:p>
    <w:p><w:r><w:t xml:space="preserve">Cargo </w:t></w:r><w:r><w:t>is &amp; was</w:t></w:r><w:r><w:tab/><w:t>tools.</w:t></w:r></w:p>
    <w:p/>
    <w:p><w:r><w:t>Last</w:t><w:br/><w:t>line</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    fn make_docx(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in parts {
            writer
                .start_file(name.to_string(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extract_paragraphs() -> Fallible<()> {
        let bytes = make_docx(&[(DOCUMENT_PART, BODY)]);
        let text = extract_docx(&bytes)?;
        assert_eq!(
            text,
            "Rust is a language.\nCargo is & was\ttools.\n\nLast\nline"
        );
        Ok(())
    }

    #[test]
    fn test_missing_document_part() {
        let bytes = make_docx(&[("word/styles.xml", "<w:styles/>")]);
        assert!(extract_docx(&bytes).is_err());
    }

    #[test]
    fn test_not_a_zip() {
        assert!(extract_docx(b"plain text").is_err());
    }
}
