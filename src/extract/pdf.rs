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

use lopdf::Document;

use crate::error::ErrorReport;
use crate::error::Fallible;

/// Extract the text of every page. Pages that fail are skipped.
pub fn extract_pdf(bytes: &[u8]) -> Fallible<String> {
    let document = Document::load_mem(bytes)
        .map_err(|e| ErrorReport::data(format!("could not read PDF: {e}")))?;
    let mut pages = Vec::new();
    for page_number in document.get_pages().keys() {
        match document.extract_text(&[*page_number]) {
            Ok(text) => pages.push(text),
            Err(e) => log::warn!("Skipping PDF page {page_number}: {e}"),
        }
    }
    Ok(pages.join("\n"))
}

#[cfg(test)]
mod tests {
    use lopdf::Object;
    use lopdf::Stream;
    use lopdf::content::Content;
    use lopdf::content::Operation;
    use lopdf::dictionary;

    use super::*;
    use crate::error::ErrorKind;

    /// A PDF with one page per line of text.
    fn build_pdf(lines: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let mut kids: Vec<Object> = Vec::new();
        for line in lines {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*line)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }
        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_pages_in_order() {
        let bytes = build_pdf(&[
            "Paris is the capital of France.",
            "Berlin is the capital of Germany.",
        ]);
        let text = extract_pdf(&bytes).unwrap();
        let paris = text.find("Paris is the capital of France.").unwrap();
        let berlin = text.find("Berlin is the capital of Germany.").unwrap();
        assert!(paris < berlin);
    }

    #[test]
    fn test_garbage() {
        let err = extract_pdf(b"definitely not a pdf").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Data);
    }
}
