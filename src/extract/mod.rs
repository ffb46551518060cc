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

//! Best-effort plain text extraction from uploaded documents.

mod docx;
mod pdf;
mod text;

use std::path::Path;

use crate::error::Fallible;

/// An uploaded file: its client-side name and raw contents.
#[derive(Clone, Debug)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    /// Plain text. Also the fallback for unknown extensions.
    Text,
}

impl DocumentKind {
    pub fn from_name(name: &str) -> Self {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();
        match extension.as_str() {
            "pdf" => DocumentKind::Pdf,
            "docx" => DocumentKind::Docx,
            _ => DocumentKind::Text,
        }
    }
}

pub fn extract_text(upload: &Upload) -> Fallible<String> {
    let kind = DocumentKind::from_name(&upload.name);
    log::debug!(
        "Extracting {kind:?} text from {} ({} bytes)",
        upload.name,
        upload.bytes.len()
    );
    match kind {
        DocumentKind::Pdf => pdf::extract_pdf(&upload.bytes),
        DocumentKind::Docx => docx::extract_docx(&upload.bytes),
        DocumentKind::Text => Ok(text::decode_text(&upload.bytes)),
    }
}

/// Extract every upload and join the non-empty results with a blank line.
pub fn extract_text_from_files(uploads: &[Upload]) -> Fallible<String> {
    let mut texts = Vec::new();
    for upload in uploads {
        let text = extract_text(upload)?;
        if !text.is_empty() {
            texts.push(text);
        }
    }
    Ok(texts.join("\n\n"))
}

/// The study material for one generation: extracted files followed by the
/// pasted text, trimmed. Empty means there is nothing to work with.
pub fn gather_study_text(uploads: &[Upload], pasted: &str) -> Fallible<String> {
    let mut content = extract_text_from_files(uploads)?;
    if !pasted.is_empty() {
        content.push('\n');
        content.push_str(pasted);
    }
    Ok(content.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, bytes: &[u8]) -> Upload {
        Upload {
            name: name.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn test_kind_from_name() {
        assert_eq!(DocumentKind::from_name("notes.PDF"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_name("essay.docx"), DocumentKind::Docx);
        assert_eq!(DocumentKind::from_name("a.txt"), DocumentKind::Text);
        assert_eq!(DocumentKind::from_name("README"), DocumentKind::Text);
        assert_eq!(DocumentKind::from_name("data.csv"), DocumentKind::Text);
    }

    #[test]
    fn test_join_skips_empty() -> Fallible<()> {
        let uploads = vec![
            upload("a.txt", b"first"),
            upload("empty.txt", b""),
            upload("b.md", b"second"),
        ];
        assert_eq!(extract_text_from_files(&uploads)?, "first\n\nsecond");
        Ok(())
    }

    #[test]
    fn test_gather() -> Fallible<()> {
        let uploads = vec![upload("a.txt", b"  from file ")];
        assert_eq!(gather_study_text(&uploads, "pasted")?, "from file \npasted");
        assert_eq!(gather_study_text(&[], "")?, "");
        assert_eq!(gather_study_text(&[], " \n ")?, "");
        Ok(())
    }

    #[test]
    fn test_corrupt_pdf_is_an_error() {
        let uploads = vec![upload("broken.pdf", b"definitely not a pdf")];
        assert!(extract_text_from_files(&uploads).is_err());
    }
}
