//! PDF text extraction
//!
//! Extracts per-page text from PDF documents using lopdf.

use super::text::normalize_text;
use super::ExtractionError;
use crate::types::PageText;
use lopdf::Document;
use tracing::{debug, warn};

/// PDF content extractor
pub struct PdfExtractor;

impl PdfExtractor {
    /// Extract normalized text for every non-empty page.
    ///
    /// Pages keep their original 1-indexed page number, so dropping an
    /// empty page leaves a gap in the sequence. Encrypted documents are
    /// opened with the empty user password.
    pub fn extract(bytes: &[u8]) -> Result<Vec<PageText>, ExtractionError> {
        let mut document =
            Document::load_mem(bytes).map_err(|e| ExtractionError::Load(e.to_string()))?;

        if document.is_encrypted() {
            document.decrypt("").map_err(|e| {
                debug!("Empty password did not decrypt the document: {}", e);
                ExtractionError::Encrypted
            })?;
        }

        let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        if page_numbers.is_empty() {
            return Err(ExtractionError::NoPages);
        }

        let mut pages = Vec::with_capacity(page_numbers.len());
        for page_number in page_numbers {
            let raw = match document.extract_text(&[page_number]) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("Failed to extract text from page {}: {}", page_number, e);
                    continue;
                }
            };

            let text = normalize_text(&raw);
            if text.is_empty() {
                debug!("Skipping empty page {}", page_number);
                continue;
            }

            pages.push(PageText::new(text, page_number));
        }

        debug!(
            "Extracted {} non-empty pages from {} byte PDF",
            pages.len(),
            bytes.len()
        );

        Ok(pages)
    }
}

#[cfg(test)]
pub(crate) mod fixture {
    //! In-memory PDF builder for tests

    use lopdf::content::{Content, Operation};
    use lopdf::encryption::{decrypt_object, get_encryption_key};
    use lopdf::{dictionary, Document, Object, Stream, StringFormat};

    const PASSWORD_PADDING: [u8; 32] = [
        0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01,
        0x08, 0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53,
        0x69, 0x7A,
    ];

    /// Build a PDF with one page per entry; `None` produces a page without text
    pub fn build_pdf(pages: &[Option<&str>]) -> Vec<u8> {
        save(build_document(pages))
    }

    /// Build a single-page PDF encrypted with RC4 (V1, R2, 40-bit key)
    pub fn build_encrypted_pdf(text: &str, user_password: &str) -> Vec<u8> {
        let mut doc = build_document(&[Some(text)]);
        let file_id = Object::String(b"pdfchunk-test-id".to_vec(), StringFormat::Hexadecimal);
        doc.trailer.set("ID", vec![file_id.clone(), file_id]);

        let encrypt_id = doc.add_object(dictionary! {
            "Filter" => "Standard",
            "V" => 1,
            "R" => 2,
            "Length" => 40,
            "O" => Object::String(vec![0x5A; 32], StringFormat::Hexadecimal),
            "P" => -4,
        });
        doc.trailer.set("Encrypt", encrypt_id);

        let key = get_encryption_key(&doc, user_password, false).expect("derive key");
        let check = rc4(&key, &PASSWORD_PADDING);
        doc.get_object_mut(encrypt_id)
            .and_then(Object::as_dict_mut)
            .expect("encrypt dictionary")
            .set("U", Object::String(check, StringFormat::Hexadecimal));

        // RC4 is symmetric, so the per-object decryption routine also encrypts
        for (&id, object) in doc.objects.iter_mut() {
            if id == encrypt_id {
                continue;
            }
            let Ok(encrypted) = decrypt_object(&key, id, &*object) else {
                continue;
            };
            match object {
                Object::Stream(stream) => stream.set_content(encrypted),
                Object::String(content, _) => *content = encrypted,
                _ => {}
            }
        }

        save(doc)
    }

    fn rc4(key: &[u8], data: &[u8]) -> Vec<u8> {
        let mut state: Vec<u8> = (0..=255).collect();
        let mut j = 0u8;
        for i in 0..256 {
            j = j.wrapping_add(state[i]).wrapping_add(key[i % key.len()]);
            state.swap(i, j as usize);
        }

        let (mut i, mut j) = (0u8, 0u8);
        data.iter()
            .map(|byte| {
                i = i.wrapping_add(1);
                j = j.wrapping_add(state[i as usize]);
                state.swap(i as usize, j as usize);
                let k = state[i as usize].wrapping_add(state[j as usize]);
                byte ^ state[k as usize]
            })
            .collect()
    }

    fn save(mut doc: Document) -> Vec<u8> {
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("serialize test PDF");
        bytes
    }

    fn build_document(pages: &[Option<&str>]) -> Document {
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

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for page in pages {
            let mut operations = Vec::new();
            if let Some(text) = page {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
                operations.push(Operation::new("Td", vec![72.into(), 720.into()]));
                operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
                operations.push(Operation::new("ET", vec![]));
            }
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("encode page content"),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
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
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }
}
