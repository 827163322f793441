use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use lopdf::Document;

use crate::error::BotError;

/// Text pulled out of a résumé PDF.
#[derive(Debug)]
pub struct Extraction {
    pub text: String,
    /// The source document had more than one page. Only page one was read.
    pub multi_page: bool,
}

/// Seam between the command handlers and the PDF machinery, so handlers can
/// be exercised against canned text in tests.
pub trait ExtractText: Send + Sync {
    fn extract_first_page(&self, path: &Path) -> Result<Extraction, BotError>;
}

/// Production extractor backed by lopdf (page accounting) and pdf-extract
/// (layout-preserving text output).
pub struct PdfExtractor;

impl ExtractText for PdfExtractor {
    fn extract_first_page(&self, path: &Path) -> Result<Extraction, BotError> {
        info!("🏭 Extracting text from {}", path.display());

        let mut doc = Document::load(path).map_err(|e| BotError::Extract(e.to_string()))?;
        let page_count = doc.get_pages().len() as u32;
        let multi_page = page_count > 1;

        let text = if multi_page {
            warn!(
                "⚠️ {} has {} pages, scoring page one only",
                path.display(),
                page_count
            );
            // Prune everything past page one, then extract from the pruned
            // copy so pdf-extract never sees the later pages.
            let extra: Vec<u32> = (2..=page_count).collect();
            doc.delete_pages(&extra);
            let mut pruned = Vec::new();
            doc.save_to(&mut pruned)
                .map_err(|e| BotError::Extract(e.to_string()))?;
            pdf_extract::extract_text_from_mem(&pruned)
                .map_err(|e| BotError::Extract(e.to_string()))?
        } else {
            pdf_extract::extract_text(path).map_err(|e| BotError::Extract(e.to_string()))?
        };

        // Text sidecar mirrors the source name: files/<token>.pdf -> .txt.
        let sidecar = path.with_extension("txt");
        fs::write(&sidecar, text.as_bytes())?;
        debug!(
            "✅ Extracted {} characters, sidecar at {}",
            text.len(),
            sidecar.display()
        );

        Ok(Extraction { text, multi_page })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};
    use std::path::PathBuf;

    fn temp_pdf(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("extract_{}_{}.pdf", tag, uuid::Uuid::new_v4()))
    }

    /// Build a minimal PDF with one page per entry in `pages`, each carrying
    /// a single line of text.
    fn write_fixture_pdf(path: &Path, pages: &[&str]) {
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
        for line in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
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
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn single_page_extracts_without_warning() {
        let path = temp_pdf("single");
        write_fixture_pdf(&path, &["FIRSTPAGE"]);

        let extraction = PdfExtractor.extract_first_page(&path).unwrap();
        assert!(!extraction.multi_page);
        assert!(extraction.text.contains("FIRSTPAGE"));
    }

    #[test]
    fn multi_page_flags_warning_and_reads_page_one_only() {
        let path = temp_pdf("multi");
        write_fixture_pdf(&path, &["FIRSTPAGE", "SECONDPAGE"]);

        let extraction = PdfExtractor.extract_first_page(&path).unwrap();
        assert!(extraction.multi_page);
        assert!(extraction.text.contains("FIRSTPAGE"));
        assert!(!extraction.text.contains("SECONDPAGE"));
    }

    #[test]
    fn sidecar_mirrors_extracted_text() {
        let path = temp_pdf("sidecar");
        write_fixture_pdf(&path, &["FIRSTPAGE"]);

        let extraction = PdfExtractor.extract_first_page(&path).unwrap();
        let sidecar = path.with_extension("txt");
        assert_eq!(fs::read_to_string(&sidecar).unwrap(), extraction.text);
    }

    #[test]
    fn unparseable_file_is_an_extract_error() {
        let path = temp_pdf("garbage");
        fs::write(&path, b"this is not a pdf at all").unwrap();

        let err = PdfExtractor.extract_first_page(&path).unwrap_err();
        assert!(matches!(err, BotError::Extract(_)));
    }
}
