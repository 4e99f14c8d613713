//! Word template renderer.
//!
//! Loads the enriched CV, builds and normalizes the placeholder mapping and
//! substitutes every `{Placeholder}` token in the template's
//! `word/document.xml`. All other archive entries are copied unchanged.
//! Placeholders must sit inside a single text run in the template.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use quick_xml::escape::escape;
use regex::{Captures, Regex};
use serde_json::Value;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::Renderer;
use crate::formatting::normalizer::normalize_placeholders;
use crate::formatting::placeholders::extract_placeholders;
use crate::formatting::PlaceholderMap;
use crate::pipeline::naming::{base_from_artifact, processed_file_name};

const DOCUMENT_XML: &str = "word/document.xml";
const LINE_BREAK: &str = r#"</w:t><w:br/><w:t xml:space="preserve">"#;

static RE_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[A-Za-z]+\}").unwrap());

#[derive(Debug, Clone)]
pub struct DocxRenderer {
    template: PathBuf,
    output_dir: PathBuf,
}

impl DocxRenderer {
    pub fn new(template: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl Renderer for DocxRenderer {
    async fn render(&self, enriched_json_path: &Path) -> Result<Option<PathBuf>> {
        let raw = tokio::fs::read_to_string(enriched_json_path)
            .await
            .with_context(|| format!("reading {}", enriched_json_path.display()))?;
        let doc: Value = serde_json::from_str(&raw)?;

        let mapping = normalize_placeholders(extract_placeholders(&doc));
        debug!("Placeholder mapping: {:?}", mapping);

        let file_name = enriched_json_path
            .file_name()
            .and_then(|n| n.to_str())
            .context("enriched JSON path has no file name")?;
        let out = self
            .output_dir
            .join(processed_file_name(&base_from_artifact(file_name)));

        let template = self.template.clone();
        let target = out.clone();
        tokio::task::spawn_blocking(move || fill_template(&template, &target, &mapping))
            .await
            .context("render task panicked")??;

        info!("Rendered CV document {}", out.display());
        Ok(Some(out))
    }
}

fn fill_template(template: &Path, out: &Path, mapping: &PlaceholderMap) -> Result<()> {
    let source = File::open(template)
        .with_context(|| format!("opening template {}", template.display()))?;
    let mut archive = ZipArchive::new(source).context("template is not a valid .docx")?;
    let mut writer = ZipWriter::new(
        File::create(out).with_context(|| format!("creating {}", out.display()))?,
    );

    for i in 0..archive.len() {
        let name = archive.by_index_raw(i)?.name().to_string();
        if name == DOCUMENT_XML {
            let mut xml = String::new();
            archive.by_index(i)?.read_to_string(&mut xml)?;
            writer.start_file(
                name.as_str(),
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
            )?;
            writer.write_all(substitute(&xml, mapping).as_bytes())?;
        } else {
            writer.raw_copy_file(archive.by_index_raw(i)?)?;
        }
    }

    writer.finish()?;
    Ok(())
}

/// Replaces each placeholder with its XML-escaped value in a single pass
/// over the template, so values are never rescanned; `\n` becomes a Word
/// line break. Unknown placeholders are left as they are.
fn substitute(xml: &str, mapping: &PlaceholderMap) -> String {
    RE_PLACEHOLDER
        .replace_all(xml, |caps: &Captures| match mapping.get(&caps[0]) {
            Some(value) => value
                .split('\n')
                .map(|line| escape(line).into_owned())
                .collect::<Vec<_>>()
                .join(LINE_BREAK),
            None => caps[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_template(path: &Path) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        zip.start_file("[Content_Types].xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"<Types/>").unwrap();
        zip.start_file(DOCUMENT_XML, SimpleFileOptions::default())
            .unwrap();
        zip.write_all(
            br#"<w:document><w:body><w:p><w:r><w:t>{FullName}</w:t></w:r></w:p><w:p><w:r><w:t xml:space="preserve">{NZEmployers}</w:t></w:r></w:p><w:p><w:r><w:t>{Blurb}</w:t></w:r></w:p></w:body></w:document>"#,
        )
        .unwrap();
        zip.finish().unwrap();
    }

    fn read_entry(path: &Path, name: &str) -> String {
        let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut out = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn test_substituted_values_are_not_rescanned() {
        let mut mapping = PlaceholderMap::new();
        mapping.insert("{Blurb}".into(), "Skilled in {Position} templating".into());
        mapping.insert("{Position}".into(), "Engineer".into());

        let out = substitute("<w:t>{Blurb}</w:t><w:t>{Position}</w:t><w:t>{Other}</w:t>", &mapping);

        assert_eq!(
            out,
            "<w:t>Skilled in {Position} templating</w:t><w:t>Engineer</w:t><w:t>{Other}</w:t>"
        );
    }

    #[test]
    fn test_substitute_escapes_and_breaks_lines() {
        let mapping: PlaceholderMap = [
            ("{NZEmployers}".to_string(), "• A & B\n• C".to_string()),
            ("{Unused}".to_string(), "x".to_string()),
        ]
        .into_iter()
        .collect();
        let out = substitute("<w:t>{NZEmployers}</w:t>", &mapping);
        assert_eq!(
            out,
            r#"<w:t>• A &amp; B</w:t><w:br/><w:t xml:space="preserve">• C</w:t>"#
        );
    }

    #[tokio::test]
    async fn test_render_fills_template_with_normalized_values() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.docx");
        write_template(&template);

        let enriched = dir.path().join("resume_enriched.json");
        std::fs::write(
            &enriched,
            serde_json::to_vec(&json!({
                "name": "JANE DOE",
                "blurb": "Builds <reliable> systems.",
                "experience": [
                    {"company": "xero", "title": "dev", "location_category": "NZ"},
                    {"company": "XERO", "title": "lead", "location_category": "NZ"}
                ]
            }))
            .unwrap(),
        )
        .unwrap();

        let renderer = DocxRenderer::new(&template, dir.path());
        let out = renderer.render(&enriched).await.unwrap().unwrap();
        assert_eq!(out, dir.path().join("resume_processed.docx"));

        let xml = read_entry(&out, DOCUMENT_XML);
        assert!(xml.contains("<w:t>Jane Doe</w:t>"));
        assert!(xml.contains("• Xero</w:t>"));
        assert!(!xml.contains("XERO"));
        assert!(xml.contains("Builds &lt;reliable&gt; systems."));
        assert_eq!(read_entry(&out, "[Content_Types].xml"), "<Types/>");
    }

    #[tokio::test]
    async fn test_missing_template_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let enriched = dir.path().join("cv_enriched.json");
        std::fs::write(&enriched, b"{}").unwrap();

        let renderer = DocxRenderer::new(dir.path().join("missing.docx"), dir.path());
        assert!(renderer.render(&enriched).await.is_err());
    }
}
