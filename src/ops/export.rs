use std::fs;
use std::path::{Path, PathBuf};

use crate::model::outline::Collection;
use crate::ops::token::is_valid_id;

/// Marker in the header template replaced by the generated body
pub const CONTENT_MARKER: &str = "%%CONTENT%%";

/// Error type for export operations
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("outline is empty, nothing to export")]
    EmptyOutline,
    #[error("header template not found: {0}")]
    HeaderNotFound(PathBuf),
    #[error("header template has no %%CONTENT%% marker: {0}")]
    MissingMarker(PathBuf),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Render the outline body: `\section`, `\subsection`, then each unit's
/// `.tex` contents (or a `% MISSING` comment line). Unit IDs that are not
/// plain file stems are never read.
pub fn render_body(collection: &Collection, units_dir: &Path) -> String {
    let mut lines: Vec<String> = Vec::new();
    for section in &collection.sections {
        lines.push(format!("\\section{{{}}}", section.name));
        lines.push(String::new());
        for sub in &section.subsections {
            lines.push(format!("\\subsection{{{}}}", sub.name));
            lines.push(String::new());
            for uid in &sub.unit_ids {
                let content = is_valid_id(uid)
                    .then(|| fs::read_to_string(units_dir.join(format!("{}.tex", uid))).ok())
                    .flatten();
                match content {
                    Some(content) => lines.push(content.trim().to_string()),
                    None => {
                        tracing::debug!(unit = %uid, "unit file not exported");
                        lines.push(format!("% MISSING: {}.tex", uid));
                    }
                }
                lines.push(String::new());
            }
        }
    }
    lines.join("\n").trim().to_string()
}

/// Render the full document, splicing the body into the header if given.
pub fn render_document(
    collection: &Collection,
    units_dir: &Path,
    header: Option<&Path>,
) -> Result<String, ExportError> {
    if collection.sections.is_empty() {
        return Err(ExportError::EmptyOutline);
    }
    let body = render_body(collection, units_dir);
    let Some(header_path) = header else {
        return Ok(format!("{}\n", body));
    };
    let template = fs::read_to_string(header_path)
        .map_err(|_| ExportError::HeaderNotFound(header_path.to_path_buf()))?;
    if !template.contains(CONTENT_MARKER) {
        return Err(ExportError::MissingMarker(header_path.to_path_buf()));
    }
    Ok(template.replace(CONTENT_MARKER, &body))
}

/// First free `<project>_vN.tex` in `output_dir`, starting at 1.
pub fn next_export_path(output_dir: &Path, project: &str) -> PathBuf {
    let mut version = 1;
    loop {
        let candidate = output_dir.join(format!("{}_v{}.tex", project, version));
        if !candidate.exists() {
            return candidate;
        }
        version += 1;
    }
}

/// Render and write the document. Returns the written path.
pub fn export_document(
    collection: &Collection,
    units_dir: &Path,
    header: Option<&Path>,
    output: &Path,
) -> Result<PathBuf, ExportError> {
    let document = render_document(collection, units_dir, header)?;
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    crate::io::atomic::atomic_write(output, document.as_bytes())?;
    tracing::info!(path = %output.display(), "export written");
    Ok(output.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::outline::{Section, Subsection};
    use insta::assert_snapshot;
    use tempfile::TempDir;

    fn sample() -> Collection {
        let mut sub = Subsection::new("sub-001", "Definitions");
        sub.unit_ids = vec!["DEF-1".into(), "DEF-2".into()];
        let mut sec = Section::new("sec-001", "Foundations");
        sec.subsections = vec![sub];
        Collection::new(vec![sec])
    }

    #[test]
    fn test_render_body_with_missing_unit() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("DEF-1.tex"), "\n\\begin{definition}A\\end{definition}\n\n").unwrap();
        let body = render_body(&sample(), tmp.path());
        assert_snapshot!(body, @r"
        \section{Foundations}

        \subsection{Definitions}

        \begin{definition}A\end{definition}

        % MISSING: DEF-2.tex
        ");
    }

    #[test]
    fn test_unit_ids_never_read_outside_units_dir() {
        let tmp = TempDir::new().unwrap();
        let units_dir = tmp.path().join("units");
        fs::create_dir(&units_dir).unwrap();
        fs::write(tmp.path().join("secret.tex"), "private notes").unwrap();

        let mut c = sample();
        c.sections[0].subsections[0].unit_ids = vec!["../secret".into()];
        let body = render_body(&c, &units_dir);
        assert!(!body.contains("private notes"));
        assert!(body.ends_with("% MISSING: ../secret.tex"));
    }

    #[test]
    fn test_render_document_with_header() {
        let tmp = TempDir::new().unwrap();
        let header = tmp.path().join("header.tex");
        fs::write(&header, "\\begin{document}\n%%CONTENT%%\n\\end{document}\n").unwrap();
        let doc = render_document(&sample(), tmp.path(), Some(header.as_path())).unwrap();
        assert!(doc.starts_with("\\begin{document}\n\\section{Foundations}"));
        assert!(doc.ends_with("% MISSING: DEF-2.tex\n\\end{document}\n"));
    }

    #[test]
    fn test_header_without_marker() {
        let tmp = TempDir::new().unwrap();
        let header = tmp.path().join("header.tex");
        fs::write(&header, "\\begin{document}\n").unwrap();
        assert!(matches!(
            render_document(&sample(), tmp.path(), Some(header.as_path())),
            Err(ExportError::MissingMarker(_))
        ));
        assert!(matches!(
            render_document(&sample(), tmp.path(), Some(tmp.path().join("none.tex").as_path())),
            Err(ExportError::HeaderNotFound(_))
        ));
    }

    #[test]
    fn test_empty_outline_is_rejected() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            render_document(&Collection::default(), tmp.path(), None),
            Err(ExportError::EmptyOutline)
        ));
    }

    #[test]
    fn test_versioned_output_paths() {
        let tmp = TempDir::new().unwrap();
        let first = next_export_path(tmp.path(), "eft");
        assert_eq!(first, tmp.path().join("eft_v1.tex"));

        let written = export_document(&sample(), tmp.path(), None, &first).unwrap();
        assert!(written.exists());
        assert_eq!(next_export_path(tmp.path(), "eft"), tmp.path().join("eft_v2.tex"));
    }
}
