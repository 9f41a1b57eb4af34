//! JSON document arguments: given inline or as `@path`.

use std::path::Path;

use anyhow::{Context, Result};
use provisioning::ProjectData;

/// Parses `raw` as a project document, reading it from a file when it
/// starts with `@`.
pub fn project_document(raw: &str) -> Result<ProjectData> {
    let (source, text) = match raw.strip_prefix('@') {
        Some(path) => (
            path.to_string(),
            std::fs::read_to_string(Path::new(path))
                .with_context(|| format!("reading project data from {path}"))?,
        ),
        None => ("argument".to_string(), raw.to_string()),
    };
    ProjectData::from_document(&text).with_context(|| format!("project data in {source} is not valid JSON"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn inline_documents_are_parsed() {
        let data = project_document(r#"{"notes":["C"]}"#).unwrap();
        assert_eq!(data.to_document(), r#"{"notes":["C"]}"#);
    }

    #[test]
    fn at_prefix_reads_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"tempo": 90}}"#).unwrap();

        let data = project_document(&format!("@{}", file.path().display())).unwrap();

        assert_eq!(data.as_value()["tempo"], 90);
    }

    #[test]
    fn invalid_json_names_its_source() {
        let err = project_document("{not json").unwrap_err();
        assert!(err.to_string().contains("argument"));
        assert!(project_document("@/definitely/missing.json").is_err());
    }
}
