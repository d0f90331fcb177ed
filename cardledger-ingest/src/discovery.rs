//! Statement discovery in a folder and output file naming.

use std::fs;
use std::path::{Path, PathBuf};

use cardledger_core::{Error, Result};
use regex::Regex;

pub const DEFAULT_STATEMENT_PATTERN: &str = concat!(
    r"Apple Card Statement - ",
    r"(January|February|March|April|May|June|July|August|September|October|November|December)",
    r" 20[12]\d\.pdf"
);

pub const DEFAULT_IMPORT_SUFFIX: &str = "_ImportThis.csv";

/// File-name matcher; the pattern must match the whole name.
#[derive(Debug, Clone)]
pub struct StatementMatcher {
    re: Regex,
}

impl StatementMatcher {
    pub fn new(pattern: &str) -> Result<Self> {
        let anchored = format!("^(?:{pattern})$");
        let re = Regex::new(&anchored).map_err(|e| Error::pattern(pattern, e))?;
        Ok(Self { re })
    }

    pub fn is_match(&self, file_name: &str) -> bool {
        self.re.is_match(file_name)
    }
}

/// Matching documents directly inside `dir`, sorted by file name.
pub fn discover_statements(dir: &Path, matcher: &StatementMatcher) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if matcher.is_match(name) && entry.path().is_file() {
            found.push(entry.path());
        } else {
            log::trace!("skipping {name}");
        }
    }
    found.sort();
    Ok(found)
}

/// `<dir>/<stem><suffix>`, where dir is `out_dir` or the document's folder.
pub fn import_path_for(document: &Path, suffix: &str, out_dir: Option<&Path>) -> PathBuf {
    let stem = document
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = format!("{stem}{suffix}");
    match out_dir.or_else(|| document.parent()) {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> StatementMatcher {
        StatementMatcher::new(DEFAULT_STATEMENT_PATTERN).unwrap()
    }

    #[test]
    fn test_default_pattern() {
        let m = matcher();
        assert!(m.is_match("Apple Card Statement - January 2023.pdf"));
        assert!(m.is_match("Apple Card Statement - December 2019.pdf"));
        assert!(!m.is_match("Apple Card Statement - Jan 2023.pdf"));
        assert!(!m.is_match("Apple Card Statement - January 2031.pdf"));
        assert!(!m.is_match("Apple Card Statement - January 2023.pdf.bak"));
        assert!(!m.is_match("Apple Card Statement - January 2023_ImportThis.csv"));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            StatementMatcher::new("Statement (").unwrap_err(),
            Error::Pattern { .. }
        ));
    }

    #[test]
    fn test_discover_statements_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "Apple Card Statement - March 2023.pdf",
            "Apple Card Statement - February 2023.pdf",
            "notes.txt",
            "Apple Card Statement - February 2023_ImportThis.csv",
        ] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("Apple Card Statement - May 2023.pdf")).unwrap();

        let found = discover_statements(dir.path(), &matcher()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "Apple Card Statement - February 2023.pdf",
                "Apple Card Statement - March 2023.pdf",
            ]
        );
    }

    #[test]
    fn test_discover_missing_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_statements(&dir.path().join("gone"), &matcher()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_import_path_for() {
        let doc = Path::new("/tmp/stmts/Apple Card Statement - January 2023.pdf");
        assert_eq!(
            import_path_for(doc, DEFAULT_IMPORT_SUFFIX, None),
            PathBuf::from("/tmp/stmts/Apple Card Statement - January 2023_ImportThis.csv")
        );
        assert_eq!(
            import_path_for(doc, ".csv", Some(Path::new("/out"))),
            PathBuf::from("/out/Apple Card Statement - January 2023.csv")
        );
    }
}
