//! Selection set and BibTeX export of selected papers.

use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;

use crate::Paper;

/// Default export file name.
pub const DEFAULT_EXPORT_FILE: &str = "papers.bib";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("no papers selected for export")]
    EmptySelection,
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Ids of checked papers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: HashSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one id. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    pub fn insert(&mut self, id: &str) {
        self.ids.insert(id.to_string());
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }
}

/// Citation key for an id: every character outside `[A-Za-z0-9_-]` becomes `_`.
pub fn cite_key(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// One `@article` entry, followed by a blank line. Field values are inserted verbatim.
pub fn entry(paper: &Paper) -> String {
    let mut out = format!(
        "@article{{{key},\n  title={{{title}}},\n  author={{{authors}}},\n  year={{{year}}},\n  journal={{arXiv preprint arXiv:{id}}}",
        key = cite_key(&paper.id),
        title = paper.title,
        authors = paper.authors,
        year = paper.year(),
        id = paper.id,
    );
    if let Some(venue) = paper.venue() {
        out.push_str(&format!(",\n  note={{{venue}}}"));
    }
    out.push_str("\n}\n\n");
    out
}

/// Render every selected paper of `catalog`, in catalog order.
///
/// Fails with [`ExportError::EmptySelection`] when nothing is selected or
/// none of the selected ids is in the catalog.
pub fn export_bibtex<'a, I>(catalog: I, selection: &Selection) -> Result<String, ExportError>
where
    I: IntoIterator<Item = &'a Paper>,
{
    if selection.is_empty() {
        return Err(ExportError::EmptySelection);
    }
    let mut out = String::new();
    let mut count = 0usize;
    for paper in catalog.into_iter().filter(|p| selection.contains(&p.id)) {
        out.push_str(&entry(paper));
        count += 1;
    }
    if count == 0 {
        return Err(ExportError::EmptySelection);
    }
    tracing::info!(papers = count, "exported BibTeX");
    Ok(out)
}

/// Write exported BibTeX to `path`.
pub fn write_bibtex(path: &Path, content: &str) -> Result<(), ExportError> {
    std::fs::write(path, content).map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(id: &str, conference: Option<&str>) -> Paper {
        Paper {
            id: id.into(),
            title: "Deep Code Search".into(),
            authors: "Ada Lovelace, Alan Turing".into(),
            published: "2024-03-15".into(),
            conference: conference.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn cite_key_replaces_punctuation() {
        assert_eq!(cite_key("2401.01234"), "2401_01234");
        assert_eq!(cite_key("cs/0101001v2"), "cs_0101001v2");
        assert_eq!(cite_key("a-b_c"), "a-b_c");
    }

    #[test]
    fn entry_without_venue() {
        let e = entry(&paper("2403.00001", None));
        assert_eq!(
            e,
            "@article{2403_00001,\n  title={Deep Code Search},\n  author={Ada Lovelace, Alan Turing},\n  year={2024},\n  journal={arXiv preprint arXiv:2403.00001}\n}\n\n"
        );
    }

    #[test]
    fn entry_with_venue_has_note() {
        let e = entry(&paper("2403.00001", Some("ICSE 2025")));
        assert!(e.contains("journal={arXiv preprint arXiv:2403.00001},\n  note={ICSE 2025}\n}"));
    }

    #[test]
    fn empty_selection_is_an_error() {
        let papers = [paper("1", None)];
        assert!(matches!(
            export_bibtex(&papers, &Selection::new()),
            Err(ExportError::EmptySelection)
        ));
        let unknown: Selection = ["nope"].into_iter().collect();
        assert!(matches!(
            export_bibtex(&papers, &unknown),
            Err(ExportError::EmptySelection)
        ));
    }

    #[test]
    fn export_follows_catalog_order() {
        let papers = [paper("3", None), paper("1", None), paper("2", None)];
        let sel: Selection = ["2", "3"].into_iter().collect();
        let out = export_bibtex(&papers, &sel).unwrap();
        let three = out.find("@article{3,").unwrap();
        let two = out.find("@article{2,").unwrap();
        assert!(three < two);
        assert!(!out.contains("@article{1,"));
    }

    #[test]
    fn selection_toggle() {
        let mut sel = Selection::new();
        assert!(sel.toggle("a"));
        assert!(sel.contains("a"));
        assert!(!sel.toggle("a"));
        assert!(sel.is_empty());
    }

    #[test]
    fn exported_text_parses_as_bibtex() {
        let papers = [paper("2403.00001", Some("NeurIPS 2024")), paper("2403.00002", None)];
        let sel: Selection = ["2403.00001", "2403.00002"].into_iter().collect();
        let out = export_bibtex(&papers, &sel).unwrap();
        let bib = biblatex::Bibliography::parse(&out).unwrap();
        assert_eq!(bib.len(), 2);
        assert!(bib.get("2403_00001").is_some());
    }
}
