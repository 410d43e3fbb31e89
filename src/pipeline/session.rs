//! Per-file state carried between pipeline steps.

use std::path::{Path, PathBuf};

use movietag_parser::MovieInfo;

use crate::metadata::SearchResult;

/// Everything known about the file being identified.
///
/// Created by [`Pipeline::open`](super::Pipeline::open) and owned by the
/// caller. Each step reads and updates it; a new search drops the previous
/// selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    file: PathBuf,
    info: MovieInfo,
    candidates: Vec<SearchResult>,
    selected: Option<usize>,
}

impl Session {
    pub(crate) fn new(file: PathBuf, info: MovieInfo) -> Self {
        Self {
            file,
            info,
            candidates: Vec::new(),
            selected: None,
        }
    }

    /// The file, renamed after a successful
    /// [`process`](super::Pipeline::process).
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Title and year parsed from the file name.
    pub fn info(&self) -> &MovieInfo {
        &self.info
    }

    /// Candidates from the latest search.
    pub fn candidates(&self) -> &[SearchResult] {
        &self.candidates
    }

    /// The selected candidate, if any.
    pub fn selected(&self) -> Option<&SearchResult> {
        self.selected.and_then(|i| self.candidates.get(i))
    }

    pub(crate) fn set_candidates(&mut self, candidates: Vec<SearchResult>) {
        self.candidates = candidates;
        self.selected = None;
    }

    pub(crate) fn set_selected(&mut self, index: usize) {
        self.selected = Some(index);
    }

    pub(crate) fn set_file(&mut self, file: PathBuf) {
        self.file = file;
    }
}
