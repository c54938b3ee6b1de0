use crate::core::{
    SourceKind,
    SymbolCandidate,
};

#[derive(Debug, Clone)]
pub struct SourceBucket {
    pub source: SourceKind,
    pub candidates: Vec<SymbolCandidate>,
    pub pending: bool,
    pub error: Option<String>,
}

impl SourceBucket {
    fn new(source: SourceKind) -> Self {
        Self { source, candidates: Vec::new(), pending: false, error: None }
    }
}

/// Search results of the current generation, grouped by source in display
/// order, plus the selection cursor.
///
/// The selection is held as `(source, position)` so remote results landing
/// in an earlier bucket never shift which candidate is selected.
#[derive(Debug, Default)]
pub struct ResultBoard {
    generation: u64,
    query: String,
    buckets: Vec<SourceBucket>,
    selected: Option<(SourceKind, usize)>,
}

impl ResultBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every result and starts accepting only `generation`.
    pub fn begin(&mut self, generation: u64, query: impl Into<String>) {
        self.generation = generation;
        self.query = query.into();
        self.buckets.clear();
        self.selected = None;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    fn bucket_mut(&mut self, source: SourceKind) -> &mut SourceBucket {
        let pos = match self.buckets.iter().position(|b| b.source == source) {
            Some(pos) => pos,
            None => {
                let pos = self
                    .buckets
                    .iter()
                    .position(|b| b.source.display_rank() > source.display_rank())
                    .unwrap_or(self.buckets.len());
                self.buckets.insert(pos, SourceBucket::new(source));
                pos
            }
        };
        &mut self.buckets[pos]
    }

    /// Local results arrive all at once; a source with no hits gets no
    /// header.
    pub fn add_local(&mut self, source: SourceKind, candidates: Vec<SymbolCandidate>) {
        if candidates.is_empty() {
            return;
        }
        self.bucket_mut(source).candidates.extend(candidates);
        self.ensure_selection();
    }

    pub fn mark_pending(&mut self, source: SourceKind) {
        let bucket = self.bucket_mut(source);
        bucket.pending = true;
        bucket.error = None;
    }

    pub fn is_requested(&self, source: SourceKind) -> bool {
        self.buckets.iter().any(|b| b.source == source)
    }

    pub fn is_pending(&self) -> bool {
        self.buckets.iter().any(|b| b.pending)
    }

    /// Returns false when the candidate belongs to an older search.
    pub fn push_remote(&mut self, generation: u64, candidate: SymbolCandidate) -> bool {
        if generation != self.generation {
            return false;
        }
        self.bucket_mut(candidate.source).candidates.push(candidate);
        self.ensure_selection();
        true
    }

    pub fn finish(&mut self, generation: u64, source: SourceKind, error: Option<String>) -> bool {
        if generation != self.generation {
            return false;
        }
        let bucket = self.bucket_mut(source);
        bucket.pending = false;
        bucket.error = error;
        true
    }

    /// Records a failure for a source that was never dispatched.
    pub fn fail(&mut self, source: SourceKind, error: impl Into<String>) {
        let bucket = self.bucket_mut(source);
        bucket.pending = false;
        bucket.error = Some(error.into());
    }

    pub fn buckets(&self) -> &[SourceBucket] {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(|b| b.candidates.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn locate(&self, index: usize) -> Option<(SourceKind, usize)> {
        let mut remaining = index;
        for bucket in &self.buckets {
            if remaining < bucket.candidates.len() {
                return Some((bucket.source, remaining));
            }
            remaining -= bucket.candidates.len();
        }
        None
    }

    fn flat_index(&self, source: SourceKind, position: usize) -> Option<usize> {
        let mut offset = 0;
        for bucket in &self.buckets {
            if bucket.source == source {
                return (position < bucket.candidates.len()).then_some(offset + position);
            }
            offset += bucket.candidates.len();
        }
        None
    }

    /// Candidate at `index` in display order.
    pub fn candidate(&self, index: usize) -> Option<&SymbolCandidate> {
        let (source, position) = self.locate(index)?;
        self.buckets.iter().find(|b| b.source == source)?.candidates.get(position)
    }

    pub fn selected_index(&self) -> Option<usize> {
        let (source, position) = self.selected?;
        self.flat_index(source, position)
    }

    pub fn selected(&self) -> Option<&SymbolCandidate> {
        self.candidate(self.selected_index()?)
    }

    pub fn select(&mut self, index: usize) -> bool {
        match self.locate(index) {
            Some(location) => {
                self.selected = Some(location);
                true
            }
            None => false,
        }
    }

    fn ensure_selection(&mut self) {
        if self.selected.is_none() && !self.is_empty() {
            self.selected = self.locate(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn local(name: &str, source: SourceKind) -> SymbolCandidate {
        SymbolCandidate::local(name, source, PathBuf::from(format!("{name}.png")))
    }

    fn remote(name: &str, source: SourceKind) -> SymbolCandidate {
        SymbolCandidate::remote(name, source, format!("https://example.org/{name}"))
    }

    #[test]
    fn buckets_follow_display_order() {
        let mut board = ResultBoard::new();
        board.begin(1, "apple");
        board.mark_pending(SourceKind::Arasaac);
        board.add_local(SourceKind::OpenMoji, vec![local("o1", SourceKind::OpenMoji)]);
        board.add_local(SourceKind::Mulberry, vec![local("m1", SourceKind::Mulberry)]);

        let order: Vec<SourceKind> = board.buckets().iter().map(|b| b.source).collect();
        assert_eq!(order, vec![SourceKind::Mulberry, SourceKind::OpenMoji, SourceKind::Arasaac]);
        assert!(board.is_pending());
        assert_eq!(board.candidate(0).unwrap().name, "m1");
    }

    #[test]
    fn empty_local_results_get_no_header() {
        let mut board = ResultBoard::new();
        board.begin(1, "zzz");
        board.add_local(SourceKind::Mulberry, Vec::new());
        assert!(!board.is_requested(SourceKind::Mulberry));
        assert!(board.selected().is_none());
    }

    #[test]
    fn stale_generations_are_discarded() {
        let mut board = ResultBoard::new();
        board.begin(1, "apple");
        board.mark_pending(SourceKind::Arasaac);
        board.begin(2, "pear");
        board.mark_pending(SourceKind::Arasaac);

        assert!(!board.push_remote(1, remote("old", SourceKind::Arasaac)));
        assert!(!board.finish(1, SourceKind::Arasaac, None));
        assert!(board.is_pending());
        assert!(board.is_empty());

        assert!(board.push_remote(2, remote("new", SourceKind::Arasaac)));
        assert!(board.finish(2, SourceKind::Arasaac, None));
        assert!(!board.is_pending());
        assert_eq!(board.selected().unwrap().name, "new");
    }

    #[test]
    fn selection_survives_results_arriving_earlier_in_order() {
        let mut board = ResultBoard::new();
        board.begin(3, "apple");
        board.push_remote(3, remote("f1", SourceKind::Flaticon));
        board.push_remote(3, remote("f2", SourceKind::Flaticon));
        assert!(board.select(1));
        assert_eq!(board.selected().unwrap().name, "f2");

        board.push_remote(3, remote("a1", SourceKind::Arasaac));
        assert_eq!(board.selected_index(), Some(2));
        assert_eq!(board.selected().unwrap().name, "f2");
        assert_eq!(board.candidate(0).unwrap().name, "a1");
    }

    #[test]
    fn selection_stays_within_bounds() {
        let mut board = ResultBoard::new();
        board.begin(1, "apple");
        board.add_local(
            SourceKind::Mulberry,
            vec![local("m1", SourceKind::Mulberry), local("m2", SourceKind::Mulberry)],
        );
        assert_eq!(board.selected_index(), Some(0));
        assert!(board.select(1));
        assert!(!board.select(2));
        assert_eq!(board.selected_index(), Some(1));
        assert_eq!(board.selected().unwrap().name, "m2");
    }

    #[test]
    fn failed_source_keeps_header_with_error() {
        let mut board = ResultBoard::new();
        board.begin(1, "apple");
        board.fail(SourceKind::Flaticon, "API key not set");
        assert!(board.is_requested(SourceKind::Flaticon));
        assert_eq!(board.buckets()[0].error.as_deref(), Some("API key not set"));
        assert!(!board.is_pending());
    }
}
