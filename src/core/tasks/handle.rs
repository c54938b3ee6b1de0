use std::sync::{
    atomic::{
        AtomicU64,
        Ordering,
    },
    Arc,
};

/// Shared search counter. Each refresh advances it; background workers
/// compare their own id against it to drop superseded work.
#[derive(Debug, Clone, Default)]
pub struct SearchGeneration {
    current: Arc<AtomicU64>,
}

impl SearchGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self) -> u64 {
        self.current.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }

    pub fn is_current(&self, id: u64) -> bool {
        self.current() == id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advancing_invalidates_older_ids() {
        let generation = SearchGeneration::new();
        let first = generation.advance();
        let shared = generation.clone();
        assert!(shared.is_current(first));

        let second = generation.advance();
        assert_eq!(second, first + 1);
        assert!(!shared.is_current(first));
        assert!(shared.is_current(second));
    }
}
