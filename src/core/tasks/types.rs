use crate::{
    core::{
        SourceKind,
        SymbolCandidate,
    },
    sources::LocalLibraries,
};

#[derive(Debug, Clone)]
pub enum TaskResult {
    LibrariesLoaded(Result<LocalLibraries, String>),

    /// One remote candidate whose image finished downloading.
    Symbol { generation: u64, candidate: SymbolCandidate },
    SourceFinished { generation: u64, source: SourceKind, error: Option<String> },
}

impl TaskResult {
    pub fn task_type(&self) -> &'static str {
        match self {
            TaskResult::LibrariesLoaded(_) => "libraries_loaded",
            TaskResult::Symbol { .. } => "symbol",
            TaskResult::SourceFinished { .. } => "source_finished",
        }
    }
}
