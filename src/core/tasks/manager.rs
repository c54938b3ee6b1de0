use std::{
    sync::{
        mpsc,
        Arc,
    },
    thread,
    time::Duration,
};

use tokio::runtime::Runtime;
use tracing::{
    debug,
    info,
    warn,
};

use super::{
    SearchGeneration,
    TaskResult,
};
use crate::{
    core::{
        http::{
            fetch_bytes,
            http_client,
        },
        settings::SettingsData,
        PickerError,
        SymbolLocation,
    },
    sources::{
        LocalLibraries,
        RemoteSource,
    },
};

pub struct TaskManager {
    runtime: Arc<Runtime>,
    receiver: mpsc::Receiver<TaskResult>,
    sender: mpsc::Sender<TaskResult>,
    generation: SearchGeneration,
}

impl TaskManager {
    pub fn new() -> Result<Self, PickerError> {
        let runtime = Arc::new(Runtime::new()?);

        let (sender, receiver) = mpsc::channel();

        Ok(Self { runtime, receiver, sender, generation: SearchGeneration::new() })
    }

    pub fn poll_results(&mut self) -> Vec<TaskResult> {
        let mut results = Vec::new();

        while let Ok(result) = self.receiver.try_recv() {
            results.push(result);
        }

        results
    }

    pub fn generation(&self) -> &SearchGeneration {
        &self.generation
    }

    fn task_context(&self) -> (mpsc::Sender<TaskResult>, Arc<Runtime>) {
        (self.sender.clone(), self.runtime.clone())
    }

    pub fn load_libraries(&self, settings: SettingsData) {
        let (sender, _) = self.task_context();

        thread::spawn(move || {
            let result = LocalLibraries::load(&settings).map_err(|e| e.to_string());
            if let Err(e) = &result {
                warn!("Failed to load local symbol libraries: {e}");
            }
            let _ = sender.send(TaskResult::LibrariesLoaded(result));
        });
    }

    /// Queries `source` off the main thread. Each candidate is posted as soon
    /// as its image has been downloaded; the worker stops once `generation`
    /// is superseded. A `SourceFinished` result always closes the search.
    pub fn search_remote(
        &self,
        source: RemoteSource,
        query: String,
        generation: u64,
        timeout: Duration,
    ) {
        let (sender, runtime) = self.task_context();
        let tracker = self.generation.clone();

        thread::spawn(move || {
            let kind = source.kind();

            let outcome = runtime.block_on(async {
                let client = http_client(timeout)?;
                let candidates = source.search(&client, &query).await?;
                info!(source = %kind, query, candidates = candidates.len(), "remote search");

                for candidate in candidates {
                    if !tracker.is_current(generation) {
                        debug!(source = %kind, generation, "search superseded");
                        return Ok(());
                    }

                    let url = match &candidate.location {
                        SymbolLocation::Remote(url) => url.clone(),
                        SymbolLocation::Local(_) => continue,
                    };

                    match fetch_bytes(&client, &url).await {
                        Ok(bytes) => {
                            let _ = sender.send(TaskResult::Symbol {
                                generation,
                                candidate: candidate.with_preview(bytes),
                            });
                        }
                        Err(e) => warn!(source = %kind, "Error fetching '{}': {e}", candidate.name),
                    }
                }

                Ok::<(), PickerError>(())
            });

            let error = outcome.err().map(|e| {
                warn!(source = %kind, "Search failed: {e}");
                e.to_string()
            });

            let _ = sender.send(TaskResult::SourceFinished { generation, source: kind, error });
        });
    }
}
