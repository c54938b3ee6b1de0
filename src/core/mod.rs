pub mod errors;
pub mod http;
pub mod models;
pub mod settings;
pub mod tasks;
pub mod terms;
pub mod utils;

pub use errors::PickerError;
pub use models::{
    ChosenSymbol,
    SourceKind,
    SymbolCandidate,
    SymbolLocation,
    VocabEntry,
};
