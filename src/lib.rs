pub mod core;
pub mod deck;
pub mod gui;
pub mod persistence;
pub mod picker;
pub mod search;
pub mod sources;

pub use crate::core::{
    PickerError,
    SourceKind,
};
