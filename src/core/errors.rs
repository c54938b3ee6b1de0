use thiserror::Error;

#[derive(Error, Debug)]
pub enum PickerError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(Box<csv::Error>),

    #[error("Reqwest error: {0}")]
    Reqwest(Box<reqwest::Error>),

    #[error("Missing column '{column}' in {file}")]
    MissingColumn { column: String, file: String },

    #[error("Unknown symbol source '{label}' on row {row}")]
    UnknownSource { label: String, row: usize },

    #[error("Deck has no entries: {0}")]
    EmptyDeck(String),

    #[error("Please enter a number between 1 and {total} (got {index}).")]
    IndexOutOfRange { index: usize, total: usize },

    #[error("API key not set for {0}")]
    MissingApiKey(&'static str),

    #[error("PickerError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for PickerError {
    fn from(error: std::io::Error) -> Self {
        PickerError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for PickerError {
    fn from(error: reqwest::Error) -> Self {
        PickerError::Reqwest(Box::new(error))
    }
}

impl From<csv::Error> for PickerError {
    fn from(error: csv::Error) -> Self {
        PickerError::Csv(Box::new(error))
    }
}
