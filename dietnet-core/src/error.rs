use thiserror::Error;

#[derive(Debug, Error)]
pub enum DietNetError {
    #[error("Column '{column}' not found in '{file}'. Available: {available:?}")]
    MissingColumn {
        file: String,
        column: String,
        available: Vec<String>,
    },

    #[error("The frequency of consumption is too high for compound '{compound}': {freq}")]
    FrequencyTooHigh { compound: String, freq: f64 },

    #[error("Duplicate sample name detected: '{0}'. Names must be unique")]
    DuplicateSampleName(String),

    #[error("Id '{0}' matches more than one mapper row")]
    AmbiguousMapperEntry(String),

    #[error("Unrecognized mapper color '{color}' for id '{id}'")]
    UnknownMapperColor { id: String, color: String },

    #[error("Graph CSV not found for sample '{name}': {path}")]
    GraphNotFound { name: String, path: String },

    #[error("Need at least 2 samples to run PERMANOVA for '{0}'")]
    InsufficientSamples(String),

    #[error("Fewer than 2 groups with at least 2 samples remain for '{0}'")]
    InsufficientGroups(String),

    #[error("Sample '{sample}' has no label for grouping variable '{column}'")]
    MissingGroupLabel { sample: String, column: String },

    #[error("I/O error for file '{0}': {1}")]
    FileIO(String, #[source] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Failed to process CSV file '{0}': {1}")]
    CsvError(String, #[source] csv::Error),
}
