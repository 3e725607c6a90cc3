use thiserror::Error;

/// Rejections raised by the bill aggregator. None of them mutate the form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregatorError {
    #[error("Utility \"{0}\" already added.")]
    DuplicateUtility(String),

    #[error("Unknown utility '{0}'. Expected one of: Electric Bill, Water Bill, Extra, Others")]
    UnknownUtility(String),

    #[error("No utility at position {index} (form holds {len})")]
    UtilityIndexOutOfRange { index: usize, len: usize },

    #[error("No source at position {index} for {utility} (it has {len})")]
    SourceIndexOutOfRange {
        utility: String,
        index: usize,
        len: usize,
    },

    #[error("{0} has a single amount and no meters to resize")]
    NotMetered(String),

    #[error("{0} is metered; set the amount per meter instead")]
    Metered(String),

    #[error("{utility} accepts at most {max} meters ({requested} requested)")]
    TooManyMeters {
        utility: String,
        requested: usize,
        max: usize,
    },

    #[error("{0} needs at least one source")]
    EmptySources(String),

    #[error("Meter '{meter}' appears twice in {utility}")]
    DuplicateMeter { utility: String, meter: String },
}
