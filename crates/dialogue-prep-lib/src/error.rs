use thiserror::Error;

/// Failure to read the reference summary out of a record's metadata blob.
///
/// This is the only record-level error kind. Cleaning and template
/// formatting cannot fail on well-typed string input.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The blob is not valid JSON, or `summaries.abstractive_summaries` is missing
    /// or has the wrong shape.
    #[error("malformed original dialog info: {0}")]
    Metadata(#[from] serde_json::Error),

    /// `summaries.abstractive_summaries` parsed but holds no variant at index 0.
    #[error("original dialog info has no abstractive summary")]
    NoAbstractiveSummary,
}
