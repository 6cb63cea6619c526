use crate::primitives::Selector;

#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("Can not split duration of {ticks} ticks at tick {at}")]
    InvalidSplit { ticks: u64, at: u64 },
    #[error("Duration denominator must be positive")]
    ZeroDenominator,
    #[error("No element at {0}")]
    OutOfRange(Selector),
    #[error("Tick {0} is not on a note boundary")]
    NotFound(u64),
    #[error(
        "Cannot paste here: no measure {measure} to continue pasting into"
    )]
    DestinationExhausted { measure: usize },
    #[error("Can not (de)serialize score: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Malformed MusicXML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("MusicXML document has no <{0}> element")]
    MissingElement(String),
    #[error("Can not read file: {0}")]
    Io(#[from] std::io::Error),
}
pub type ScoreResult<T> = Result<T, ScoreError>;
