use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalizerError {
    #[error("Invalid observation for concept '{concept}': {details}")]
    InvalidObservation { concept: String, details: String },

    #[error("Missing Gemini API key: set GEMINI_API_KEY or construct the client with an explicit key")]
    MissingApiKey,

    #[error("Classification request failed: {0}")]
    ClassificationFailed(String),

    #[error("Classification timed out after {0} seconds")]
    ClassificationTimeout(u64),

    #[error("Classifier returned malformed JSON: {0}")]
    MalformedResponse(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[cfg(feature = "gemini")]
impl From<reqwest::Error> for NormalizerError {
    fn from(err: reqwest::Error) -> Self {
        NormalizerError::ClassificationFailed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NormalizerError>;
