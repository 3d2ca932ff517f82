use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("survey point `{id}` has an empty sample")]
    EmptySample { id: String },

    #[error("survey point `{id}` is malformed: {reason}")]
    MalformedSample { id: String, reason: String },

    #[error("survey point `{id}` has no value field `{field}`")]
    MissingField { id: String, field: String },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("profile line is too long: {length:.1} m (maximum {max_length:.1} m)")]
    LineTooLong { length: f64, max_length: f64 },

    #[error("invalid GeoJSON: {0}")]
    InvalidGeoJson(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProfileError>;

impl ProfileError {
    pub(crate) fn malformed(id: &str, reason: impl Into<String>) -> Self {
        ProfileError::MalformedSample {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}
