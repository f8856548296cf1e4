pub type CardstockResult<T> = Result<T, CardstockError>;

#[derive(thiserror::Error, Debug)]
pub enum CardstockError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("transform error: {0}")]
    Transform(String),

    #[error("scheduling error: {0}")]
    Scheduling(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CardstockError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn transform(msg: impl Into<String>) -> Self {
        Self::Transform(msg.into())
    }

    pub fn scheduling(msg: impl Into<String>) -> Self {
        Self::Scheduling(msg.into())
    }
}
