#[derive(Debug)]
pub enum GameRepositoryError {
    NotFound,
    /// A conditional write lost to a concurrent writer. The caller must
    /// re-read before retrying; a blind retry could double-advance a turn.
    Conflict,
    Serialization(String),
    DynamoDb(String),
}

impl std::fmt::Display for GameRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameRepositoryError::NotFound => write!(f, "Game not found"),
            GameRepositoryError::Conflict => {
                write!(f, "Game was modified concurrently; re-read before retrying")
            }
            GameRepositoryError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            GameRepositoryError::DynamoDb(msg) => write!(f, "DynamoDB error: {}", msg),
        }
    }
}

impl std::error::Error for GameRepositoryError {}
