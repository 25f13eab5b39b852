#[derive(Debug)]
pub enum PieceRepositoryError {
    Serialization(String),
    DynamoDb(String),
}

impl std::fmt::Display for PieceRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PieceRepositoryError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            PieceRepositoryError::DynamoDb(msg) => write!(f, "DynamoDB error: {}", msg),
        }
    }
}

impl std::error::Error for PieceRepositoryError {}
