use crate::models::game::GameError;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use crate::repositories::errors::piece_repository_errors::PieceRepositoryError;

#[derive(Debug)]
pub enum GameServiceError {
    ValidationError(String),
    GameNotFound,
    UserNotFound,
    /// A concurrent writer won the conditional write. The caller must
    /// re-read the session before deciding whether to retry.
    Conflict(String),
    Game(GameError),
    RepositoryError(String),
}

impl std::fmt::Display for GameServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameServiceError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            GameServiceError::GameNotFound => write!(f, "Game not found"),
            GameServiceError::UserNotFound => write!(f, "User not found"),
            GameServiceError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            GameServiceError::Game(err) => write!(f, "Game error: {}", err),
            GameServiceError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for GameServiceError {}

impl From<GameError> for GameServiceError {
    fn from(err: GameError) -> Self {
        GameServiceError::Game(err)
    }
}

impl From<GameRepositoryError> for GameServiceError {
    fn from(err: GameRepositoryError) -> Self {
        match err {
            GameRepositoryError::NotFound => GameServiceError::GameNotFound,
            GameRepositoryError::Conflict => GameServiceError::Conflict(err.to_string()),
            _ => GameServiceError::RepositoryError(err.to_string()),
        }
    }
}

impl From<PieceRepositoryError> for GameServiceError {
    fn from(err: PieceRepositoryError) -> Self {
        GameServiceError::RepositoryError(err.to_string())
    }
}
