use crate::auth::password::CredentialError;

#[derive(Debug)]
pub enum UserServiceError {
    ValidationError(String),
    UserAlreadyExists,
    UserNotFound,
    InvalidCredentials,
    /// The stored credential blob is corrupt. This is a data-integrity
    /// failure, never reported to the caller as a wrong password.
    CorruptCredential(CredentialError),
    RepositoryError(String),
}

impl std::fmt::Display for UserServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserServiceError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            UserServiceError::UserAlreadyExists => write!(f, "User already exists"),
            UserServiceError::UserNotFound => write!(f, "User not found"),
            UserServiceError::InvalidCredentials => write!(f, "Invalid email or password"),
            UserServiceError::CorruptCredential(err) => {
                write!(f, "Corrupt stored credential: {}", err)
            }
            UserServiceError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for UserServiceError {}

impl From<CredentialError> for UserServiceError {
    fn from(err: CredentialError) -> Self {
        UserServiceError::CorruptCredential(err)
    }
}
