use std::sync::Arc;

use tracing::{info, warn};

use crate::models::user::User;
use crate::repositories::errors::user_repository_errors::UserRepositoryError;
use crate::repositories::user_repository::UserRepository;
use crate::services::errors::user_service_errors::UserServiceError;

const MAX_USERNAME_LEN: usize = 32;
const MAX_EMAIL_LEN: usize = 255;

pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>) -> Self {
        UserService { repository }
    }

    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, UserServiceError> {
        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Username, email, or password cannot be empty".to_string(),
            ));
        }
        // caps are in characters, not bytes
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(UserServiceError::ValidationError(format!(
                "Username cannot exceed {} characters",
                MAX_USERNAME_LEN
            )));
        }
        if email.chars().count() > MAX_EMAIL_LEN {
            return Err(UserServiceError::ValidationError(format!(
                "Email cannot exceed {} characters",
                MAX_EMAIL_LEN
            )));
        }
        if self
            .repository
            .username_exists(username)
            .await
            .map_err(|e| UserServiceError::RepositoryError(e.to_string()))?
        {
            return Err(UserServiceError::UserAlreadyExists);
        }
        if self
            .repository
            .email_exists(email)
            .await
            .map_err(|e| UserServiceError::RepositoryError(e.to_string()))?
        {
            return Err(UserServiceError::UserAlreadyExists);
        }
        let user = User::new(username, email, password);
        self.repository
            .create_user(&user)
            .await
            .map_err(|e| UserServiceError::RepositoryError(e.to_string()))?;
        info!("Created user {}", user.id);
        Ok(user)
    }

    pub async fn get_user_by_id(&self, user_id: &str) -> Result<User, UserServiceError> {
        if user_id.is_empty() {
            return Err(UserServiceError::ValidationError(
                "User ID cannot be empty".to_string(),
            ));
        }
        self.repository
            .get_user_by_id(user_id)
            .await
            .map_err(|e| match e {
                UserRepositoryError::NotFound => UserServiceError::UserNotFound,
                _ => UserServiceError::RepositoryError(e.to_string()),
            })
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<User, UserServiceError> {
        if username.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }
        self.repository
            .get_user_by_username(username)
            .await
            .map_err(|e| match e {
                UserRepositoryError::NotFound => UserServiceError::UserNotFound,
                _ => UserServiceError::RepositoryError(e.to_string()),
            })
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<User, UserServiceError> {
        if email.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Email cannot be empty".to_string(),
            ));
        }
        self.repository
            .get_user_by_email(email)
            .await
            .map_err(|e| match e {
                UserRepositoryError::NotFound => UserServiceError::UserNotFound,
                _ => UserServiceError::RepositoryError(e.to_string()),
            })
    }

    /// Check a login. Unknown emails and wrong passwords both come back as
    /// `InvalidCredentials` so callers cannot enumerate accounts. A corrupt
    /// stored hash is surfaced as its own error, never as a failed login.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, UserServiceError> {
        if email.is_empty() || password.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Email or password cannot be empty".to_string(),
            ));
        }
        match self.get_user_by_email(email).await {
            Ok(user) => {
                if user.verify_password(password)? {
                    Ok(user)
                } else {
                    warn!("Failed login attempt for user {}", user.id);
                    Err(UserServiceError::InvalidCredentials)
                }
            }
            Err(UserServiceError::UserNotFound) => Err(UserServiceError::InvalidCredentials),
            Err(err) => Err(err),
        }
    }

    pub async fn set_password(
        &self,
        user_id: &str,
        new_password: &str,
    ) -> Result<User, UserServiceError> {
        if new_password.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Password cannot be empty".to_string(),
            ));
        }
        let mut user = self.get_user_by_id(user_id).await?;
        user.set_password(new_password);
        self.repository
            .update_user(&user)
            .await
            .map_err(|e| UserServiceError::RepositoryError(e.to_string()))?;
        info!("Updated password for user {}", user.id);
        Ok(user)
    }

    pub async fn update_rating(
        &self,
        user_id: &str,
        new_rating: i32,
    ) -> Result<User, UserServiceError> {
        if new_rating < 0 {
            return Err(UserServiceError::ValidationError(
                "Rating cannot be negative".to_string(),
            ));
        }
        let mut user = self.get_user_by_id(user_id).await?;
        user.rating = new_rating;
        self.repository
            .update_user(&user)
            .await
            .map_err(|e| UserServiceError::RepositoryError(e.to_string()))?;
        Ok(user)
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<(), UserServiceError> {
        if user_id.is_empty() {
            return Err(UserServiceError::ValidationError(
                "User ID cannot be empty".to_string(),
            ));
        }
        self.repository
            .delete_user(user_id)
            .await
            .map_err(|e| match e {
                UserRepositoryError::NotFound => UserServiceError::UserNotFound,
                _ => UserServiceError::RepositoryError(e.to_string()),
            })?;
        info!("Deleted user {}", user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::user_repository::MockUserRepository;

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_username_exists()
            .returning(|_| Box::pin(async { Ok(false) }));
        mock_repo
            .expect_email_exists()
            .returning(|_| Box::pin(async { Ok(false) }));
        mock_repo
            .expect_create_user()
            .returning(|_| Box::pin(async { Ok(()) }));

        let service = UserService::new(Arc::new(mock_repo));
        let user = service
            .create_user("magnus", "magnus@example.com", "hunter2")
            .await
            .unwrap();

        assert_eq!(user.username, "magnus");
        assert_eq!(user.rating, 1000);
        assert_eq!(user.password_hash.len(), 64);
        assert!(user.verify_password("hunter2").unwrap());
    }

    #[tokio::test]
    async fn test_create_user_rejects_empty_fields() {
        let service = UserService::new(Arc::new(MockUserRepository::new()));

        let result = service.create_user("", "magnus@example.com", "hunter2").await;

        assert!(matches!(
            result.unwrap_err(),
            UserServiceError::ValidationError(_)
        ));
    }

    #[tokio::test]
    async fn test_create_user_rejects_long_username() {
        let service = UserService::new(Arc::new(MockUserRepository::new()));
        let long_username = "a".repeat(33);

        let result = service
            .create_user(&long_username, "magnus@example.com", "hunter2")
            .await;

        assert!(matches!(
            result.unwrap_err(),
            UserServiceError::ValidationError(_)
        ));
    }

    #[tokio::test]
    async fn test_username_cap_counts_characters_not_bytes() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_username_exists()
            .returning(|_| Box::pin(async { Ok(false) }));
        mock_repo
            .expect_email_exists()
            .returning(|_| Box::pin(async { Ok(false) }));
        mock_repo
            .expect_create_user()
            .returning(|_| Box::pin(async { Ok(()) }));

        let service = UserService::new(Arc::new(mock_repo));

        // 20 characters but 40 bytes; must be accepted
        let cyrillic = "ш".repeat(20);
        let user = service
            .create_user(&cyrillic, "player@example.com", "hunter2")
            .await
            .unwrap();
        assert_eq!(user.username, cyrillic);

        // 33 characters is over the cap regardless of encoding
        let too_long = "ш".repeat(33);
        let result = service
            .create_user(&too_long, "other@example.com", "hunter2")
            .await;
        assert!(matches!(
            result.unwrap_err(),
            UserServiceError::ValidationError(_)
        ));
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicate_username() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_username_exists()
            .returning(|_| Box::pin(async { Ok(true) }));

        let service = UserService::new(Arc::new(mock_repo));
        let result = service
            .create_user("magnus", "magnus@example.com", "hunter2")
            .await;

        assert!(matches!(
            result.unwrap_err(),
            UserServiceError::UserAlreadyExists
        ));
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicate_email() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_username_exists()
            .returning(|_| Box::pin(async { Ok(false) }));
        mock_repo
            .expect_email_exists()
            .returning(|_| Box::pin(async { Ok(true) }));

        let service = UserService::new(Arc::new(mock_repo));
        let result = service
            .create_user("magnus", "magnus@example.com", "hunter2")
            .await;

        assert!(matches!(
            result.unwrap_err(),
            UserServiceError::UserAlreadyExists
        ));
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_get_user_by_email().returning(|_| {
            Box::pin(async { Ok(User::new("magnus", "magnus@example.com", "hunter2")) })
        });

        let service = UserService::new(Arc::new(mock_repo));
        let user = service
            .authenticate("magnus@example.com", "hunter2")
            .await
            .unwrap();

        assert_eq!(user.username, "magnus");
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_get_user_by_email().returning(|_| {
            Box::pin(async { Ok(User::new("magnus", "magnus@example.com", "hunter2")) })
        });

        let service = UserService::new(Arc::new(mock_repo));
        let result = service.authenticate("magnus@example.com", "wrong").await;

        assert!(matches!(
            result.unwrap_err(),
            UserServiceError::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_email_is_invalid_credentials() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_get_user_by_email()
            .returning(|_| Box::pin(async { Err(UserRepositoryError::NotFound) }));

        let service = UserService::new(Arc::new(mock_repo));
        let result = service.authenticate("unknown@example.com", "hunter2").await;

        assert!(matches!(
            result.unwrap_err(),
            UserServiceError::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn test_authenticate_corrupt_hash_is_not_invalid_credentials() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_get_user_by_email().returning(|_| {
            Box::pin(async {
                let mut user = User::new("magnus", "magnus@example.com", "hunter2");
                user.password_hash = vec![0u8; 7];
                Ok(user)
            })
        });

        let service = UserService::new(Arc::new(mock_repo));
        let result = service.authenticate("magnus@example.com", "hunter2").await;

        assert!(matches!(
            result.unwrap_err(),
            UserServiceError::CorruptCredential(_)
        ));
    }

    #[tokio::test]
    async fn test_set_password_rehashes() {
        let original = User::new("magnus", "magnus@example.com", "old-password");
        let original_hash = original.password_hash.clone();
        let user_id = original.id.clone();

        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_get_user_by_id().returning(move |_| {
            let user = original.clone();
            Box::pin(async move { Ok(user) })
        });
        mock_repo
            .expect_update_user()
            .returning(|_| Box::pin(async { Ok(()) }));

        let service = UserService::new(Arc::new(mock_repo));
        let updated = service.set_password(&user_id, "new-password").await.unwrap();

        assert_ne!(updated.password_hash, original_hash);
        assert!(updated.verify_password("new-password").unwrap());
    }

    #[tokio::test]
    async fn test_update_rating_rejects_negative() {
        let service = UserService::new(Arc::new(MockUserRepository::new()));

        let result = service.update_rating("user-id", -50).await;

        assert!(matches!(
            result.unwrap_err(),
            UserServiceError::ValidationError(_)
        ));
    }

    #[tokio::test]
    async fn test_update_rating_persists() {
        let user = User::new("magnus", "magnus@example.com", "hunter2");
        let user_id = user.id.clone();

        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_get_user_by_id().returning(move |_| {
            let user = user.clone();
            Box::pin(async move { Ok(user) })
        });
        mock_repo
            .expect_update_user()
            .withf(|user: &User| user.rating == 1850)
            .returning(|_| Box::pin(async { Ok(()) }));

        let service = UserService::new(Arc::new(mock_repo));
        let updated = service.update_rating(&user_id, 1850).await.unwrap();

        assert_eq!(updated.rating, 1850);
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_get_user_by_id()
            .returning(|_| Box::pin(async { Err(UserRepositoryError::NotFound) }));

        let service = UserService::new(Arc::new(mock_repo));
        let result = service.get_user_by_id("missing").await;

        assert!(matches!(result.unwrap_err(), UserServiceError::UserNotFound));
    }
}
