use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password, CredentialError};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub email_verified: bool,
    pub rating: i32,
    #[serde(with = "serde_bytes")]
    pub password_hash: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_bytes")]
    pub avatar: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a user. The password is hashed here; the plaintext is never
    /// stored anywhere on the struct.
    pub fn new(username: &str, email: &str, password: &str) -> Self {
        User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            email: email.to_string(),
            email_verified: false,
            rating: 1000, // default starting rating
            password_hash: hash_password(password),
            avatar: None,
            created_at: Utc::now(),
        }
    }

    pub fn set_password(&mut self, password: &str) {
        self.password_hash = hash_password(password);
    }

    pub fn verify_password(&self, password: &str) -> Result<bool, CredentialError> {
        verify_password(password, &self.password_hash)
    }
}
