use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha3::Sha3_256;
use subtle::ConstantTimeEq;

const SALT_LEN: usize = 32;
const KEY_LEN: usize = 32;
const ROUNDS: u32 = 100_000;

/// A stored blob with the wrong length is corrupt data, not a wrong
/// password; callers must not treat it as a failed login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    MalformedHash { len: usize },
}

impl std::fmt::Display for CredentialError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialError::MalformedHash { len } => write!(
                f,
                "Malformed credential hash: expected {} bytes, got {}",
                SALT_LEN + KEY_LEN,
                len
            ),
        }
    }
}

impl std::error::Error for CredentialError {}

/// Hash a password: a fresh random 32-byte salt, PBKDF2-HMAC-SHA3-256 at
/// 100,000 rounds, returned as salt followed by the derived key.
pub fn hash_password(password: &str) -> Vec<u8> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha3_256>(password.as_bytes(), &salt, ROUNDS, &mut key);

    let mut stored = Vec::with_capacity(SALT_LEN + KEY_LEN);
    stored.extend_from_slice(&salt);
    stored.extend_from_slice(&key);
    stored
}

/// Check a password against a stored hash. Re-derives the key with the
/// stored salt and compares in constant time.
pub fn verify_password(password: &str, stored: &[u8]) -> Result<bool, CredentialError> {
    if stored.len() != SALT_LEN + KEY_LEN {
        return Err(CredentialError::MalformedHash { len: stored.len() });
    }
    let (salt, key) = stored.split_at(SALT_LEN);

    let mut candidate = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha3_256>(password.as_bytes(), salt, ROUNDS, &mut candidate);

    Ok(candidate.ct_eq(key).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let stored = hash_password("correct horse battery staple");

        assert_eq!(stored.len(), SALT_LEN + KEY_LEN);
        assert!(verify_password("correct horse battery staple", &stored).unwrap());
        assert!(!verify_password("incorrect horse", &stored).unwrap());
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let first = hash_password("password123");
        let second = hash_password("password123");

        assert_ne!(first, second);
        assert!(verify_password("password123", &first).unwrap());
        assert!(verify_password("password123", &second).unwrap());
    }

    #[test]
    fn test_empty_password_still_salted() {
        let stored = hash_password("");

        assert_eq!(stored.len(), SALT_LEN + KEY_LEN);
        assert!(verify_password("", &stored).unwrap());
        assert!(!verify_password(" ", &stored).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error_not_a_mismatch() {
        let too_short = vec![0u8; SALT_LEN];
        let result = verify_password("anything", &too_short);
        assert_eq!(
            result.unwrap_err(),
            CredentialError::MalformedHash { len: SALT_LEN }
        );

        let too_long = vec![0u8; SALT_LEN + KEY_LEN + 1];
        assert!(verify_password("anything", &too_long).is_err());

        assert!(verify_password("anything", &[]).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(4))]

        #[test]
        fn prop_verify_accepts_only_the_hashed_password(
            password in "[a-zA-Z0-9 ]{1,24}",
            other in "[a-zA-Z0-9 ]{1,24}",
        ) {
            let stored = hash_password(&password);

            prop_assert!(verify_password(&password, &stored).unwrap());
            if other != password {
                prop_assert!(!verify_password(&other, &stored).unwrap());
            }
        }
    }
}
