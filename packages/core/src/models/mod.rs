pub mod game;
pub mod piece;
pub mod user;

/// Raised when a stored integer code does not name any variant of the
/// enum it was persisted for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub type_name: &'static str,
    pub code: u8,
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid {} code: {}", self.type_name, self.code)
    }
}

impl std::error::Error for DecodeError {}
