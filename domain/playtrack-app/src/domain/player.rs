use chrono::{DateTime, Utc};
use rustrict::CensorStr;
use validator::Validate;

use crate::domain::{RepoCreateError, RepoError, RepoRetrieveError, RepoUpdateError, Username};

pub const DEFAULT_AGE: u32 = 18;

const USERNAME_MIN_LEN: usize = 3;
const USERNAME_MAX_LEN: usize = 32;
const PASSWORD_MIN_LEN: usize = 6;

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub username: Username,
    pub email: String,
    pub password_hash: String,
    pub age: u32,
    pub created_at: DateTime<Utc>,
    pub avatar: Option<String>,
}

#[async_trait::async_trait]
pub trait PlayerRepository {
    async fn create_player(&self, player: Player) -> Result<(), RepoCreateError>;
    async fn get_player(&self, username: &str) -> Result<Player, RepoRetrieveError>;
    async fn get_players(&self, usernames: &[Username]) -> Result<Vec<Player>, RepoError>;
    /// All players ordered by username.
    async fn list_players(&self) -> Result<Vec<Player>, RepoError>;
    /// Case-insensitive substring match on username or email, ordered by username.
    async fn search_players(&self, query: &str, limit: usize) -> Result<Vec<Player>, RepoError>;
    async fn update_password_hash(
        &self,
        username: &str,
        password_hash: String,
    ) -> Result<(), RepoUpdateError>;
    async fn set_avatar(&self, username: &str, avatar_url: String) -> Result<(), RepoUpdateError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlayerValidationError {
    #[error("Username, email and password are required")]
    MissingFields,
    #[error("Username must be at least 3 characters")]
    UsernameTooShort,
    #[error("Username must be at most 32 characters")]
    UsernameTooLong,
    #[error("Username may only contain letters, digits, '_', '-' and '.'")]
    UsernameInvalidCharacters,
    #[error("Username is not allowed")]
    UsernameInappropriate,
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
    #[error("Invalid email format")]
    InvalidEmail,
}

pub fn validate_username(username: &str) -> Result<Username, PlayerValidationError> {
    let username = username.trim();
    let len = username.chars().count();
    if len < USERNAME_MIN_LEN {
        return Err(PlayerValidationError::UsernameTooShort);
    }
    if len > USERNAME_MAX_LEN {
        return Err(PlayerValidationError::UsernameTooLong);
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(PlayerValidationError::UsernameInvalidCharacters);
    }
    if username.is_inappropriate() {
        return Err(PlayerValidationError::UsernameInappropriate);
    }
    Ok(username.to_string())
}

pub fn validate_password(password: &str) -> Result<(), PlayerValidationError> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(PlayerValidationError::PasswordTooShort);
    }
    Ok(())
}

#[derive(Validate)]
struct EmailValidator {
    #[validate(email)]
    email: String,
}

pub fn validate_email(email: &str) -> Result<String, PlayerValidationError> {
    let validator = EmailValidator {
        email: email.trim().to_string(),
    };
    if validator.validate().is_err() {
        return Err(PlayerValidationError::InvalidEmail);
    }
    Ok(validator.email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert_eq!(validate_username("alice"), Ok("alice".to_string()));
        assert_eq!(validate_username("  bob  "), Ok("bob".to_string()));
        assert_eq!(
            validate_username("al"),
            Err(PlayerValidationError::UsernameTooShort)
        );
        assert_eq!(
            validate_username("a b c"),
            Err(PlayerValidationError::UsernameInvalidCharacters)
        );
        assert_eq!(
            validate_username(&"x".repeat(33)),
            Err(PlayerValidationError::UsernameTooLong)
        );
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret").is_ok());
        assert_eq!(
            validate_password("12345"),
            Err(PlayerValidationError::PasswordTooShort)
        );
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(
            validate_email(" alice@example.com "),
            Ok("alice@example.com".to_string())
        );
        assert_eq!(
            validate_email("not-an-email"),
            Err(PlayerValidationError::InvalidEmail)
        );
    }
}
