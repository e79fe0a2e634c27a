use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::{AppError, ValidationErrors};

pub const MIN_PASSWORD_LENGTH: usize = 6;

fn hash_blocking(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

fn verify_blocking(password: &str, password_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(password_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Argon2 runs on the blocking pool so it never stalls a runtime worker.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash_blocking(&password))
        .await
        .map_err(|e| AppError::Internal(format!("password hashing task failed: {e}")))?
}

/// `false` for a wrong password and for an unparseable stored hash.
pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_string();
    let password_hash = password_hash.to_string();
    tokio::task::spawn_blocking(move || verify_blocking(&password, &password_hash))
        .await
        .map_err(|e| AppError::Internal(format!("password check task failed: {e}")))
}

/// Password rules, reported under identity-style error codes.
pub fn check_password_policy(password: &str, errors: &mut ValidationErrors) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(
            "PasswordTooShort",
            format!("Passwords must be at least {MIN_PASSWORD_LENGTH} characters."),
        );
    }
    if password.chars().all(char::is_alphanumeric) {
        errors.add(
            "PasswordRequiresNonAlphanumeric",
            "Passwords must have at least one non alphanumeric character.",
        );
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.add(
            "PasswordRequiresDigit",
            "Passwords must have at least one digit ('0'-'9').",
        );
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.add(
            "PasswordRequiresLower",
            "Passwords must have at least one lowercase ('a'-'z').",
        );
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.add(
            "PasswordRequiresUpper",
            "Passwords must have at least one uppercase ('A'-'Z').",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn hash_verifies_only_the_original_password() {
        let hash = hash_password("Pa$$w0rd").await.unwrap();
        assert!(verify_password("Pa$$w0rd", &hash).await.unwrap());
        assert!(!verify_password("pa$$w0rd", &hash).await.unwrap());
        assert!(!verify_password("Pa$$w0rd", "not-a-phc-string").await.unwrap());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn hashing_leaves_the_runtime_free_for_other_tasks() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        tokio::spawn(async move { flag.store(true, Ordering::SeqCst) });

        let hash = hash_password("Pa$$w0rd").await.unwrap();

        assert!(ran.load(Ordering::SeqCst));
        assert!(verify_password("Pa$$w0rd", &hash).await.unwrap());
    }

    #[test]
    fn strong_password_passes_policy() {
        let mut errors = ValidationErrors::new();
        check_password_policy("Pa$$w0rd", &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn weak_password_lists_each_rule() {
        let mut errors = ValidationErrors::new();
        check_password_policy("abc", &mut errors);
        assert!(errors.contains("PasswordTooShort"));
        assert!(errors.contains("PasswordRequiresNonAlphanumeric"));
        assert!(errors.contains("PasswordRequiresDigit"));
        assert!(errors.contains("PasswordRequiresUpper"));
        assert!(!errors.contains("PasswordRequiresLower"));
    }
}
