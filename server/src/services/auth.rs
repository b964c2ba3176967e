use super::validate_name;
use crate::auth::{hash_password, verify_password, TokenError, TokenService};
use crate::clock::Clock;
use crate::error::{AppError, AppResult};
use crate::models::{User, UserPreferences, ROLE_USER};
use crate::types::{LoginRequest, LoginResponse, RegisterRequest, UserProfile};
use crate::store::Store;
use std::collections::BTreeSet;
use uuid::Uuid;

pub struct AuthService<'a> {
    store: &'a dyn Store,
    clock: &'a dyn Clock,
    tokens: &'a TokenService,
}

/// A deliberately loose syntax check: one `@`, a non-empty local part and a
/// dotted domain without whitespace.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

fn validate_registration(request: &RegisterRequest) -> AppResult<()> {
    if request.password != request.confirm_password {
        return Err(AppError::invalid("Passwords do not match"));
    }
    validate_name("First name", &request.first_name)?;
    validate_name("Last name", &request.last_name)?;
    if !is_valid_email(request.email.trim()) {
        return Err(AppError::invalid("Email address is not valid"));
    }
    let len = request.password.chars().count();
    if !(8..=20).contains(&len) {
        return Err(AppError::invalid("Password must be between 8 and 20 characters"));
    }
    Ok(())
}

impl<'a> AuthService<'a> {
    pub fn new(store: &'a dyn Store, clock: &'a dyn Clock, tokens: &'a TokenService) -> Self {
        Self {
            store,
            clock,
            tokens,
        }
    }

    /// Creates the account with the USER role and an empty preferences
    /// record. A mismatched confirmation fails before storage is touched.
    pub fn register(&self, request: RegisterRequest) -> AppResult<UserProfile> {
        validate_registration(&request)?;
        let password_hash = hash_password(&request.password)?;
        let now = self.clock.now();
        let email = request.email.trim().to_string();

        let user = self.store.transaction(|repo| {
            if repo.find_user_by_email(&email)?.is_some() {
                return Err(AppError::Conflict(format!(
                    "Email '{}' is already registered",
                    email
                )));
            }
            let user = User {
                id: Uuid::new_v4(),
                first_name: request.first_name.trim().to_string(),
                last_name: request.last_name.trim().to_string(),
                email: email.clone(),
                password_hash,
                roles: BTreeSet::from([ROLE_USER.to_string()]),
                created_at: now,
                updated_at: now,
            };
            repo.insert_user(&user)?;
            repo.save_preferences(&UserPreferences::empty(user.id))?;
            Ok(user)
        })?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(UserProfile::from(&user))
    }

    /// An unknown email is a bad request; a wrong password is Unauthorized.
    pub fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        let email = request.email.trim();
        let user = self
            .store
            .transaction(|repo| repo.find_user_by_email(email))?
            .ok_or_else(|| AppError::invalid(format!("No account found for email '{}'", email)))?;

        if !verify_password(&request.password, &user.password_hash) {
            tracing::info!(user_id = %user.id, "login rejected");
            return Err(AppError::Unauthorized("Invalid email or password".to_string()));
        }

        let token = self.tokens.generate(&user.email)?;
        tracing::info!(user_id = %user.id, "login succeeded");
        Ok(LoginResponse {
            message: "Login successful".to_string(),
            token,
        })
    }

    /// Maps a bearer token to the account it was issued for.
    pub fn resolve(&self, token: &str) -> AppResult<User> {
        let subject = self.tokens.extract_subject(token).map_err(|err| match err {
            TokenError::Expired(at) => {
                tracing::debug!(expired_at = %at, "expired token");
                AppError::Unauthorized("Token has expired".to_string())
            }
            TokenError::Invalid(reason) => {
                tracing::debug!(%reason, "invalid token");
                AppError::Unauthorized("Invalid token".to_string())
            }
        })?;

        self.store
            .transaction(|repo| repo.find_user_by_email(&subject))?
            .ok_or_else(|| AppError::Unauthorized("Unknown user".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_syntax() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@mail.example.org"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("a@@x.com"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email("a@x..com"));
        assert!(!is_valid_email("plain"));
    }

    #[test]
    fn test_mismatch_reported_before_other_checks() {
        let request = RegisterRequest {
            first_name: "x".to_string(),
            last_name: "y".to_string(),
            email: "nope".to_string(),
            password: "pw123456".to_string(),
            confirm_password: "other".to_string(),
        };
        match validate_registration(&request) {
            Err(AppError::InvalidArgument(msg)) => assert_eq!(msg, "Passwords do not match"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
