//! Auth flow — sign-up, sign-in, and session resolution.
//!
//! Credentials themselves live in the hosted credential store; this flow
//! only creates the local user record, exchanges id tokens for session
//! cookies, and resolves the current user from a request's cookie.

pub mod handlers;
pub mod session;

use tracing::warn;

use crate::errors::AppError;
use crate::identity::CredentialStore;
use crate::models::user::User;
use crate::store::Store;

/// Sign-up input. The credential-store account is created client-side; the
/// subject id arrives here as `uid`.
#[derive(Debug, Clone)]
pub struct SignUpParams {
    pub uid: String,
    pub name: String,
    pub email: String,
}

/// Human-readable success/failure result for the auth operations.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub success: bool,
    pub message: String,
}

/// Creates the user record for a freshly registered credential-store
/// account. The insert is conditional, so two concurrent sign-ups with the
/// same uid resolve to one winner and one `AlreadyExists` outcome.
pub async fn sign_up(store: &dyn Store, params: SignUpParams) -> Result<AuthOutcome, AppError> {
    let user = User {
        id: params.uid,
        name: params.name,
        email: params.email,
    };

    let created = store.create_user(&user).await?;
    if !created {
        return Ok(AuthOutcome {
            success: false,
            message: "User already exists. Please sign in instead.".to_string(),
        });
    }

    Ok(AuthOutcome {
        success: true,
        message: "Account created successfully.".to_string(),
    })
}

/// Verifies the id token, ties it to the supplied email, and exchanges it
/// for a session cookie value.
///
/// The token's own email claim must match the email being signed in — a
/// token minted for a different account is rejected outright.
pub async fn sign_in(
    identity: &dyn CredentialStore,
    email: &str,
    id_token: &str,
) -> Result<String, AppError> {
    let claims = identity
        .verify_id_token(id_token)
        .await
        .map_err(|e| {
            warn!("sign-in token verification failed: {e}");
            AppError::Unauthorized
        })?;

    if !claims.email.eq_ignore_ascii_case(email) {
        warn!("sign-in token email does not match the requested account");
        return Err(AppError::Unauthorized);
    }

    let Some(account) = identity.lookup_by_email(email).await? else {
        return Err(AppError::NotFound(
            "User does not exist. Create an account.".to_string(),
        ));
    };
    if account.uid != claims.sub {
        warn!("sign-in token subject does not match the account for {}", account.email);
        return Err(AppError::Unauthorized);
    }

    let cookie_value = identity
        .create_session_cookie(id_token, session::SESSION_TTL_SECS)
        .await?;

    Ok(cookie_value)
}

/// Resolves the current user from the session cookie.
///
/// Any verification failure (expired, revoked, malformed) is logged and
/// reported as "no user", not an error; so is a missing user record.
pub async fn current_user(
    identity: &dyn CredentialStore,
    store: &dyn Store,
    session_cookie: Option<&str>,
) -> Result<Option<User>, AppError> {
    let Some(cookie) = session_cookie else {
        return Ok(None);
    };

    let claims = match identity.verify_session_cookie(cookie, true).await {
        Ok(claims) => claims,
        Err(e) => {
            warn!("session cookie verification failed: {e}");
            return Ok(None);
        }
    };

    Ok(store.user_by_id(&claims.sub).await?)
}

#[allow(dead_code)]
pub async fn is_authenticated(
    identity: &dyn CredentialStore,
    store: &dyn Store,
    session_cookie: Option<&str>,
) -> Result<bool, AppError> {
    Ok(current_user(identity, store, session_cookie)
        .await?
        .is_some())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::identity::{CredentialUser, IdentityError, TokenClaims};
    use crate::store::memory::MemoryStore;

    /// Credential-store double: one known account, tokens of the form
    /// "token-for:{email}" verify to that email.
    struct FakeIdentity {
        uid: String,
        email: String,
    }

    #[async_trait]
    impl CredentialStore for FakeIdentity {
        async fn verify_id_token(&self, id_token: &str) -> Result<TokenClaims, IdentityError> {
            match id_token.strip_prefix("token-for:") {
                Some(email) => Ok(TokenClaims {
                    sub: self.uid.clone(),
                    email: email.to_string(),
                }),
                None => Err(IdentityError::InvalidToken),
            }
        }

        async fn lookup_by_email(
            &self,
            email: &str,
        ) -> Result<Option<CredentialUser>, IdentityError> {
            if email == self.email {
                Ok(Some(CredentialUser {
                    uid: self.uid.clone(),
                    email: self.email.clone(),
                }))
            } else {
                Ok(None)
            }
        }

        async fn create_session_cookie(
            &self,
            id_token: &str,
            _valid_duration_secs: i64,
        ) -> Result<String, IdentityError> {
            Ok(format!("cookie:{id_token}"))
        }

        async fn verify_session_cookie(
            &self,
            cookie: &str,
            _check_revoked: bool,
        ) -> Result<TokenClaims, IdentityError> {
            if cookie == "valid-session" {
                Ok(TokenClaims {
                    sub: self.uid.clone(),
                    email: self.email.clone(),
                })
            } else {
                Err(IdentityError::InvalidToken)
            }
        }
    }

    fn fake_identity() -> FakeIdentity {
        FakeIdentity {
            uid: "uid-1".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    fn params(uid: &str) -> SignUpParams {
        SignUpParams {
            uid: uid.to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_sign_up_creates_user() {
        let store = MemoryStore::new();
        let outcome = sign_up(&store, params("uid-1")).await.unwrap();
        assert!(outcome.success);
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_sign_up_fails_without_second_write() {
        let store = MemoryStore::new();
        sign_up(&store, params("uid-1")).await.unwrap();

        let outcome = sign_up(&store, params("uid-1")).await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.message, "User already exists. Please sign in instead.");
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn test_sign_in_returns_session_cookie_value() {
        let identity = fake_identity();
        let cookie = sign_in(&identity, "ada@example.com", "token-for:ada@example.com")
            .await
            .unwrap();
        assert_eq!(cookie, "cookie:token-for:ada@example.com");
    }

    #[tokio::test]
    async fn test_sign_in_rejects_token_for_other_email() {
        let identity = fake_identity();
        let err = sign_in(&identity, "ada@example.com", "token-for:eve@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn test_sign_in_unknown_email_is_not_found() {
        let identity = fake_identity();
        let err = sign_in(&identity, "bob@example.com", "token-for:bob@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_current_user_without_cookie_is_none() {
        let store = MemoryStore::new();
        let identity = fake_identity();
        let user = current_user(&identity, &store, None).await.unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_current_user_with_bad_cookie_is_none_not_error() {
        let store = MemoryStore::new();
        sign_up(&store, params("uid-1")).await.unwrap();
        let identity = fake_identity();

        let user = current_user(&identity, &store, Some("garbage"))
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_current_user_resolves_user_record() {
        let store = MemoryStore::new();
        sign_up(&store, params("uid-1")).await.unwrap();
        let identity = fake_identity();

        let user = current_user(&identity, &store, Some("valid-session"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.id, "uid-1");
        assert_eq!(user.email, "ada@example.com");

        assert!(is_authenticated(&identity, &store, Some("valid-session"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_current_user_missing_record_is_none() {
        // Valid session but no user row (e.g. record deleted externally).
        let store = MemoryStore::new();
        let identity = fake_identity();

        let user = current_user(&identity, &store, Some("valid-session"))
            .await
            .unwrap();
        assert!(user.is_none());
    }
}
