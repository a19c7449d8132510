use std::collections::HashSet;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user: String,
    pub token: Option<String>,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolves the bearer token (if any) into a session.
    async fn session(&self, token: Option<&str>) -> Option<Session>;
    async fn sign_out(&self, session: &Session);
}

/// Accepts a fixed set of bearer tokens. Signing out revokes the token for
/// the lifetime of the process.
///
/// With no tokens configured every request gets an anonymous session.
pub struct TokenAuth {
    open: bool,
    active: RwLock<HashSet<String>>,
}

impl TokenAuth {
    pub fn new(tokens: &[String]) -> Self {
        Self {
            open: tokens.is_empty(),
            active: RwLock::new(tokens.iter().cloned().collect()),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

#[async_trait]
impl AuthService for TokenAuth {
    async fn session(&self, token: Option<&str>) -> Option<Session> {
        if self.open {
            return Some(Session {
                user: "anonymous".to_string(),
                token: None,
            });
        }
        let token = token?;
        if !self.active.read().await.contains(token) {
            return None;
        }
        Some(Session {
            user: format!("token:{}", token.chars().take(6).collect::<String>()),
            token: Some(token.to_string()),
        })
    }

    async fn sign_out(&self, session: &Session) {
        if let Some(token) = &session.token {
            if self.active.write().await.remove(token) {
                info!("Signed out {}", session.user);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_mode_admits_everyone() {
        let auth = TokenAuth::new(&[]);
        assert!(auth.is_open());
        let session = auth.session(None).await.unwrap();
        assert_eq!(session.user, "anonymous");
    }

    #[tokio::test]
    async fn test_sign_out_revokes_token() {
        let auth = TokenAuth::new(&["secret-token".to_string()]);
        assert!(auth.session(None).await.is_none());
        assert!(auth.session(Some("wrong")).await.is_none());

        let session = auth.session(Some("secret-token")).await.unwrap();
        assert_eq!(session.user, "token:secret");

        auth.sign_out(&session).await;
        assert!(auth.session(Some("secret-token")).await.is_none());
    }
}
