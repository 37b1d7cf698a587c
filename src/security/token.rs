use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::AppError;

#[derive(Debug, Clone)]
struct Session {
    user_id: String,
    expires_at: DateTime<Utc>,
}

/// Issues and verifies opaque bearer tokens bound to a user id.
pub struct TokenService {
    sessions: RwLock<HashMap<String, Session>>,
}

impl TokenService {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn issue(&self, user_id: &str, ttl: Duration) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let session = Session {
            user_id: user_id.to_string(),
            expires_at: Utc::now() + ttl,
        };
        self.sessions.write().await.insert(token.clone(), session);
        debug!("Issued token for user {} valid for {}s", user_id, ttl.num_seconds());
        token
    }

    /// Resolve a token to its user id. Expired tokens are evicted.
    pub async fn verify(&self, token: &str) -> Result<String, AppError> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                None => return Err(AppError::Unauthorized),
                Some(session) if session.expires_at > now => {
                    return Ok(session.user_id.clone())
                }
                Some(_) => {}
            }
        }

        self.sessions.write().await.remove(token);
        debug!("Rejected expired token");
        Err(AppError::Unauthorized)
    }

    /// Drop every expired session, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        before - sessions.len()
    }
}

impl Default for TokenService {
    fn default() -> Self {
        Self::new()
    }
}
