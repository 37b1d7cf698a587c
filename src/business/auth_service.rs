use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};

use crate::business::RequestValidator;
use crate::domain::{AuthToken, LoginUser, Profile, ProfileResponse, RegisterUser, User};
use crate::error::AppError;
use crate::security::TokenService;
use crate::store::{ProfileStore, UserStore};

/// Account registration, login, and profile lookup.
pub struct AuthService {
    validator: RequestValidator,
    users: Arc<dyn UserStore>,
    profiles: Arc<dyn ProfileStore>,
    tokens: Arc<TokenService>,
    token_ttl: Duration,
    refresh_token_ttl: Duration,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        profiles: Arc<dyn ProfileStore>,
        tokens: Arc<TokenService>,
        token_ttl: Duration,
        refresh_token_ttl: Duration,
    ) -> Self {
        Self {
            validator: RequestValidator::new(),
            users,
            profiles,
            tokens,
            token_ttl,
            refresh_token_ttl,
        }
    }

    pub async fn register(&self, body: RegisterUser) -> Result<AuthToken, AppError> {
        self.validator.validate_register(&body)?;

        if self.users.find_user_by_email(&body.email).await?.is_some() {
            return Err(AppError::BadRequest("User Already Registered".to_string()));
        }

        let user = self.users.insert_user(User::from_registration(body)).await?;
        let token = self.tokens.issue(&user.id, self.token_ttl).await;
        let refresh_token = self.tokens.issue(&user.id, self.refresh_token_ttl).await;

        self.profiles
            .upsert_profile(Profile {
                user_id: user.id.clone(),
                refresh_token,
                created_at: Utc::now(),
            })
            .await?;

        info!("Registered user {}", user.id);
        Ok(AuthToken {
            msg: "User Registered Successfully".to_string(),
            token,
        })
    }

    pub async fn login(&self, body: LoginUser) -> Result<AuthToken, AppError> {
        self.validator.validate_login(&body)?;

        let user = self
            .users
            .find_user_by_email(&body.email)
            .await?
            .ok_or_else(|| AppError::BadRequest("User Not Registered".to_string()))?;

        if body.password != user.password {
            debug!("Password mismatch for user {}", user.id);
            return Err(AppError::BadRequest("Invalid Credentials".to_string()));
        }

        let token = self.tokens.issue(&user.id, self.token_ttl).await;
        info!("User {} logged in", user.id);
        Ok(AuthToken {
            msg: "User Login Successfully".to_string(),
            token,
        })
    }

    pub async fn profile(&self, user_id: &str) -> Result<ProfileResponse, AppError> {
        let user = self
            .users
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("User Not Registered".to_string()))?;

        Ok(ProfileResponse {
            msg: "Data fetched".to_string(),
            user: user.public(),
        })
    }
}
