use poem::Request;
use poem_openapi::{payload::Json, ApiResponse, OpenApi};
use std::sync::Arc;

use crate::business::AuthService;
use crate::domain::{AuthToken, LoginUser, ProfileResponse, RegisterUser};
use crate::security::{authenticate, TokenService};

pub struct AuthApi {
    service: Arc<AuthService>,
    tokens: Arc<TokenService>,
}

impl AuthApi {
    pub fn new(service: Arc<AuthService>, tokens: Arc<TokenService>) -> Self {
        Self { service, tokens }
    }
}

#[derive(ApiResponse)]
pub enum RegisterResponse {
    #[oai(status = 201)]
    Created(Json<AuthToken>),
}

#[derive(ApiResponse)]
pub enum LoginResponse {
    #[oai(status = 200)]
    Ok(Json<AuthToken>),
}

#[derive(ApiResponse)]
pub enum GetProfileResponse {
    #[oai(status = 200)]
    Ok(Json<ProfileResponse>),
}

#[OpenApi]
impl AuthApi {
    /// Create an account and return an access token
    #[oai(path = "/auth/register", method = "post")]
    async fn register(&self, body: Json<RegisterUser>) -> Result<RegisterResponse, poem::Error> {
        let token = self.service.register(body.0).await?;
        Ok(RegisterResponse::Created(Json(token)))
    }

    #[oai(path = "/auth/login", method = "post")]
    async fn login(&self, body: Json<LoginUser>) -> Result<LoginResponse, poem::Error> {
        let token = self.service.login(body.0).await?;
        Ok(LoginResponse::Ok(Json(token)))
    }

    /// Name and email of the signed-in user
    #[oai(path = "/auth/profile", method = "get")]
    async fn profile(&self, req: &Request) -> Result<GetProfileResponse, poem::Error> {
        let user_id = authenticate(&self.tokens, req).await?;
        let profile = self.service.profile(&user_id).await?;
        Ok(GetProfileResponse::Ok(Json(profile)))
    }
}
