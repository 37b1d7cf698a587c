pub mod auth;
pub mod token;

pub use auth::*;
pub use token::*;

use poem::Request;

use crate::error::AppError;

/// Resolve the calling user from the request's bearer token.
pub async fn authenticate(tokens: &TokenService, req: &Request) -> Result<String, AppError> {
    let token = extract_bearer_token(req)?;
    tokens.verify(&token).await
}
