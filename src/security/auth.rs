use poem::Request;

use crate::error::AppError;

pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn extract_bearer_token(req: &Request) -> Result<String, AppError> {
    let header = req
        .header(AUTHORIZATION_HEADER)
        .ok_or(AppError::Unauthorized)?;

    let (scheme, token) = header.trim().split_once(' ').ok_or(AppError::Unauthorized)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::Unauthorized);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::Unauthorized);
    }
    Ok(token.to_string())
}
