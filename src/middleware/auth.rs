use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use dotenvy::dotenv;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity carried by every issued token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: i32,
    pub role: String,
    pub kind: TokenKind,
    pub exp: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Clone, Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Requires a bearer token of the given kind and stores its claims as a
/// request extension.
pub async fn auth_middleware(
    State(kind): State<TokenKind>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => header.trim_start_matches("Bearer "),
        _ => return Err(StatusCode::UNAUTHORIZED),
    };

    let claims = validate_token(token, kind).map_err(|_| StatusCode::UNAUTHORIZED)?;
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

pub fn issue_token_pair(id: i32, role: &str) -> Result<TokenPair, AuthTokenError> {
    Ok(TokenPair {
        access_token: issue_token(id, role, TokenKind::Access, Duration::hours(24))?,
        refresh_token: issue_token(id, role, TokenKind::Refresh, Duration::days(30))?,
    })
}

pub fn issue_access_token(id: i32, role: &str) -> Result<String, AuthTokenError> {
    issue_token(id, role, TokenKind::Access, Duration::hours(24))
}

fn issue_token(
    id: i32,
    role: &str,
    kind: TokenKind,
    ttl: Duration,
) -> Result<String, AuthTokenError> {
    let exp = Utc::now()
        .checked_add_signed(ttl)
        .ok_or(AuthTokenError::GenerationFail)?
        .timestamp() as usize;

    let claims = Claims {
        id,
        role: role.to_owned(),
        kind,
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret_key().as_bytes()),
    )
    .map_err(|_| AuthTokenError::GenerationFail)
}

/// Decodes and checks the token purely from its signature and claims; no
/// database round trip.
pub fn validate_token(token: &str, expected: TokenKind) -> Result<Claims, AuthTokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret_key().as_bytes()),
        &validation,
    )
    .map_err(|_| AuthTokenError::ValidationFail)?;

    if token_data.claims.kind != expected {
        return Err(AuthTokenError::WrongTokenKind);
    }

    Ok(token_data.claims)
}

#[derive(Error, Debug)]
pub enum AuthTokenError {
    #[error("Failed to validate token")]
    ValidationFail,
    #[error("Token is not valid for this operation")]
    WrongTokenKind,
    #[error("Failed to generate token")]
    GenerationFail,
}

fn secret_key() -> String {
    dotenv().ok();
    std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY not found in environment")
}
