//! Access-token validation for tokens issued by Supabase Auth.
//!
//! Tokens are HS256-signed with the project's JWT secret and carry the
//! user's uuid in `sub`, the account email in `email` and the audience
//! `authenticated`. This service never issues tokens to clients;
//! [`generate_access_token`] exists for local tooling and tests.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use storybook_core::types::DbId;

/// Audience Supabase puts on tokens of signed-in users.
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

/// JWT claims read from every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the auth user's uuid.
    pub sub: DbId,
    /// Account email, absent for phone-only accounts.
    #[serde(default)]
    pub email: Option<String>,
    /// Database role (`authenticated`).
    #[serde(default)]
    pub role: Option<String>,
    pub aud: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
}

/// Configuration for JWT validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret shared with the auth service.
    pub secret: String,
    /// Expected `aud` claim.
    pub audience: String,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var               | Required | Default         |
    /// |-----------------------|----------|-----------------|
    /// | `SUPABASE_JWT_SECRET` | **yes**  | --              |
    /// | `JWT_AUDIENCE`        | no       | `authenticated` |
    ///
    /// # Panics
    ///
    /// Panics if `SUPABASE_JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret = std::env::var("SUPABASE_JWT_SECRET")
            .expect("SUPABASE_JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "SUPABASE_JWT_SECRET must not be empty");

        let audience =
            std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| AUTHENTICATED_AUDIENCE.into());

        Self { secret, audience }
    }
}

/// Sign an HS256 access token shaped like the auth service's.
pub fn generate_access_token(
    user_id: DbId,
    email: Option<&str>,
    expiry_secs: i64,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();

    let claims = Claims {
        sub: user_id,
        email: email.map(str::to_string),
        role: Some(AUTHENTICATED_AUDIENCE.to_string()),
        aud: config.audience.clone(),
        exp: now + expiry_secs,
        iat: now,
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode an access token, returning the embedded [`Claims`].
///
/// Checks the signature, expiration and audience.
pub fn validate_token(token: &str, config: &JwtConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[config.audience.as_str()]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}
