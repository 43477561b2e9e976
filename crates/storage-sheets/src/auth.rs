//! Service-account authentication for the Sheets API.
//!
//! Implements the OAuth 2.0 JWT bearer grant: a claim set signed with the
//! service account's RSA key is exchanged for a short-lived access token. The
//! token is cached and reused until shortly before it expires.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::debug;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::errors::{Result, SheetsError};

pub const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;
const MAX_TOKEN_LIFETIME_SECS: i64 = 86_400;

/// Email and PEM private key of a Google service account.
#[derive(Clone)]
pub struct ServiceAccountCredentials {
    client_email: String,
    private_key: String,
}

impl ServiceAccountCredentials {
    /// Keys pasted into environment variables usually carry literal `\n`
    /// sequences; they are turned back into newlines here.
    pub fn new(client_email: impl Into<String>, private_key: impl AsRef<str>) -> Self {
        Self {
            client_email: client_email.into().trim().to_string(),
            private_key: private_key.as_ref().replace("\\n", "\n"),
        }
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    pub fn private_key(&self) -> &str {
        &self.private_key
    }
}

impl fmt::Debug for ServiceAccountCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountCredentials")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

struct CachedToken {
    value: String,
    refresh_after: DateTime<Utc>,
}

/// Issues bearer tokens for Sheets requests.
pub struct ServiceAccountAuth {
    client_email: String,
    encoding_key: EncodingKey,
    client: reqwest::Client,
    token_uri: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn new(credentials: &ServiceAccountCredentials, client: reqwest::Client) -> Result<Self> {
        if credentials.client_email().is_empty() {
            return Err(SheetsError::Auth(
                "service account email is empty".to_string(),
            ));
        }

        let encoding_key = EncodingKey::from_rsa_pem(credentials.private_key().as_bytes())
            .map_err(|e| SheetsError::Auth(format!("invalid private key: {}", e)))?;

        Ok(Self {
            client_email: credentials.client_email().to_string(),
            encoding_key,
            client,
            token_uri: TOKEN_URI.to_string(),
            cached: Mutex::new(None),
        })
    }

    /// Exchange assertions at a different endpoint.
    pub fn with_token_uri(mut self, token_uri: impl Into<String>) -> Self {
        self.token_uri = token_uri.into();
        self
    }

    fn claims(&self, now: DateTime<Utc>) -> Claims {
        let iat = now.timestamp();
        Claims {
            iss: self.client_email.clone(),
            scope: SPREADSHEETS_SCOPE.to_string(),
            aud: self.token_uri.clone(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        }
    }

    fn signed_assertion(&self, now: DateTime<Utc>) -> Result<String> {
        encode(
            &Header::new(Algorithm::RS256),
            &self.claims(now),
            &self.encoding_key,
        )
        .map_err(|e| SheetsError::Auth(format!("failed to sign assertion: {}", e)))
    }

    /// A valid access token, fetching a new one when the cached token is
    /// missing or about to expire.
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref() {
            if now < token.refresh_after {
                return Ok(token.value.clone());
            }
        }

        let token = self.fetch_token(now).await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn fetch_token(&self, now: DateTime<Utc>) -> Result<CachedToken> {
        debug!("Requesting access token for {}", self.client_email);

        let assertion = self.signed_assertion(now)?;
        let response = self
            .client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => err.error_description.unwrap_or(err.error),
                Err(_) => format!("HTTP {}", status),
            };
            return Err(SheetsError::Auth(message));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| SheetsError::Decode(format!("token response: {}", e)))?;

        Ok(CachedToken {
            value: token.access_token,
            refresh_after: refresh_after(now, token.expires_in),
        })
    }
}

/// When a token granted at `now` should be replaced. `expires_in` comes from
/// the token endpoint and is bounded to a day so a bad value cannot overflow.
fn refresh_after(now: DateTime<Utc>, expires_in: Option<i64>) -> DateTime<Utc> {
    let lifetime = expires_in
        .unwrap_or(ASSERTION_LIFETIME_SECS)
        .clamp(0, MAX_TOKEN_LIFETIME_SECS);
    now + Duration::seconds((lifetime - REFRESH_MARGIN_SECS).max(0))
}
