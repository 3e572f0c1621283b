//! Service-account authentication for the Sheets API.
//!
//! Uses the OAuth 2.0 JWT bearer grant: an RS256-signed assertion naming the
//! service account is exchanged at the token endpoint for a short-lived
//! access token.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::error::{decode_err, http_err};
use crate::SyncError;

pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Bearer token for API calls. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub(crate) fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// Service-account identity: client email plus PEM private key.
#[derive(Clone)]
pub struct ServiceAccount {
    email: String,
    private_key: String,
}

impl fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl ServiceAccount {
    /// Keys copied into CI secrets often carry literal `\n` sequences in
    /// place of newlines; those are restored here.
    pub fn new(email: impl Into<String>, private_key: impl AsRef<str>) -> Self {
        Self {
            email: email.into(),
            private_key: private_key.as_ref().replace("\\n", "\n"),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Claims for an assertion issued at `now` and addressed to `audience`.
    pub fn claims(&self, audience: &str, now: DateTime<Utc>) -> Claims {
        Claims {
            iss: self.email.clone(),
            scope: SPREADSHEETS_SCOPE.to_string(),
            aud: audience.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ASSERTION_LIFETIME_SECS)).timestamp(),
        }
    }

    /// Signed JWT assertion for the token exchange.
    pub fn assertion(&self, audience: &str, now: DateTime<Utc>) -> Result<String, SyncError> {
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())?;
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &self.claims(audience, now),
            &key,
        )?;
        Ok(token)
    }

    /// Exchange a fresh assertion for an access token at `token_url`.
    pub fn fetch_token(
        &self,
        agent: &ureq::Agent,
        token_url: &str,
    ) -> Result<AccessToken, SyncError> {
        let assertion = self.assertion(token_url, Utc::now())?;
        let context = "requesting access token";
        let response = agent
            .post(token_url)
            .send_form(&[
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion.as_str()),
            ])
            .map_err(|e| http_err(context, e))?;
        let body: TokenResponse = response.into_json().map_err(|e| decode_err(context, e))?;
        tracing::debug!("obtained access token for {}", self.email);
        Ok(AccessToken(body.access_token))
    }
}
