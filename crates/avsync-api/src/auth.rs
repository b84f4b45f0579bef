//! Client-credentials authentication.
//!
//! A [`Session`] is obtained once per profile and handed to the client at
//! construction; it is never mutated afterwards.

use crate::client::Transport;
use crate::error::AvitoError;
use crate::types::TokenResponse;

const GRANT_TYPE: &str = "client_credentials";

/// Client id and secret from a profile row.
#[derive(Clone)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
}

impl Credentials {
    #[must_use]
    pub fn new(client_id: &str, client_secret: &str) -> Self {
        Self {
            client_id: client_id.trim().to_owned(),
            client_secret: client_secret.trim().to_owned(),
        }
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    fn validate(&self) -> Result<(), AvitoError> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(AvitoError::Auth(
                "client id and client secret must be non-empty".to_owned(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .finish()
    }
}

/// Opaque bearer token for one profile.
#[derive(Clone)]
pub struct Session {
    access_token: String,
}

impl Session {
    #[must_use]
    pub fn new(access_token: &str) -> Self {
        Self {
            access_token: access_token.trim().to_owned(),
        }
    }

    pub(crate) fn bearer(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[redacted]")
            .finish()
    }
}

impl Transport {
    /// Exchanges credentials for a bearer token at `POST /token`.
    ///
    /// Rejections (4xx, or an `error` field in the body) and blank
    /// credentials become [`AvitoError::Auth`]. Transport failures and 5xx
    /// responses are returned as-is: they say nothing about the credentials.
    pub(crate) async fn request_token(&self, credentials: &Credentials) -> Result<Session, AvitoError> {
        credentials.validate()?;

        let form = [
            ("grant_type", GRANT_TYPE),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ];

        let body = self
            .execute("token", |http, url| http.post(url).form(&form))
            .await
            .map_err(|e| match e {
                AvitoError::Api {
                    status, message, ..
                } if status < 500 => AvitoError::Auth(message),
                other => other,
            })?;

        let token: TokenResponse =
            serde_json::from_value(body).map_err(|e| AvitoError::Deserialize {
                context: "token response".to_owned(),
                source: e,
            })?;

        if token.access_token.trim().is_empty() {
            return Err(AvitoError::Auth(
                "token response carried no access_token".to_owned(),
            ));
        }

        tracing::debug!(
            client_id = %credentials.client_id,
            expires_in = ?token.expires_in,
            "obtained access token"
        );

        Ok(Session::new(&token.access_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_are_trimmed() {
        let creds = Credentials::new("  id ", " secret\n");
        assert_eq!(creds.client_id(), "id");
        assert!(creds.validate().is_ok());
    }

    #[test]
    fn blank_credentials_fail_validation() {
        let creds = Credentials::new("id", "   ");
        assert!(matches!(creds.validate(), Err(AvitoError::Auth(_))));
    }

    #[test]
    fn debug_never_prints_secrets() {
        let creds = Credentials::new("id", "top-secret");
        let session = Session::new("bearer-value");
        assert!(!format!("{creds:?}").contains("top-secret"));
        assert!(!format!("{session:?}").contains("bearer-value"));
    }
}
