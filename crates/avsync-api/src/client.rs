//! HTTP client for the Avito REST API.
//!
//! Wraps `reqwest` with Avito-specific error handling, bearer-token
//! authentication, token-bucket pacing and transport retries. Every response
//! is checked for a non-200 status and for an `error` field in the JSON body;
//! both surface as [`AvitoError::Api`].

use std::time::Duration;

use avsync_core::AppConfig;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::{Credentials, Session};
use crate::error::AvitoError;
use crate::rate_limit::RequestPacer;
use crate::retry::retry_with_backoff;

const DEFAULT_BASE_URL: &str = "https://api.avito.ru/";

/// Longest slice of a failing response body carried in an error message.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Transport settings shared by every client built during a run.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub requests_per_minute: u32,
    pub request_burst: u32,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout_secs: 30,
            user_agent: "avsync/0.1 (stats-sync)".to_owned(),
            requests_per_minute: 60,
            request_burst: 1,
            max_retries: 3,
            retry_backoff_base_ms: 1_000,
        }
    }
}

impl ClientSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.api_base_url.clone(),
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            requests_per_minute: config.requests_per_minute,
            request_burst: config.request_burst,
            max_retries: config.max_retries,
            retry_backoff_base_ms: config.retry_backoff_base_ms,
        }
    }
}

/// Unauthenticated request plumbing: HTTP client, base URL, pacer, retries.
pub(crate) struct Transport {
    http: Client,
    base_url: Url,
    pacer: RequestPacer,
    max_retries: u32,
    retry_backoff_base_ms: u64,
}

impl Transport {
    fn new(settings: &ClientSettings) -> Result<Self, AvitoError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(settings.user_agent.as_str())
            .build()?;

        // Exactly one trailing slash so relative joins append to the path.
        let normalised = format!("{}/", settings.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| AvitoError::InvalidBaseUrl {
            base_url: settings.base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            http,
            base_url,
            pacer: RequestPacer::new(settings.requests_per_minute, settings.request_burst),
            max_retries: settings.max_retries,
            retry_backoff_base_ms: settings.retry_backoff_base_ms,
        })
    }

    fn url(&self, path: &str) -> Result<Url, AvitoError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| AvitoError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: format!("cannot join path '{path}': {e}"),
            })
    }

    /// Sends the request produced by `build`, paced and retried, and returns
    /// the checked JSON body.
    pub(crate) async fn execute<F>(&self, path: &str, build: F) -> Result<serde_json::Value, AvitoError>
    where
        F: Fn(&Client, Url) -> RequestBuilder,
    {
        let url = self.url(path)?;
        retry_with_backoff(self.max_retries, self.retry_backoff_base_ms, || {
            let request = build(&self.http, url.clone());
            let url = url.clone();
            async move {
                self.pacer.until_ready().await;
                let response = request.send().await?;
                read_checked_body(&url, response).await
            }
        })
        .await
    }
}

/// Reads a response and applies the upstream's failure rules: non-200 status
/// or a non-null `error` field in the body.
async fn read_checked_body(url: &Url, response: Response) -> Result<serde_json::Value, AvitoError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok());
        return Err(AvitoError::RateLimited {
            url: url.to_string(),
            retry_after_secs,
        });
    }

    let body = response.text().await?;
    let parsed = serde_json::from_str::<serde_json::Value>(&body);

    if status != StatusCode::OK {
        return Err(AvitoError::Api {
            url: url.to_string(),
            status: status.as_u16(),
            message: parsed
                .ok()
                .and_then(|v| describe_error(&v))
                .unwrap_or_else(|| truncate(&body)),
        });
    }

    let value = parsed.map_err(|e| AvitoError::Deserialize {
        context: url.to_string(),
        source: e,
    })?;

    if let Some(message) = describe_error(&value) {
        return Err(AvitoError::Api {
            url: url.to_string(),
            status: status.as_u16(),
            message,
        });
    }

    Ok(value)
}

/// Extracts a readable message from an `error` field, if the body has one.
///
/// The upstream uses both `{"error": "invalid_client", "error_description": ..}`
/// and `{"error": {"code": 403, "message": ..}}`.
fn describe_error(body: &serde_json::Value) -> Option<String> {
    let error = body.get("error").filter(|e| !e.is_null())?;
    let message = match error {
        serde_json::Value::String(code) => match body
            .get("error_description")
            .and_then(serde_json::Value::as_str)
        {
            Some(description) => format!("{code}: {description}"),
            None => code.clone(),
        },
        serde_json::Value::Object(map) => map
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map_or_else(|| error.to_string(), str::to_owned),
        other => other.to_string(),
    };
    Some(message)
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

fn decode<T: DeserializeOwned>(body: serde_json::Value, context: &str) -> Result<T, AvitoError> {
    serde_json::from_value(body).map_err(|e| AvitoError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}

/// Authenticated client for one seller profile.
///
/// Use [`AvitoClient::authenticate`] in production, or
/// [`AvitoClient::with_session`] when a token is already at hand.
pub struct AvitoClient {
    transport: Transport,
    session: Session,
}

impl AvitoClient {
    /// Obtains a token for `credentials` and returns a client bound to it.
    ///
    /// # Errors
    ///
    /// - [`AvitoError::Auth`] if the credentials are blank or rejected.
    /// - [`AvitoError::InvalidBaseUrl`] if `settings.base_url` does not parse.
    /// - [`AvitoError::Http`] / [`AvitoError::Api`] on transport or server failure.
    pub async fn authenticate(
        settings: &ClientSettings,
        credentials: &Credentials,
    ) -> Result<Self, AvitoError> {
        let transport = Transport::new(settings)?;
        let session = transport.request_token(credentials).await?;
        Ok(Self { transport, session })
    }

    /// Builds a client around an existing session without calling `/token`.
    ///
    /// # Errors
    ///
    /// Returns [`AvitoError::Http`] if the `reqwest::Client` cannot be built
    /// or [`AvitoError::InvalidBaseUrl`] if the base URL does not parse.
    pub fn with_session(settings: &ClientSettings, session: Session) -> Result<Self, AvitoError> {
        Ok(Self {
            transport: Transport::new(settings)?,
            session,
        })
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        context: &str,
    ) -> Result<T, AvitoError> {
        let body = self
            .transport
            .execute(path, |http, url| {
                http.get(url).bearer_auth(self.session.bearer()).query(query)
            })
            .await?;
        decode(body, context)
    }

    pub(crate) async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        payload: &B,
        context: &str,
    ) -> Result<T, AvitoError> {
        let body = self
            .transport
            .execute(path, |http, url| {
                http.post(url).bearer_auth(self.session.bearer()).json(payload)
            })
            .await?;
        decode(body, context)
    }
}
