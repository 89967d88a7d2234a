use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, ConfigError, FetchError};

pub(crate) const BASE_URL: &str = "https://api.monarchmoney.com";
pub(crate) const RETRY_DELAY: Duration = Duration::from_secs(2);

const LOGIN_PATH: &str = "/auth/login/";
const GRAPHQL_PATH: &str = "/graphql";

/// Login credentials. These live for one process invocation and are never
/// persisted anywhere.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub mfa_token: Option<String>,
}

impl fmt::Debug for Credentials {
    // Keeps the password and the one-time code out of log output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("mfa_token", &self.mfa_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A Monarch Money session: HTTP client plus the authorization token from
/// the last successful login. One per run, never reused across runs.
pub struct Monarch {
    http: reqwest::Client,
    base_url: String,
    retry_delay: Duration,
    credentials: Credentials,
    token: Option<String>,
}

impl Monarch {
    /// A fresh unauthenticated session against the given server root.
    /// Nothing is sent until [login](Self::login).
    pub fn with_base_url(
        credentials: Credentials,
        base_url: impl Into<String>,
        timeout: Duration,
        retry_delay: Duration,
    ) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            retry_delay,
            credentials,
            token: None,
        })
    }

    pub fn set_mfa_token(&mut self, token: String) {
        self.credentials.mfa_token = Some(token);
    }

    /// Establish a fresh session. Any previously held token is discarded
    /// first so a stale session cannot leak into the new login.
    pub async fn login(&mut self) -> Result<(), AuthError> {
        log::info!("Logging in...");
        self.token = None;
        let request = LoginRequest {
            username: &self.credentials.username,
            password: &self.credentials.password,
            trusted_device: false,
            supports_mfa: true,
            totp: self.credentials.mfa_token.as_deref(),
        };
        let response = self
            .http
            .post(format!("{}{}", self.base_url, LOGIN_PATH))
            .header("Client-Platform", "web")
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        if status == reqwest::StatusCode::OK {
            let body: LoginResponse = response.json().await.map_err(AuthError::Decode)?;
            self.token = Some(body.token);
            log::info!("Logging in...done");
            return Ok(());
        }
        if status == reqwest::StatusCode::FORBIDDEN {
            if self.credentials.mfa_token.is_some() {
                return Err(AuthError::MfaRejected);
            }
            return Err(AuthError::MfaRequired);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AuthError::BadCredentials);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AuthError::EndpointMoved);
        }
        Err(AuthError::Http { status })
    }

    /// Run a GraphQL query against the session, retrying once. A 401 gets
    /// a fresh login first since the service expires tokens, a transient
    /// failure gets a short delay. The second attempt's result is final.
    pub(crate) async fn graphql<T: DeserializeOwned>(
        &mut self,
        operation: &'static str,
        query: &'static str,
        variables: serde_json::Value,
    ) -> Result<T, FetchError> {
        let err = match self.graphql_once(operation, query, &variables).await {
            Ok(data) => return Ok(data),
            Err(err) => err,
        };
        if err.is_unauthorized() {
            log::info!("{operation}: session expired, logging in again");
            self.login()
                .await
                .map_err(|source| FetchError::Reauth { source })?;
        } else if err.is_transient() {
            log::warn!("{operation} failed, retrying once: {err}");
            tokio::time::sleep(self.retry_delay).await;
        } else {
            return Err(err);
        }
        self.graphql_once(operation, query, &variables).await
    }

    async fn graphql_once<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        query: &'static str,
        variables: &serde_json::Value,
    ) -> Result<T, FetchError> {
        let request = GraphqlRequest {
            operation_name: operation,
            query,
            variables,
        };
        let mut builder = self
            .http
            .post(format!("{}{}", self.base_url, GRAPHQL_PATH))
            .header("Client-Platform", "web")
            .json(&request);
        if let Some(token) = &self.token {
            builder = builder.header("Authorization", format!("Token {token}"));
        }
        let response = builder
            .send()
            .await
            .map_err(|source| FetchError::Network { operation, source })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { operation, status });
        }
        let body: GraphqlResponse<T> = response
            .json()
            .await
            .map_err(|source| FetchError::Decode { operation, source })?;
        if !body.errors.is_empty() {
            return Err(FetchError::Graphql {
                operation,
                messages: body.errors.into_iter().map(|error| error.message).collect(),
            });
        }
        body.data.ok_or(FetchError::MissingData { operation })
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    trusted_device: bool,
    supports_mfa: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    totp: Option<&'a str>,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlRequest<'a> {
    operation_name: &'a str,
    query: &'a str,
    variables: &'a serde_json::Value,
}

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}
