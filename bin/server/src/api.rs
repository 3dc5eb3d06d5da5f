//! HTTP client for the external user API.
//!
//! Implements the platform-access service traits over `reqwest`. All calls
//! share one client with a request timeout, so a slow API always resolves to
//! a definite success or failure.

use async_trait::async_trait;
use rootcause::prelude::Report;
use serde::Deserialize;
use std::fmt;
use tourdesk_core::EmailAddress;
use tourdesk_platform_access::{
    AuthCheckRequest, AuthCheckResponse, AuthResult, AuthenticationError, ProfileService,
    ProfileUpdate, ProfileUpdateError, UserStatusService,
};
use tracing::{debug, error, instrument};

use crate::config::ApiConfig;

/// Header carrying the dashboard's API key.
const API_KEY_HEADER: &str = "X-API-Key";

/// Transport-level errors talking to the external API.
#[derive(Debug)]
pub enum ApiError {
    /// The HTTP client could not be constructed.
    ClientBuild { details: String },
    /// The request could not be sent, or timed out.
    Request { endpoint: String, details: String },
    /// The response body could not be decoded.
    InvalidBody { endpoint: String, details: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientBuild { details } => {
                write!(f, "failed to build API client: {details}")
            }
            Self::Request { endpoint, details } => {
                write!(f, "request to '{endpoint}' failed: {details}")
            }
            Self::InvalidBody { endpoint, details } => {
                write!(f, "invalid response body from '{endpoint}': {details}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// Body of the profile endpoint's reply.
#[derive(Debug, Default, Deserialize)]
struct ProfileResponse {
    #[serde(default)]
    error: Option<String>,
}

/// Client for the external user API.
#[derive(Clone)]
pub struct HubApiClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl HubApiClient {
    /// Creates a client using the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, Report<ApiError>> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::ClientBuild {
                details: e.to_string(),
            })?;

        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        format!("{base}{path}")
    }

    /// Posts a user-status check and returns the raw status and body.
    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn post_auth_check(
        &self,
        request: &AuthCheckRequest,
    ) -> Result<(u16, AuthCheckResponse), Report<ApiError>> {
        let endpoint = self.url(&self.config.auth_check_path);

        let response = self
            .http
            .post(&endpoint)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::Request {
                endpoint: endpoint.clone(),
                details: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body = response
            .json::<AuthCheckResponse>()
            .await
            .map_err(|e| ApiError::InvalidBody {
                endpoint: endpoint.clone(),
                details: e.to_string(),
            })?;

        debug!(status, "User-status check answered");
        Ok((status, body))
    }
}

impl fmt::Debug for HubApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubApiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl UserStatusService for HubApiClient {
    async fn check(&self, request: &AuthCheckRequest) -> Result<AuthResult, AuthenticationError> {
        let (status, body) = self.post_auth_check(request).await.map_err(|report| {
            error!(email = %request.email, error = %report, "Error checking user status");
            AuthenticationError::UpstreamUnreachable {
                details: report.to_string(),
            }
        })?;

        if !(200..300).contains(&status) {
            error!(
                email = %request.email,
                status,
                error = body.error.as_deref().unwrap_or_default(),
                "User-status check denied"
            );
        }

        Ok(AuthResult::from_response(status, body))
    }
}

#[async_trait]
impl ProfileService for HubApiClient {
    #[instrument(skip(self, update), fields(email = %email))]
    async fn update_profile(
        &self,
        email: &EmailAddress,
        update: &ProfileUpdate,
    ) -> Result<(), ProfileUpdateError> {
        let endpoint = self.url(&self.config.profile_path);

        let response = self
            .http
            .put(&endpoint)
            .header(API_KEY_HEADER, &self.config.api_key)
            .bearer_auth(email.as_str())
            .json(update)
            .send()
            .await
            .map_err(|e| ProfileUpdateError::RequestFailed {
                details: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ProfileResponse>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| status.to_string());
            return Err(ProfileUpdateError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        debug!("Profile updated");
        Ok(())
    }
}
