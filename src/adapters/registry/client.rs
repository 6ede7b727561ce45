//! Remote registry HTTP client
//!
//! Thin transport layer over reqwest. The client performs authenticated
//! requests and hands the raw status/body/headers back to the polling
//! engine; classifying HTTP error statuses into case transitions is engine
//! logic, not transport logic, so no status is treated as an error here.
//! Only transport-level failures (connect, timeout, TLS, body read) surface
//! as [`RegistryError::Transport`].

use crate::config::RegistryConfig;
use crate::domain::errors::RegistryError;
use crate::domain::fhir::Parameters;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use std::time::Duration;

const FHIR_JSON: &str = "application/fhir+json";

/// Join a server host and an API path with exactly one `/` separator.
///
/// Tolerates any combination of trailing slash on the host and leading
/// slash on the path.
pub fn join_endpoint(server_host: &str, api_point: &str) -> String {
    format!(
        "{}/{}",
        server_host.trim_end_matches('/'),
        api_point.trim_start_matches('/')
    )
}

/// Response from the remote registry
///
/// Carries everything the polling engine needs to classify the outcome:
/// the HTTP status, the raw body, and the Location header (set by the
/// submission endpoint to point at the job status URL).
#[derive(Debug, Clone)]
pub struct RegistryResponse {
    pub status: StatusCode,
    pub body: String,
    pub location: Option<String>,
}

impl RegistryResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }
}

/// HTTP client for the remote registry job-processing API
pub struct RegistryClient {
    client: Client,
    auth_header: String,
}

impl RegistryClient {
    /// Create a new registry client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let mut builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds));

        if !config.tls_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| RegistryError::InvalidRequest(e.to_string()))?;

        let credentials = format!(
            "{}:{}",
            config.username,
            config.password.expose_secret().as_ref()
        );
        let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());

        Ok(Self {
            client,
            auth_header: format!("Basic {encoded}"),
        })
    }

    /// GET a job status endpoint
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Transport`] on network-level failure; HTTP
    /// error statuses are returned as ordinary responses.
    pub async fn poll_job_status(&self, endpoint: &str) -> Result<RegistryResponse, RegistryError> {
        tracing::debug!(endpoint = %endpoint, "Polling remote job status");

        let response = self
            .client
            .get(endpoint)
            .header("Authorization", &self.auth_header)
            .header("Accept", FHIR_JSON)
            .send()
            .await
            .map_err(|e| RegistryError::Transport(e.to_string()))?;

        Self::into_registry_response(response).await
    }

    /// POST a job submission payload
    ///
    /// The payload is a FHIR Parameters resource carrying the patient
    /// identifier and the job package to run.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Transport`] on network-level failure.
    pub async fn submit_job(
        &self,
        endpoint: &str,
        payload: &Parameters,
    ) -> Result<RegistryResponse, RegistryError> {
        tracing::debug!(endpoint = %endpoint, "Submitting job request");

        let response = self
            .client
            .post(endpoint)
            .header("Authorization", &self.auth_header)
            .header("Accept", FHIR_JSON)
            .json(payload)
            .send()
            .await
            .map_err(|e| RegistryError::Transport(e.to_string()))?;

        Self::into_registry_response(response).await
    }

    async fn into_registry_response(
        response: reqwest::Response,
    ) -> Result<RegistryResponse, RegistryError> {
        let status = response.status();
        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let body = response
            .text()
            .await
            .map_err(|e| RegistryError::Transport(e.to_string()))?;

        Ok(RegistryResponse {
            status,
            body,
            location,
        })
    }
}
