use std::future::Future;
use std::time::Duration;

use log::debug;
use reqwest::{Client, Url};

use crate::error::{ClientError, Result};
use crate::models::{ApiErrorBody, SolveReply, SolveRequest};

/// Path of the solve endpoint relative to the service base URL.
pub const SOLVE_PATH: &str = "api/solve/";

const GENERIC_API_ERROR: &str = "Something went wrong.";

/// The request/response exchange with the solve service.
pub trait SolveTransport {
    fn solve(&self, request: &SolveRequest) -> impl Future<Output = Result<SolveReply>> + Send;
}

/// HTTP client for the solve service
#[derive(Debug, Clone)]
pub struct SolverClient {
    client: Client,
    solve_url: Url,
}

impl SolverClient {
    /// Create a new client
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the service (e.g., "http://127.0.0.1:8000/")
    ///
    /// # Example
    ///
    /// ```no_run
    /// use lp_workbench::SolverClient;
    ///
    /// let client = SolverClient::new("http://127.0.0.1:8000/").unwrap();
    /// ```
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_client(base_url, Client::new())
    }

    /// Create a client whose requests give up after `timeout`
    pub fn with_timeout(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Connection)?;
        Self::with_client(base_url, client)
    }

    /// Create a client with a custom reqwest client
    ///
    /// This allows you to configure timeouts, proxies, etc.
    pub fn with_client(base_url: impl AsRef<str>, client: Client) -> Result<Self> {
        let mut base = base_url.as_ref().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let solve_url = Url::parse(&base)
            .and_then(|u| u.join(SOLVE_PATH))
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        Ok(Self { client, solve_url })
    }

    pub fn solve_url(&self) -> &Url {
        &self.solve_url
    }

    /// Send one solve request.
    ///
    /// A non-success status is turned into [`ClientError::Api`] carrying the
    /// body's `error` text; no response at all is [`ClientError::Connection`].
    pub async fn solve(&self, request: &SolveRequest) -> Result<SolveReply> {
        debug!("POST {} method={}", self.solve_url, request.method);
        let response = self
            .client
            .post(self.solve_url.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| GENERIC_API_ERROR.to_string());
            debug!("solve failed with {}: {}", status, message);
            return Err(ClientError::Api(message));
        }

        Ok(response.json::<SolveReply>().await?)
    }
}

impl SolveTransport for SolverClient {
    fn solve(&self, request: &SolveRequest) -> impl Future<Output = Result<SolveReply>> + Send {
        SolverClient::solve(self, request)
    }
}
