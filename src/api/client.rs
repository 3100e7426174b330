// ABOUTME: salt-api session client parameterized by authentication state.
// ABOUTME: Logs in for a token, then sends lowstate commands with it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use super::endpoint::{Endpoint, LOGIN_PATH, RUN_PATH};
use super::error::{ApiError, Result};
use super::login::{Credentials, token_from_login};
use super::request::CommandRequest;
use super::state::{Authenticated, Unauthenticated};
use super::transport::{FormPost, HttpResponse, HyperTransport, Transport};
use crate::types::SessionToken;

pub const HEADER_AUTH_TOKEN: &str = "X-Auth-Token";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_ACCEPT: &str = "Accept";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const JSON_ACCEPT: &str = "application/json";

/// Result type for `login`: on failure the unauthenticated client comes back.
pub type LoginResult =
    std::result::Result<SaltClient<Authenticated>, (SaltClient<Unauthenticated>, ApiError)>;

/// Client for one salt-api endpoint, parameterized by its session state.
///
/// Commands can only be sent once a token is attached:
///
/// ```compile_fail
/// use saltrun::api::SaltClient;
///
/// async fn run() {
///     let client = SaltClient::new("https://localhost", "443").unwrap();
///     // ERROR: execute() doesn't exist on SaltClient<Unauthenticated>
///     client.execute("*", "test.ping", "").await;
/// }
/// ```
pub struct SaltClient<S> {
    endpoint: Endpoint,
    transport: Arc<dyn Transport>,
    timeout: Option<Duration>,
    state: S,
}

impl<S: fmt::Debug> fmt::Debug for SaltClient<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaltClient")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("state", &self.state)
            .finish()
    }
}

/// Raw body of a command response. Interpreting it is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult(Bytes);

impl CommandResult {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl SaltClient<Unauthenticated> {
    /// Create a client for `hostname` (with scheme) and `port`.
    ///
    /// TLS certificates are not verified. No network I/O happens here.
    pub fn new(hostname: &str, port: &str) -> Result<Self> {
        let endpoint = Endpoint::parse(hostname, port)?;
        if endpoint.is_tls() {
            tracing::warn!(
                "TLS certificate verification is disabled for {}",
                endpoint
            );
        }
        let transport = HyperTransport::insecure()?;
        Ok(Self::with_transport(endpoint, Arc::new(transport)))
    }

    /// Create a client that sends requests through `transport`.
    pub fn with_transport(endpoint: Endpoint, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint,
            transport,
            timeout: None,
            state: Unauthenticated,
        }
    }

    /// Exchange credentials for a session token.
    ///
    /// # Errors
    ///
    /// - `ApiError::Transport` if the request could not be sent or read.
    /// - `ApiError::HttpStatus` for any status other than 200.
    /// - `ApiError::Protocol` if the body has no usable token.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<SessionToken> {
        tracing::debug!(
            user = credentials.username(),
            eauth = credentials.eauth(),
            "logging in to {}",
            self.endpoint.url(LOGIN_PATH)
        );

        let request = FormPost {
            path: LOGIN_PATH,
            headers: vec![
                (HEADER_CONTENT_TYPE, FORM_CONTENT_TYPE.to_string()),
                (HEADER_ACCEPT, JSON_ACCEPT.to_string()),
            ],
            body: credentials.to_form(),
        };

        let response = self.send(request).await?;
        token_from_login(&response.body)
    }

    /// Store a token obtained earlier. The token is not checked.
    pub fn attach_token(self, token: SessionToken) -> SaltClient<Authenticated> {
        SaltClient {
            endpoint: self.endpoint,
            transport: self.transport,
            timeout: self.timeout,
            state: Authenticated::new(token),
        }
    }

    /// Authenticate and attach the resulting token.
    pub async fn login(self, credentials: &Credentials) -> LoginResult {
        match self.authenticate(credentials).await {
            Ok(token) => Ok(self.attach_token(token)),
            Err(e) => Err((self, e)),
        }
    }
}

impl SaltClient<Authenticated> {
    pub fn token(&self) -> &SessionToken {
        self.state.token()
    }

    /// Run `function` on the minions matched by `target`.
    ///
    /// An empty `arguments` string sends no `arg` field at all.
    pub async fn execute(
        &self,
        target: &str,
        function: &str,
        arguments: &str,
    ) -> Result<CommandResult> {
        self.execute_request(&CommandRequest::new(target, function, arguments))
            .await
    }

    /// Send a prepared command and return the raw response body.
    ///
    /// # Errors
    ///
    /// - `ApiError::Transport` if the request could not be sent or read.
    /// - `ApiError::HttpStatus` for any status other than 200, including an
    ///   expired or rejected token.
    pub async fn execute_request(&self, command: &CommandRequest) -> Result<CommandResult> {
        tracing::debug!(
            target_minions = command.target(),
            function = command.function(),
            "running command via {}",
            self.endpoint.url(RUN_PATH)
        );

        let request = FormPost {
            path: RUN_PATH,
            headers: vec![
                (HEADER_AUTH_TOKEN, self.token().as_str().to_string()),
                (HEADER_CONTENT_TYPE, FORM_CONTENT_TYPE.to_string()),
                (HEADER_ACCEPT, JSON_ACCEPT.to_string()),
            ],
            body: command.to_form(),
        };

        let response = self.send(request).await?;
        Ok(CommandResult(response.body))
    }
}

impl<S> SaltClient<S> {
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Bound every request by `timeout`. Without one, calls wait indefinitely.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn send(&self, request: FormPost) -> Result<HttpResponse> {
        let call = self.transport.post(&self.endpoint, request);
        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ApiError::Timeout(limit))??,
            None => call.await?,
        };

        if response.status != 200 {
            tracing::debug!(
                status = response.status,
                body = %String::from_utf8_lossy(&response.body),
                "salt-api rejected request"
            );
            return Err(ApiError::HttpStatus {
                status: response.status,
            });
        }

        Ok(response)
    }
}
