// ABOUTME: Credential exchange with the salt-api login route.
// ABOUTME: Builds the login form and extracts the session token from the reply.

use super::error::{ApiError, Result};
use super::request::encode_form;
use crate::types::SessionToken;
use serde::Deserialize;
use std::fmt;

/// Username, password and auth backend for a single login.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
    eauth: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        eauth: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            eauth: eauth.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn eauth(&self) -> &str {
        &self.eauth
    }

    /// Form body for the login route.
    pub(crate) fn to_form(&self) -> String {
        encode_form(&[
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
            ("eauth", self.eauth.as_str()),
        ])
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("eauth", &self.eauth)
            .finish()
    }
}

/// Envelope returned by a successful login.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "return")]
    pub records: Vec<LoginRecord>,
}

/// One issued session.
#[derive(Debug, Deserialize)]
pub struct LoginRecord {
    pub token: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub eauth: String,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub expire: f64,
    #[serde(default)]
    pub perms: Vec<serde_json::Value>,
}

impl LoginResponse {
    pub fn parse(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| ApiError::Protocol(format!("malformed login response: {e}")))
    }

    /// The first issued session. An empty `return` list is a protocol error.
    pub fn first_record(&self) -> Result<&LoginRecord> {
        self.records
            .first()
            .ok_or_else(|| ApiError::Protocol("login response contained no sessions".to_string()))
    }
}

/// Extract the session token from a login response body.
pub fn token_from_login(body: &[u8]) -> Result<SessionToken> {
    let response = LoginResponse::parse(body)?;
    let record = response.first_record()?;

    tracing::debug!(
        user = %record.user,
        eauth = %record.eauth,
        expire = record.expire,
        perms = record.perms.len(),
        "session issued"
    );

    Ok(SessionToken::new(record.token.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiErrorKind;

    #[test]
    fn extracts_first_token() {
        let body = br#"{"return":[{"token":"abc123","user":"admin","eauth":"ldap","start":1.0,"expire":2.0,"perms":[]}]}"#;
        let token = token_from_login(body).unwrap();
        assert_eq!(token.as_str(), "abc123");
    }

    #[test]
    fn only_first_record_counts() {
        let body = br#"{"return":[{"token":"first"},{"token":"second"}]}"#;
        assert_eq!(token_from_login(body).unwrap().as_str(), "first");
    }

    #[test]
    fn empty_return_is_protocol_error() {
        let err = token_from_login(br#"{"return":[]}"#).unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::Protocol);
    }

    #[test]
    fn missing_token_is_protocol_error() {
        let err = token_from_login(br#"{"return":[{"user":"admin"}]}"#).unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::Protocol);
    }

    #[test]
    fn empty_token_is_returned_unchanged() {
        let token = token_from_login(br#"{"return":[{"token":""}]}"#).unwrap();
        assert!(token.is_empty());
    }

    #[test]
    fn non_json_body_is_protocol_error() {
        let err = token_from_login(b"<html>bad gateway</html>").unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::Protocol);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let body = br#"{"return":[{"token":"t","perms":[".*","@runner"],"extra":true}],"_links":{}}"#;
        assert_eq!(token_from_login(body).unwrap().as_str(), "t");
    }

    #[test]
    fn record_metadata_is_parsed() {
        let body = br#"{"return":[{"token":"t","user":"ops","eauth":"pam","start":10.5,"expire":20.5,"perms":[".*"]}]}"#;
        let response = LoginResponse::parse(body).unwrap();
        let record = response.first_record().unwrap();
        assert_eq!(record.user, "ops");
        assert_eq!(record.eauth, "pam");
        assert_eq!(record.expire, 20.5);
        assert_eq!(record.perms.len(), 1);
    }

    #[test]
    fn login_form_field_order() {
        let creds = Credentials::new("admin", "p@ss word", "ldap");
        assert_eq!(
            creds.to_form(),
            "username=admin&password=p%40ss+word&eauth=ldap"
        );
    }

    #[test]
    fn debug_redacts_password() {
        let creds = Credentials::new("admin", "hunter2", "ldap");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("\"admin\""));
        assert!(debug.contains("\"ldap\""));
    }
}
