// ABOUTME: HTTP transport for salt-api requests over hyper.
// ABOUTME: TLS accepts any server certificate; salt masters commonly run self-signed.

use super::endpoint::Endpoint;
use super::error::{ApiError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, verify_tls12_signature, verify_tls13_signature};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

/// A form-encoded POST to a route on the endpoint.
#[derive(Debug, Clone)]
pub struct FormPost {
    pub path: &'static str,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

/// Status and fully-read body of a response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

/// Sends a single request and reads the whole response.
///
/// Implementations must release the connection before returning, on success
/// and on failure.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, endpoint: &Endpoint, request: FormPost) -> Result<HttpResponse>;
}

/// hyper HTTP/1.1 transport, one connection per request.
pub struct HyperTransport {
    tls: TlsConnector,
}

impl HyperTransport {
    /// Build a transport whose TLS layer skips certificate verification.
    pub fn insecure() -> Result<Self> {
        let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
        let config = ClientConfig::builder_with_provider(Arc::clone(&provider))
            .with_safe_default_protocol_versions()
            .map_err(|e| ApiError::TlsSetup(e.to_string()))?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate { provider }))
            .with_no_client_auth();

        Ok(Self {
            tls: TlsConnector::from(Arc::new(config)),
        })
    }
}

#[async_trait]
impl Transport for HyperTransport {
    async fn post(&self, endpoint: &Endpoint, request: FormPost) -> Result<HttpResponse> {
        let tcp = TcpStream::connect((endpoint.bare_host(), endpoint.port()))
            .await
            .map_err(|e| {
                ApiError::Transport(format!("failed to connect to {}: {}", endpoint.authority(), e))
            })?;

        if endpoint.is_tls() {
            let server_name = ServerName::try_from(endpoint.bare_host().to_string())
                .map_err(|e| ApiError::Transport(format!("invalid TLS server name: {e}")))?;
            let tls = self.tls.connect(server_name, tcp).await.map_err(|e| {
                ApiError::Transport(format!(
                    "TLS handshake with {} failed: {}",
                    endpoint.authority(),
                    e
                ))
            })?;
            send_over(TokioIo::new(tls), endpoint, request).await
        } else {
            send_over(TokioIo::new(tcp), endpoint, request).await
        }
    }
}

async fn send_over<I>(io: I, endpoint: &Endpoint, request: FormPost) -> Result<HttpResponse>
where
    I: hyper::rt::Read + hyper::rt::Write + Unpin + Send + 'static,
{
    let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
        .await
        .map_err(|e| ApiError::Transport(format!("HTTP handshake failed: {e}")))?;

    // Finishes once the sender and response are dropped.
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!("salt-api connection error: {}", e);
        }
    });

    let mut builder = hyper::Request::builder()
        .method(hyper::Method::POST)
        .uri(request.path)
        .header(hyper::header::HOST, endpoint.authority());
    for (name, value) in &request.headers {
        builder = builder.header(*name, value.as_str());
    }
    let req = builder
        .body(Full::new(Bytes::from(request.body)))
        .map_err(|e| ApiError::Transport(format!("failed to build request: {e}")))?;

    let resp = sender
        .send_request(req)
        .await
        .map_err(|e| ApiError::Transport(format!("request failed: {e}")))?;

    let status = resp.status().as_u16();
    let body = resp
        .into_body()
        .collect()
        .await
        .map_err(|e| ApiError::Transport(format!("failed to read response: {e}")))?
        .to_bytes();

    Ok(HttpResponse { status, body })
}

/// Certificate verifier that trusts every server certificate.
///
/// Handshake signatures are still checked so the peer must hold the key for
/// the certificate it presents.
#[derive(Debug)]
struct AcceptAnyCertificate {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
