// ABOUTME: hyper HTTP/1.1 server standing in for salt-api.
// ABOUTME: Replies with canned responses, optionally over self-signed TLS, and records requests.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::{CONNECTION, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

/// A request as seen by the server.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    /// Header names are lower-cased.
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Canned reply for one connection.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
}

impl MockResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }
}

pub const LOGIN_OK: &str = r#"{"return":[{"token":"abc123","user":"admin","eauth":"ldap","start":1.0,"expire":2.0,"perms":[]}]}"#;

#[derive(Debug, Clone)]
enum Reply {
    Respond(MockResponse),
    Stall(Duration),
}

type Recorded = Arc<Mutex<Vec<CapturedRequest>>>;

/// Serves one connection per scripted reply on a background runtime.
pub struct MockServer {
    addr: SocketAddr,
    scheme: &'static str,
    requests: Recorded,
}

impl MockServer {
    /// Plain HTTP, one connection per response, in order.
    pub fn start(responses: Vec<MockResponse>) -> Self {
        Self::spawn(responses.into_iter().map(Reply::Respond).collect(), None)
    }

    /// Like `start`, behind TLS with a freshly generated self-signed certificate.
    pub fn start_tls(responses: Vec<MockResponse>) -> Self {
        Self::spawn(
            responses.into_iter().map(Reply::Respond).collect(),
            Some(self_signed_acceptor()),
        )
    }

    /// Read the request, then hold the connection without answering.
    pub fn stalled(hold: Duration) -> Self {
        Self::spawn(vec![Reply::Stall(hold)], None)
    }

    fn spawn(replies: Vec<Reply>, tls: Option<TlsAcceptor>) -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        listener
            .set_nonblocking(true)
            .expect("non-blocking mock listener");
        let addr = listener.local_addr().expect("mock server address");
        let scheme = if tls.is_some() { "https" } else { "http" };
        let requests: Recorded = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("mock server runtime");
            runtime.block_on(async move {
                let listener = TcpListener::from_std(listener).expect("tokio mock listener");
                for reply in replies {
                    let Ok((stream, _)) = listener.accept().await else {
                        return;
                    };
                    match &tls {
                        Some(acceptor) => {
                            let Ok(stream) = acceptor.accept(stream).await else {
                                continue;
                            };
                            serve(TokioIo::new(stream), reply, Arc::clone(&recorded)).await;
                        }
                        None => serve(TokioIo::new(stream), reply, Arc::clone(&recorded)).await,
                    }
                }
            });
        });

        Self {
            addr,
            scheme,
            requests,
        }
    }

    pub fn host(&self) -> String {
        format!("{}://127.0.0.1", self.scheme)
    }

    pub fn port(&self) -> String {
        self.addr.port().to_string()
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn serve<I>(io: I, reply: Reply, recorded: Recorded)
where
    I: hyper::rt::Read + hyper::rt::Write + Unpin + Send + 'static,
{
    let service = service_fn(move |req: Request<Incoming>| {
        let reply = reply.clone();
        let recorded = Arc::clone(&recorded);
        async move {
            let captured = capture(req).await;
            recorded.lock().unwrap().push(captured);

            let response = match reply {
                Reply::Stall(hold) => {
                    tokio::time::sleep(hold).await;
                    Response::new(Full::new(Bytes::new()))
                }
                Reply::Respond(canned) => Response::builder()
                    .status(canned.status)
                    .header(CONTENT_TYPE, "application/json")
                    .header(CONNECTION, "close")
                    .body(Full::new(Bytes::from(canned.body)))
                    .expect("valid mock response"),
            };
            Ok::<_, Infallible>(response)
        }
    });

    if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
        tracing::debug!("mock server connection error: {}", e);
    }
}

async fn capture(req: Request<Incoming>) -> CapturedRequest {
    let (parts, body) = req.into_parts();
    let headers = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();
    let body = body
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .unwrap_or_default();

    CapturedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    }
}

/// TLS acceptor with a certificate no client trusts, for a name that is not the host.
fn self_signed_acceptor() -> TlsAcceptor {
    let rcgen::CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(vec!["salt.invalid".to_string()])
            .expect("generate self-signed certificate");
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der()));

    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
    let config = rustls::ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .expect("TLS protocol versions")
        .with_no_client_auth()
        .with_single_cert(vec![cert.der().clone()], key)
        .expect("server certificate");

    TlsAcceptor::from(Arc::new(config))
}
