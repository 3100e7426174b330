// ABOUTME: salt-api client: login for a session token, then run one command.
// ABOUTME: Exports the type-state client, request types, and errors.

mod client;
mod endpoint;
mod error;
mod login;
mod request;
mod state;
mod transport;

pub use client::{
    CommandResult, FORM_CONTENT_TYPE, HEADER_ACCEPT, HEADER_AUTH_TOKEN, HEADER_CONTENT_TYPE,
    JSON_ACCEPT, LoginResult, SaltClient,
};
pub use endpoint::{Endpoint, LOGIN_PATH, RUN_PATH, Scheme};
pub use error::{ApiError, ApiErrorKind, Result};
pub use login::{Credentials, LoginRecord, LoginResponse, token_from_login};
pub use request::{CLIENT_LOCAL, CommandRequest};
pub use state::{Authenticated, Unauthenticated};
pub use transport::{FormPost, HttpResponse, HyperTransport, Transport};
