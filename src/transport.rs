use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};

use crate::error::{Error, TransportError};

/// One fully assembled wire exchange, ready to dispatch.
#[derive(Debug, Clone)]
pub struct TransportCall {
    pub url: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// Raw result of a completed exchange.
///
/// A non-2xx status is not a transport failure: the service reports its
/// errors inside the response envelope, so the body is handed to the
/// unwrap step regardless of status code.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Transport seam between the engine and the network.
///
/// The default implementation is [`ReqwestTransport`]; tests inject stubs
/// to script exchange outcomes without a listening server.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn dispatch(&self, call: TransportCall) -> Result<RawResponse, TransportError>;
}

/// Default transport backed by `reqwest`.
///
/// Peer certificate verification and the request timeout are fixed at
/// construction; the service contract has no per-call transport knobs.
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(verify_peer: bool, timeout: Option<Duration>) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        if !verify_peer {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http_client = builder
            .build()
            .map_err(|e| Error::Configuration(e.to_string()))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn dispatch(&self, call: TransportCall) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .http_client
            .request(call.method, &call.url)
            .headers(call.headers);

        if let Some(body) = call.body {
            builder = builder.body(body);
        }

        let resp = builder.send().await.map_err(map_reqwest_error)?;
        let status = resp.status();
        let body = resp.bytes().await.map_err(map_reqwest_error)?;

        Ok(RawResponse { status, body })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else if err.is_connect() {
        TransportError::Connection(err.to_string())
    } else {
        TransportError::Http(err.to_string())
    }
}
