use crate::BoxError;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

mod http;
pub use http::{HttpError, HttpTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };

        f.write_str(s)
    }
}

/// A fully shaped REST call: the path is relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Request {
        Request {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Request {
        self.body = Some(body);
        self
    }
}

/// Performs the network call for a built request. Returns the decoded response body, or `None`
/// when the platform answered without one.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<Option<Value>, BoxError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: Request) -> Result<Option<Value>, BoxError> {
        (**self).send(request).await
    }
}
