use super::{Method, Request, Transport};
use crate::{BoxError, Config};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

#[derive(thiserror::Error, Debug)]
pub enum HttpError {
    #[error("Error during HTTP request: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("Error decoding response body: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Server returned {status}: {body}")]
    ResponseError { status: StatusCode, body: String },
}

impl<T> From<HttpError> for Result<T, HttpError> {
    fn from(e: HttpError) -> Self {
        Err(e)
    }
}

pub struct HttpTransport {
    base_url: String,
    bot_token: Option<String>,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<HttpTransport, HttpError> {
        let client = reqwest::ClientBuilder::new()
            .use_rustls_tls()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(HttpTransport::new_with_client(
            config.api_base_url.clone(),
            config.bot_token.clone(),
            client,
        ))
    }

    pub fn new_with_client(
        base_url: String,
        bot_token: Option<String>,
        client: reqwest::Client,
    ) -> HttpTransport {
        HttpTransport {
            base_url: base_url.trim_end_matches('/').to_owned(),
            bot_token,
            client,
        }
    }

    async fn execute(&self, request: Request) -> Result<Option<Value>, HttpError> {
        let url = format!("{}{}", self.base_url, request.path);
        let method = request.method;

        let mut req = self.client.request(method.into(), url);

        if let Some(token) = &self.bot_token {
            req = req.header(AUTHORIZATION, format!("Bot {}", token));
        }

        if let Some(body) = &request.body {
            req = req.json(body);
        }

        let res = req.send().await?;
        let status = res.status();
        let bytes = res.bytes().await?;

        debug!(%method, %status, "Request complete");

        if !status.is_success() {
            return HttpError::ResponseError {
                status,
                body: String::from_utf8_lossy(&bytes[..]).into_owned(),
            }
            .into();
        }

        if bytes.is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_slice(&bytes[..])?))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<Option<Value>, BoxError> {
        self.execute(request).await.map_err(BoxError::from)
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let transport = HttpTransport::new_with_client(
            "https://discord.com/api/v10/".to_owned(),
            None,
            reqwest::Client::new(),
        );

        assert_eq!(transport.base_url, "https://discord.com/api/v10");
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(reqwest::Method::from(Method::Patch), reqwest::Method::PATCH);
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }
}
