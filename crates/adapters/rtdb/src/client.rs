//! Thin JSON client over the Realtime-Database REST protocol.

use std::time::Duration;

use reqwest::{Response, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::RtdbError;

/// Asks the database to return the `ETag` of the value read.
const ETAG_REQUEST: &str = "X-Firebase-ETag";

/// Connection settings for the REST backend.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database root, e.g. `https://my-home.firebaseio.com`.
    pub base_url: String,
    /// Database secret or ID token, sent as `?auth=`.
    pub auth: Option<String>,
    pub timeout: Duration,
}

impl Config {
    /// Build the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`RtdbError::Http`] if the TLS backend cannot be initialised.
    pub fn build(self) -> Result<RtdbClient, RtdbError> {
        let http = reqwest::Client::builder().timeout(self.timeout).build()?;
        Ok(RtdbClient {
            http,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            auth: self.auth.filter(|token| !token.is_empty()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct RtdbClient {
    http: reqwest::Client,
    base_url: String,
    auth: Option<String>,
}

impl RtdbClient {
    /// REST location of a store path, without the auth parameter.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}.json", self.base_url, path.trim_matches('/'))
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.auth {
            Some(token) => builder.query(&[("auth", token)]),
            None => builder,
        }
    }

    /// Read the value at `path`; a JSON `null` means the path is empty.
    ///
    /// # Errors
    ///
    /// Returns [`RtdbError`] on transport failure, a non-success status or a
    /// value that does not decode as `T`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, RtdbError> {
        let response = self.request(reqwest::Method::GET, path).send().await?;
        let value: serde_json::Value = check(path, response)?.json().await?;
        decode(path, value)
    }

    /// Read the value at `path` together with its `ETag`, for a later
    /// [`delete_if_match`](Self::delete_if_match).
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub async fn get_tagged<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<(Option<T>, Option<String>), RtdbError> {
        let response = self
            .request(reqwest::Method::GET, path)
            .header(ETAG_REQUEST, "true")
            .send()
            .await?;
        let response = check(path, response)?;
        let etag = response
            .headers()
            .get(header::ETAG)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let value: serde_json::Value = response.json().await?;
        Ok((decode(path, value)?, etag))
    }

    /// Overwrite the value at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RtdbError`] on transport failure or a non-success status.
    pub async fn put<T: Serialize + ?Sized>(&self, path: &str, value: &T) -> Result<(), RtdbError> {
        let response = self
            .request(reqwest::Method::PUT, path)
            .json(value)
            .send()
            .await?;
        check(path, response)?;
        tracing::trace!(path, "rtdb write");
        Ok(())
    }

    /// Remove the value at `path`. Removing an empty path succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`RtdbError`] on transport failure or a non-success status.
    pub async fn delete(&self, path: &str) -> Result<(), RtdbError> {
        let response = self.request(reqwest::Method::DELETE, path).send().await?;
        check(path, response)?;
        Ok(())
    }

    /// Remove the value at `path` only while it still carries `etag`.
    ///
    /// Returns `false` when the value changed since it was read.
    ///
    /// # Errors
    ///
    /// Returns [`RtdbError`] on transport failure or any other non-success
    /// status.
    pub async fn delete_if_match(&self, path: &str, etag: &str) -> Result<bool, RtdbError> {
        let response = self
            .request(reqwest::Method::DELETE, path)
            .header(header::IF_MATCH, etag)
            .send()
            .await?;
        if response.status() == StatusCode::PRECONDITION_FAILED {
            tracing::debug!(path, "value changed since read, delete skipped");
            return Ok(false);
        }
        check(path, response)?;
        Ok(true)
    }
}

fn check(path: &str, response: Response) -> Result<Response, RtdbError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        tracing::warn!(path, "realtime database rejected credentials");
    }
    Err(RtdbError::Status {
        path: path.to_string(),
        status: status.as_u16(),
    })
}

pub(crate) fn decode<T: DeserializeOwned>(
    path: &str,
    value: serde_json::Value,
) -> Result<Option<T>, RtdbError> {
    if value.is_null() {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|source| RtdbError::Malformed {
            path: path.to_string(),
            source,
        })
}
