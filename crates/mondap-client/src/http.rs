//! HTTP dispatch and failure classification.

use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use tracing::{debug, instrument, trace};

use mondap_core::{
    AccessToken, ApiError, ApiResponse, ApiUrl, Attempt, Body, Failure, FilePart, Method,
    NetworkError, RefreshToken, TransportError,
};

use crate::endpoints::{self, ErrorEnvelope, RefreshRequest, RefreshResponse};

/// Tokens returned by a successful renewal call.
///
/// The refresh token is only present when the server rotates it.
#[derive(Debug)]
pub struct RenewedTokens {
    pub access: AccessToken,
    pub refresh: Option<RefreshToken>,
}

/// Issues single outbound calls and classifies their outcomes.
///
/// The dispatcher attaches the given access token as a bearer credential,
/// sends the request, and maps the result into the failure taxonomy. It
/// never touches the credential store.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
    base: ApiUrl,
}

impl Dispatcher {
    /// Create a new dispatcher for the given API base URL.
    pub fn new(base: ApiUrl) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("mondap/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client");

        Self { client, base }
    }

    /// Returns the API base URL this dispatcher is configured for.
    pub fn base(&self) -> &ApiUrl {
        &self.base
    }

    /// Send one attempt of a call with the given access token.
    ///
    /// Classification:
    /// - 2xx: success
    /// - 401 on a first attempt: the credential expired, replay is allowed
    /// - 401 on a retried attempt: terminal, the session is gone
    /// - anything else: terminal for this call, carrying the original error
    #[instrument(skip(self, attempt, token), fields(path = attempt.descriptor().path(), retried = attempt.retried()))]
    pub async fn send(
        &self,
        attempt: Attempt<'_>,
        token: &AccessToken,
    ) -> Result<ApiResponse, Failure> {
        let descriptor = attempt.descriptor();
        let url = self.base.endpoint_url(descriptor.path());
        debug!("dispatching call");
        trace!(query = ?descriptor.query_params(), "call parameters");

        let mut request = match descriptor.method() {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };

        if !descriptor.query_params().is_empty() {
            request = request.query(descriptor.query_params());
        }
        match descriptor.body() {
            Some(Body::Json(value)) => request = request.json(value),
            Some(Body::Multipart(part)) => {
                let form = multipart_form(part)
                    .map_err(|e| Failure::Network(transport_error(e).into()))?;
                request = request.multipart(form);
            }
            None => {}
        }
        for (name, value) in descriptor.headers() {
            request = request.header(name, value);
        }
        request = request.header(AUTHORIZATION, format!("Bearer {}", token.as_str()));

        let response = request
            .send()
            .await
            .map_err(|e| Failure::Network(transport_error(e).into()))?;

        let status = response.status();
        trace!(status = %status, "call response");

        if status.is_success() {
            let body = decode_body(response).await?;
            return Ok(ApiResponse::new(status.as_u16(), body));
        }

        if status == StatusCode::UNAUTHORIZED {
            if attempt.retried() {
                debug!("credential rejected again after renewal");
                return Err(Failure::SessionExpired);
            }
            debug!("credential rejected, call is replayable");
            return Err(Failure::AuthExpired);
        }

        Err(Failure::Network(
            parse_error_response(response).await.into(),
        ))
    }

    /// Issue the renewal call with the given refresh token.
    ///
    /// This component never retries the renewal call; a failure here is
    /// terminal for the episode.
    #[instrument(skip_all)]
    pub async fn refresh(&self, token: &RefreshToken) -> Result<RenewedTokens, NetworkError> {
        let url = self.base.endpoint_url(endpoints::AUTH_REFRESH);
        debug!("issuing credential renewal call");

        let response = self
            .client
            .post(&url)
            .json(&RefreshRequest {
                token: token.as_str(),
            })
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(parse_error_response(response).await.into());
        }

        let body: RefreshResponse = response
            .json()
            .await
            .map_err(transport_error)?;

        Ok(RenewedTokens {
            access: AccessToken::new(body.data.access.token),
            refresh: body.data.refresh.map(|t| RefreshToken::new(t.token)),
        })
    }
}

/// Build a single-file multipart form.
fn multipart_form(part: &FilePart) -> Result<reqwest::multipart::Form, reqwest::Error> {
    let file = reqwest::multipart::Part::bytes(part.bytes().to_vec())
        .file_name(part.file_name().to_string())
        .mime_str(part.content_type())?;
    Ok(reqwest::multipart::Form::new().part(part.field().to_string(), file))
}

/// Decode a 2xx body, tolerating empty responses.
async fn decode_body(response: reqwest::Response) -> Result<Value, Failure> {
    let text = response
        .text()
        .await
        .map_err(|e| Failure::Network(transport_error(e).into()))?;

    if text.is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&text).map_err(|e| {
        Failure::Network(
            TransportError::Http {
                message: format!("invalid JSON in response body: {e}"),
            }
            .into(),
        )
    })
}

/// Parse a non-2xx response into an [`ApiError`].
async fn parse_error_response(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();

    // Try the API's JSON error envelope first
    match response.json::<ErrorEnvelope>().await {
        Ok(body) => ApiError::new(status, body.error, body.message),
        Err(_) => ApiError::new(status, None, None),
    }
}

/// Map a reqwest error into the transport taxonomy.
fn transport_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatcher_creation() {
        let api = ApiUrl::new("https://api.mondap.example").unwrap();
        let dispatcher = Dispatcher::new(api.clone());
        assert_eq!(dispatcher.base().as_str(), api.as_str());
    }
}
