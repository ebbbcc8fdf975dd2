//! API base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated API base URL.
///
/// The URL must be absolute and use HTTPS, with plain HTTP allowed for
/// loopback hosts during development. Endpoint paths are appended to the
/// base verbatim, so a path prefix on the base (say, a reverse-proxy
/// mount point) is preserved.
///
/// # Example
///
/// ```
/// use mondap_core::ApiUrl;
///
/// let api = ApiUrl::new("https://api.mondap.example").unwrap();
/// assert_eq!(api.endpoint_url("/user/v1/auth/refresh"),
///            "https://api.mondap.example/user/v1/auth/refresh");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl {
    url: Url,
    // The serialized form with any trailing slash trimmed, so endpoint
    // paths (which start with '/') join without doubling.
    base: String,
}

impl ApiUrl {
    /// Create a new API base URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is relative, has no host, or uses a
    /// scheme the API does not accept.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let invalid = |reason: String| InvalidInputError::ApiUrl {
            value: s.to_string(),
            reason,
        };

        let url = Url::parse(s).map_err(|e| invalid(e.to_string()))?;

        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(invalid("must be an absolute URL with a host".to_string()).into());
        }

        let loopback = url
            .host_str()
            .is_some_and(|h| matches!(h, "localhost" | "127.0.0.1" | "[::1]" | "::1"));
        if url.scheme() != "https" && !(url.scheme() == "http" && loopback) {
            return Err(
                invalid("must use HTTPS (HTTP allowed only for localhost)".to_string()).into(),
            );
        }

        let base = url.as_str().trim_end_matches('/').to_string();
        Ok(Self { url, base })
    }

    /// Returns the full URL for an endpoint path.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Returns the base URL as a string, without a trailing slash.
    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ApiUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.base)
    }
}

impl<'de> Deserialize<'de> for ApiUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ApiUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for ApiUrl {
    fn as_ref(&self) -> &str {
        &self.base
    }
}
