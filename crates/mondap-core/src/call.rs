//! Call descriptors for logical API requests.
//!
//! A [`CallDescriptor`] describes one logical request and is immutable once
//! built. Retry bookkeeping lives on [`Attempt`], a fresh wrapper produced
//! per dispatch, so replaying a call never mutates caller-owned state.

use std::fmt;

use serde_json::Value;

/// HTTP method for a call. The API only uses GET and POST.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Request body of a call.
///
/// Most endpoints take JSON; the image upload endpoint takes a single
/// file as a multipart form.
#[derive(Clone, Debug)]
pub enum Body {
    Json(Value),
    Multipart(FilePart),
}

impl Body {
    /// Returns the JSON body, if this is one.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => Some(value),
            Body::Multipart(_) => None,
        }
    }
}

/// One file in a multipart form body.
#[derive(Clone)]
pub struct FilePart {
    field: String,
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl FilePart {
    pub fn new(
        field: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

// File contents are elided from Debug output; only their size is shown.
impl fmt::Debug for FilePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePart")
            .field("field", &self.field)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("bytes", &format_args!("{} bytes", self.bytes.len()))
            .finish()
    }
}

/// An opaque description of one logical API request.
///
/// From the pipeline's perspective a descriptor is idempotent: it can be
/// dispatched, and dispatched once more after a credential renewal,
/// without the descriptor itself changing.
///
/// # Example
///
/// ```
/// use mondap_core::CallDescriptor;
///
/// let call = CallDescriptor::get("/post/v1/auth/questions")
///     .query("page", 1)
///     .query("offset", 30);
/// assert_eq!(call.path(), "/post/v1/auth/questions");
/// ```
#[derive(Clone, Debug)]
pub struct CallDescriptor {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Body>,
    headers: Vec<(String, String)>,
}

impl CallDescriptor {
    /// Describe a GET request for the given path.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
        }
    }

    /// Describe a POST request with a JSON body.
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            body: Some(Body::Json(body)),
            headers: Vec::new(),
        }
    }

    /// Describe a POST request carrying one file as a multipart form.
    pub fn upload(path: impl Into<String>, part: FilePart) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            body: Some(Body::Multipart(part)),
            headers: Vec::new(),
        }
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

/// One dispatch of a descriptor.
///
/// The first attempt is never marked retried; the replay after a renewal
/// always is. A descriptor is replayed at most once: a second rejection of
/// the credential on a retried attempt is terminal.
#[derive(Clone, Copy, Debug)]
pub struct Attempt<'a> {
    descriptor: &'a CallDescriptor,
    retried: bool,
}

impl<'a> Attempt<'a> {
    /// The initial dispatch of a call.
    pub fn first(descriptor: &'a CallDescriptor) -> Self {
        Self {
            descriptor,
            retried: false,
        }
    }

    /// The single replay after a successful credential renewal.
    pub fn retry(descriptor: &'a CallDescriptor) -> Self {
        Self {
            descriptor,
            retried: true,
        }
    }

    pub fn descriptor(&self) -> &'a CallDescriptor {
        self.descriptor
    }

    pub fn retried(&self) -> bool {
        self.retried
    }
}
