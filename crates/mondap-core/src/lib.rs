//! mondap-core - Core types and traits for the mondap Q&A API client.
//!
//! This crate holds the pieces shared by every backend: token newtypes,
//! call descriptors, the failure taxonomy, and the [`CredentialStore`]
//! trait that abstracts where the credential pair lives.

pub mod api_url;
pub mod call;
pub mod error;
pub mod response;
pub mod store;
pub mod tokens;

pub use api_url::ApiUrl;
pub use call::{Attempt, Body, CallDescriptor, FilePart, Method};
pub use error::{
    ApiError, AuthError, Error, Failure, InvalidInputError, NetworkError, StoreError,
    TransportError,
};
pub use response::ApiResponse;
pub use store::{CredentialStore, MemoryStore};
pub use tokens::{AccessToken, RefreshToken, TokenPair};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
