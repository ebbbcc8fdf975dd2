//! mondap-client - Authenticated request pipeline for the mondap Q&A API.
//!
//! The entry point is [`Session`]: it attaches the current access
//! credential to outgoing calls, detects authorization failure, renews the
//! credential pair exactly once per episode no matter how many calls fail
//! concurrently, replays each failed call once, and tears the session down
//! when renewal itself is rejected.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use mondap_client::Session;
//! use mondap_core::{ApiUrl, MemoryStore, TokenPair, AccessToken, RefreshToken};
//!
//! # async fn example() -> mondap_core::Result<()> {
//! let api = ApiUrl::new("https://api.mondap.example")?;
//! let pair = TokenPair::new(AccessToken::new("access"), RefreshToken::new("refresh"));
//! let store = Arc::new(MemoryStore::with_pair(pair));
//! let session = Session::new(api, store);
//!
//! let questions = session.questions(1, 30).await?;
//! println!("{questions}");
//! # Ok(())
//! # }
//! ```

pub mod endpoints;
mod http;
mod renewal;
mod session;

pub use http::{Dispatcher, RenewedTokens};
pub use renewal::{RenewalCoordinator, RenewalOutcome};
pub use session::Session;
