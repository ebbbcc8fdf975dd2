//! The authenticated session pipeline.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, instrument};

use mondap_core::store::CredentialStore;
use mondap_core::{ApiResponse, ApiUrl, Attempt, AuthError, CallDescriptor, Failure, Result};

use crate::endpoints;
use crate::http::Dispatcher;
use crate::renewal::{RenewalCoordinator, RenewalOutcome};

/// An authenticated connection to the mondap API.
///
/// Every call flows through [`Session::execute`]: the current access
/// credential is attached, a 401 triggers one coordinated renewal episode,
/// and the call is replayed once with the renewed credential. A second
/// rejection, or a rejected renewal, resolves the call as session-expired.
///
/// # Thread Safety
///
/// Sessions are cheap to clone (they use internal `Arc`) and safe to share
/// across tasks; concurrent calls that expire together share a single
/// renewal episode.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    dispatcher: Arc<Dispatcher>,
    store: Arc<dyn CredentialStore>,
    coordinator: RenewalCoordinator,
}

impl Session {
    /// Create a session over an externally supplied credential store.
    ///
    /// The store must already hold a credential pair issued by a login
    /// flow; this library never issues the first pair itself.
    pub fn new(api: ApiUrl, store: Arc<dyn CredentialStore>) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(api));
        let coordinator = RenewalCoordinator::new(Arc::clone(&dispatcher), Arc::clone(&store));

        Self {
            inner: Arc::new(SessionInner {
                dispatcher,
                store,
                coordinator,
            }),
        }
    }

    /// Execute one logical call through the pipeline.
    ///
    /// Resolves to exactly one outcome: the response, a session-expired
    /// error, or the original non-auth error. Only an expired access
    /// credential is intercepted here; everything else passes through
    /// untouched.
    #[instrument(skip(self, descriptor), fields(path = descriptor.path()))]
    pub async fn execute(&self, descriptor: &CallDescriptor) -> Result<ApiResponse> {
        let Some(pair) = self.inner.store.get().await? else {
            debug!("no credential pair, failing fast");
            return Err(AuthError::SessionExpired.into());
        };

        match self
            .inner
            .dispatcher
            .send(Attempt::first(descriptor), &pair.access)
            .await
        {
            Ok(response) => Ok(response),
            Err(Failure::AuthExpired) => {
                debug!("access credential expired, awaiting renewal");
                match self.inner.coordinator.request_renewal().await {
                    RenewalOutcome::Renewed => {
                        // Re-read so the replay uses the pair produced by
                        // the episode just waited on.
                        let Some(pair) = self.inner.store.get().await? else {
                            return Err(AuthError::SessionExpired.into());
                        };
                        self.inner
                            .dispatcher
                            .send(Attempt::retry(descriptor), &pair.access)
                            .await
                            .map_err(Into::into)
                    }
                    RenewalOutcome::SessionExpired => Err(AuthError::SessionExpired.into()),
                }
            }
            Err(failure) => Err(failure.into()),
        }
    }

    /// Subscribe to session-terminated signals.
    ///
    /// Fires when a renewal episode is rejected; a UI layer would
    /// typically navigate to a login screen on this signal.
    pub fn on_session_terminated(&self) -> broadcast::Receiver<()> {
        self.inner.coordinator.on_session_terminated()
    }

    /// Drop the stored credential pair.
    ///
    /// Does not contact the server and does not emit the terminated
    /// signal; this is the caller-initiated teardown path.
    pub async fn logout(&self) -> Result<()> {
        self.inner.store.clear().await?;
        Ok(())
    }

    // ========================================================================
    // Domain Endpoints
    // ========================================================================

    /// List questions, newest first.
    #[instrument(skip(self))]
    pub async fn questions(&self, page: u32, offset: u32) -> Result<Value> {
        debug!("listing questions");
        let call = endpoints::list_questions(page, offset);
        Ok(self.execute(&call).await?.into_data())
    }

    /// Fetch one question with its content blocks.
    #[instrument(skip(self))]
    pub async fn question(&self, question_id: u64) -> Result<Value> {
        debug!("fetching question");
        let call = endpoints::question_detail(question_id);
        Ok(self.execute(&call).await?.into_data())
    }

    /// Create a question; returns the payload carrying the new id.
    #[instrument(skip(self, content))]
    pub async fn ask(&self, title: &str, content: &Value) -> Result<Value> {
        debug!("creating question");
        let call = endpoints::create_question(title, content);
        Ok(self.execute(&call).await?.into_data())
    }

    pub async fn update_question(&self, body: Value) -> Result<Value> {
        let call = endpoints::update_question(body);
        Ok(self.execute(&call).await?.into_data())
    }

    pub async fn delete_question(&self, body: Value) -> Result<Value> {
        let call = endpoints::delete_question(body);
        Ok(self.execute(&call).await?.into_data())
    }

    /// List answers for a question.
    #[instrument(skip(self))]
    pub async fn answers(&self, question_id: u64, page: u32, offset: u32) -> Result<Value> {
        debug!("listing answers");
        let call = endpoints::list_answers(question_id, page, offset);
        Ok(self.execute(&call).await?.into_data())
    }

    pub async fn answer(&self, body: Value) -> Result<Value> {
        let call = endpoints::create_answer(body);
        Ok(self.execute(&call).await?.into_data())
    }

    pub async fn update_answer(&self, body: Value) -> Result<Value> {
        let call = endpoints::update_answer(body);
        Ok(self.execute(&call).await?.into_data())
    }

    pub async fn delete_answer(&self, body: Value) -> Result<Value> {
        let call = endpoints::delete_answer(body);
        Ok(self.execute(&call).await?.into_data())
    }

    /// Adopt an answer as the accepted one for its question.
    pub async fn adopt_answer(&self, body: Value) -> Result<Value> {
        let call = endpoints::adopt_answer(body);
        Ok(self.execute(&call).await?.into_data())
    }

    /// Like a question or answer.
    pub async fn like(&self, body: Value) -> Result<Value> {
        let call = endpoints::like(body);
        Ok(self.execute(&call).await?.into_data())
    }

    /// Upload an image for a content block; the payload is the hosted URL.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_image(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Value> {
        debug!("uploading image");
        let call = endpoints::upload_image(file_name, content_type, bytes);
        Ok(self.execute(&call).await?.into_data())
    }

    /// Ranking detail for the current user.
    #[instrument(skip(self))]
    pub async fn ranking(&self) -> Result<Value> {
        let call = endpoints::ranking_detail();
        Ok(self.execute(&call).await?.into_data())
    }

    /// Ranking table by likes received.
    pub async fn ranking_likes(&self) -> Result<Value> {
        let call = endpoints::ranking_likes();
        Ok(self.execute(&call).await?.into_data())
    }

    /// Ranking table by adopted answers.
    pub async fn ranking_adopted(&self) -> Result<Value> {
        let call = endpoints::ranking_adopted();
        Ok(self.execute(&call).await?.into_data())
    }
}

// Custom Debug impl that hides credential state
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("api", self.inner.dispatcher.base())
            .field("credentials", &"[REDACTED]")
            .finish()
    }
}
