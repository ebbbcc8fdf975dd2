//! Exactly-once credential renewal coordination.
//!
//! No matter how many calls fail with an expired credential concurrently,
//! one renewal episode issues exactly one renewal call, and every waiting
//! call resumes with that single outcome. A request arriving after the
//! coordinator returns to idle starts a fresh episode.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use mondap_core::store::CredentialStore;

use crate::http::Dispatcher;

/// Outcome of a renewal episode, shared by every waiter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenewalOutcome {
    /// The store holds a fresh credential pair; replay now.
    Renewed,
    /// Renewal was rejected and the session has been torn down.
    SessionExpired,
}

/// Coordinates renewal episodes across concurrent calls.
///
/// State machine: `Idle` (no renewal in flight) or `Renewing` (one renewal
/// call in flight, with a ticket late arrivals subscribe to). All
/// transitions happen under a single mutex, which is what guarantees the
/// exactly-once property.
#[derive(Clone)]
pub struct RenewalCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    dispatcher: Arc<Dispatcher>,
    store: Arc<dyn CredentialStore>,
    state: Mutex<RenewalState>,
    terminated: broadcast::Sender<()>,
}

enum RenewalState {
    Idle,
    Renewing(broadcast::Sender<RenewalOutcome>),
}

impl RenewalCoordinator {
    pub(crate) fn new(dispatcher: Arc<Dispatcher>, store: Arc<dyn CredentialStore>) -> Self {
        let (terminated, _) = broadcast::channel(4);
        Self {
            inner: Arc::new(CoordinatorInner {
                dispatcher,
                store,
                state: Mutex::new(RenewalState::Idle),
                terminated,
            }),
        }
    }

    /// Join the in-flight renewal episode, starting one if none exists.
    ///
    /// Suspends until the episode resolves. Dropping the returned future
    /// abandons only this waiter; the renewal call itself keeps running,
    /// since its result is shared.
    pub async fn request_renewal(&self) -> RenewalOutcome {
        let mut rx = {
            let mut state = self.inner.state.lock().unwrap();
            match &*state {
                RenewalState::Renewing(ticket) => {
                    debug!("joining in-flight renewal episode");
                    ticket.subscribe()
                }
                RenewalState::Idle => {
                    let (ticket, rx) = broadcast::channel(1);
                    *state = RenewalState::Renewing(ticket);

                    // The episode runs detached so an abandoned waiter
                    // never cancels the shared renewal call.
                    let inner = Arc::clone(&self.inner);
                    tokio::spawn(async move { inner.run_episode().await });

                    rx
                }
            }
        };

        match rx.recv().await {
            Ok(outcome) => outcome,
            // The episode task vanished without an outcome; the session
            // cannot make progress.
            Err(_) => RenewalOutcome::SessionExpired,
        }
    }

    /// Subscribe to session-terminated signals.
    ///
    /// Fires once per failed renewal episode. Carries no payload; the
    /// consumer decides what teardown looks like.
    pub fn on_session_terminated(&self) -> broadcast::Receiver<()> {
        self.inner.terminated.subscribe()
    }
}

impl CoordinatorInner {
    #[instrument(skip(self))]
    async fn run_episode(&self) {
        let outcome = self.renew_once().await;

        // Return to idle before fanning out, so a request arriving after
        // the outcome starts a fresh episode rather than observing a
        // ticket that has already resolved.
        let ticket = {
            let mut state = self.state.lock().unwrap();
            match std::mem::replace(&mut *state, RenewalState::Idle) {
                RenewalState::Renewing(ticket) => ticket,
                RenewalState::Idle => return,
            }
        };

        let _ = ticket.send(outcome);

        if outcome == RenewalOutcome::SessionExpired {
            let _ = self.terminated.send(());
        }
    }

    async fn renew_once(&self) -> RenewalOutcome {
        info!("renewing access credential");

        // The refresh token is read at the moment the renewal call is
        // issued, never captured earlier alongside a stale access token.
        let current = match self.store.get().await {
            Ok(Some(pair)) => pair,
            Ok(None) => {
                warn!("no credential pair available for renewal");
                return RenewalOutcome::SessionExpired;
            }
            Err(err) => {
                // A failed episode always leaves the store empty.
                warn!(error = %err, "credential store read failed during renewal");
                if let Err(err) = self.store.clear().await {
                    warn!(error = %err, "failed to clear credential store");
                }
                return RenewalOutcome::SessionExpired;
            }
        };

        match self.dispatcher.refresh(&current.refresh).await {
            Ok(renewed) => {
                let next = current.rotated(renewed.access, renewed.refresh);
                if let Err(err) = self.store.set(next).await {
                    // A replay could otherwise run with a stale token.
                    warn!(error = %err, "failed to persist renewed credentials");
                    if let Err(err) = self.store.clear().await {
                        warn!(error = %err, "failed to clear credential store");
                    }
                    return RenewalOutcome::SessionExpired;
                }
                debug!("credential pair renewed");
                RenewalOutcome::Renewed
            }
            Err(err) => {
                warn!(error = %err, "renewal rejected, tearing down session");
                if let Err(err) = self.store.clear().await {
                    warn!(error = %err, "failed to clear credential store");
                }
                RenewalOutcome::SessionExpired
            }
        }
    }
}

impl std::fmt::Debug for RenewalCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match *self.inner.state.lock().unwrap() {
            RenewalState::Idle => "Idle",
            RenewalState::Renewing(_) => "Renewing",
        };
        f.debug_struct("RenewalCoordinator")
            .field("state", &state)
            .finish()
    }
}
