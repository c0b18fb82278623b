// crates/pcrf-mock-harness/src/responder.rs
// ============================================================================
// Module: Protocol Responder
// Description: Tokio task answering credit-control requests from a channel.
// Purpose: Model the protocol-responder thread in front of the mock engine.
// Dependencies: pcrf-mock-core, tokio
// ============================================================================

//! ## Overview
//! Clients push requests into an `mpsc` channel with a `oneshot` reply slot.
//! The responder task answers each one through [`MockEngine`], applies
//! successful answers to the shared policy ledger, and replies. An answer the
//! ledger rejects is not recorded against its expectation. Requests are
//! processed one at a time in arrival order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use pcrf_mock_core::AnswerMessage;
use pcrf_mock_core::CreditControlRequest;
use pcrf_mock_core::MockEngine;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::HarnessError;
use crate::policy::SharedPolicy;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Inbound queue depth.
const INBOX_CAPACITY: usize = 64;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One request awaiting its answer.
struct Exchange {
    /// Inbound request.
    request: CreditControlRequest,
    /// Reply slot.
    reply: oneshot::Sender<Result<AnswerMessage, HarnessError>>,
}

/// Cloneable sender side of the responder.
#[derive(Clone)]
pub struct ResponderClient {
    /// Inbox sender.
    sender: mpsc::Sender<Exchange>,
}

impl ResponderClient {
    /// Sends a request and awaits its answer.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::ResponderClosed`] when the task has stopped,
    /// or the engine or ledger error for this request.
    pub async fn exchange(
        &self,
        request: CreditControlRequest,
    ) -> Result<AnswerMessage, HarnessError> {
        let (reply, pending) = oneshot::channel();
        self.sender
            .send(Exchange {
                request,
                reply,
            })
            .await
            .map_err(|_| HarnessError::ResponderClosed)?;
        pending.await.map_err(|_| HarnessError::ResponderClosed)?
    }

    /// Blocking variant of [`ResponderClient::exchange`] for synchronous
    /// collaborators. Must not be called from an async context.
    ///
    /// # Errors
    ///
    /// Same as [`ResponderClient::exchange`].
    pub fn blocking_exchange(
        &self,
        request: CreditControlRequest,
    ) -> Result<AnswerMessage, HarnessError> {
        let (reply, pending) = oneshot::channel();
        self.sender
            .blocking_send(Exchange {
                request,
                reply,
            })
            .map_err(|_| HarnessError::ResponderClosed)?;
        pending.blocking_recv().map_err(|_| HarnessError::ResponderClosed)?
    }
}

/// Running responder task.
pub struct Responder {
    /// Client kept for handing out clones.
    client: ResponderClient,
    /// Shutdown signal.
    shutdown: Option<oneshot::Sender<()>>,
    /// Task handle.
    task: Option<JoinHandle<()>>,
}

impl Responder {
    /// Spawns the responder on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Runtime`] when called outside a tokio runtime.
    pub fn spawn(engine: Arc<MockEngine>, policy: SharedPolicy) -> Result<Self, HarnessError> {
        let runtime = Handle::try_current().map_err(|err| HarnessError::Runtime(err.to_string()))?;
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let (shutdown, stop) = oneshot::channel();
        let task = runtime.spawn(run(engine, policy, inbox, stop));
        Ok(Self {
            client: ResponderClient {
                sender,
            },
            shutdown: Some(shutdown),
            task: Some(task),
        })
    }

    /// Returns a client for submitting requests.
    #[must_use]
    pub fn client(&self) -> ResponderClient {
        self.client.clone()
    }

    /// Stops the task and waits for it to exit.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Runtime`] when the task panicked.
    pub async fn shutdown(mut self) -> Result<(), HarnessError> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        match self.task.take() {
            Some(task) => task.await.map_err(|err| HarnessError::Runtime(err.to_string())),
            None => Ok(()),
        }
    }
}

impl Drop for Responder {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

// ============================================================================
// SECTION: Task
// ============================================================================

/// Responder loop.
async fn run(
    engine: Arc<MockEngine>,
    policy: SharedPolicy,
    mut inbox: mpsc::Receiver<Exchange>,
    mut stop: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = &mut stop => break,
            next = inbox.recv() => {
                let Some(exchange) = next else {
                    break;
                };
                let reply = answer(&engine, &policy, &exchange.request);
                let _ = exchange.reply.send(reply);
            }
        }
    }
}

/// Answers one request and records its policy effects.
fn answer(
    engine: &MockEngine,
    policy: &SharedPolicy,
    request: &CreditControlRequest,
) -> Result<AnswerMessage, HarnessError> {
    engine.handle_request_with(request, |message| {
        if message.answer.result_code.is_success() {
            policy.apply_answer(&message.answer)?;
        }
        Ok(())
    })
}
