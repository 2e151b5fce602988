use crate::config::WebhookSettings;
use crate::models::{ChatMessage, DocumentRecord};
use crate::normalizer;
use crate::webhook::Dispatcher;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const GREETING: &str =
    "I'm ready to answer questions about audit document. What would you like to know?";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Message is empty")]
    EmptyQuery,
    #[error("A request is already in progress")]
    Busy,
}

impl Serialize for SessionError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Transcript and current document records for one running app.
///
/// Both lists are shared snapshots: every update swaps in a new list rather
/// than editing the old one, so a reader holding a snapshot never sees a
/// half-applied change.
#[derive(Debug, Clone)]
pub struct Session {
    transcript: Arc<Vec<ChatMessage>>,
    documents: Arc<Vec<DocumentRecord>>,
    busy: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            transcript: Arc::new(vec![ChatMessage::assistant(GREETING)]),
            documents: Arc::new(Vec::new()),
            busy: false,
        }
    }

    pub fn transcript(&self) -> Arc<Vec<ChatMessage>> {
        Arc::clone(&self.transcript)
    }

    pub fn documents(&self) -> Arc<Vec<DocumentRecord>> {
        Arc::clone(&self.documents)
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    fn append(&mut self, message: ChatMessage) {
        let mut next = Vec::with_capacity(self.transcript.len() + 1);
        next.extend(self.transcript.iter().cloned());
        next.push(message);
        self.transcript = Arc::new(next);
    }

    /// Records the user's question and clears the previous query's records.
    pub fn begin(&mut self, query: &str) -> Result<ChatMessage, SessionError> {
        if query.trim().is_empty() {
            return Err(SessionError::EmptyQuery);
        }
        if self.busy {
            return Err(SessionError::Busy);
        }

        let message = ChatMessage::user(query);
        self.append(message.clone());
        self.documents = Arc::new(Vec::new());
        self.busy = true;
        Ok(message)
    }

    /// Clears the busy flag without recording a reply.
    pub fn release(&mut self) {
        self.busy = false;
    }

    pub fn complete(&mut self, reply: ChatMessage, documents: Vec<DocumentRecord>) {
        self.append(reply);
        self.documents = Arc::new(documents);
        self.busy = false;
    }
}

/// Result of one question: the assistant's reply plus the records that came
/// with it.
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub reply: ChatMessage,
    pub documents: Vec<DocumentRecord>,
}

/// Releases the session's busy flag when dropped, so a query abandoned
/// mid-request does not lock out later ones.
struct InFlight<'a> {
    session: &'a Mutex<Session>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .release();
    }
}

/// Runs questions through the webhook and applies the answers to a session.
pub struct AuditAssistant {
    settings: WebhookSettings,
    dispatcher: Dispatcher,
    session: Mutex<Session>,
}

impl AuditAssistant {
    pub fn new(settings: WebhookSettings, dispatcher: Dispatcher) -> Self {
        Self {
            settings,
            dispatcher,
            session: Mutex::new(Session::new()),
        }
    }

    pub fn from_settings(settings: WebhookSettings) -> Self {
        let dispatcher = Dispatcher::from_settings(&settings);
        Self::new(settings, dispatcher)
    }

    pub fn settings(&self) -> &WebhookSettings {
        &self.settings
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.session().transcript().as_ref().clone()
    }

    pub fn documents(&self) -> Vec<DocumentRecord> {
        self.session().documents().as_ref().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.session().is_busy()
    }

    /// Sends `query` to the webhook and records the outcome.
    ///
    /// Webhook failures do not surface as errors here: they become an
    /// assistant message describing the failure, with no records. Only an
    /// empty query or a second query while one is in flight is rejected.
    pub async fn ask(&self, query: &str) -> Result<ChatTurn, SessionError> {
        // Guard released before the network call
        self.session().begin(query)?;
        let _in_flight = InFlight {
            session: &self.session,
        };

        let turn = match self.dispatcher.dispatch(query).await {
            Ok(raw) => {
                let normalized = normalizer::normalize(&raw);
                tracing::info!(
                    documents = normalized.documents.len(),
                    "received webhook answer"
                );
                ChatTurn {
                    reply: ChatMessage::assistant(normalized.message),
                    documents: normalized.documents,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "webhook query failed");
                ChatTurn {
                    reply: ChatMessage::assistant(e.user_message()),
                    documents: Vec::new(),
                }
            }
        };

        self.session()
            .complete(turn.reply.clone(), turn.documents.clone());
        Ok(turn)
    }
}
