//! Core of Audit Bud: sends audit questions to the n8n webhook and turns its
//! answers into a chat reply plus document metadata records.

pub mod config;
pub mod models;
pub mod normalizer;
pub mod session;
pub mod webhook;

pub use config::{RequestConfig, WebhookSettings};
pub use models::{ChatMessage, DocumentRecord, RankedSection, Role};
pub use normalizer::{normalize, NormalizedResponse, WebhookPayload};
pub use session::{AuditAssistant, ChatTurn, Session, SessionError};
pub use webhook::{Dispatcher, WebhookError, WebhookTransport};
