use audit_bud_core::{AuditAssistant, WebhookSettings};
use tauri::State;

/// Endpoint and candidate header sets the assistant tries, in order.
#[tauri::command]
pub fn get_settings(assistant: State<'_, AuditAssistant>) -> WebhookSettings {
    assistant.settings().clone()
}
