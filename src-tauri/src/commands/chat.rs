use audit_bud_core::{AuditAssistant, ChatMessage, ChatTurn, DocumentRecord};
use tauri::State;

#[tauri::command]
pub fn get_transcript(assistant: State<'_, AuditAssistant>) -> Vec<ChatMessage> {
    assistant.transcript()
}

#[tauri::command]
pub fn get_documents(assistant: State<'_, AuditAssistant>) -> Vec<DocumentRecord> {
    assistant.documents()
}

#[tauri::command]
pub fn is_busy(assistant: State<'_, AuditAssistant>) -> bool {
    assistant.is_busy()
}

/// Ask the webhook a question. Webhook failures come back as an assistant
/// reply; only an empty message or one sent while busy is an error.
#[tauri::command]
pub async fn send_message(
    assistant: State<'_, AuditAssistant>,
    content: String,
) -> Result<ChatTurn, String> {
    assistant.ask(&content).await.map_err(|e| {
        tracing::warn!(error = %e, "rejected message");
        e.to_string()
    })
}
