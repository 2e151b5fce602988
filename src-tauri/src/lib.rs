mod commands;

use audit_bud_core::{AuditAssistant, WebhookSettings};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,audit_bud_lib=info,audit_bud_core=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    init_tracing();

    let settings = WebhookSettings::default();
    tracing::info!(
        endpoint = %settings.endpoint_url,
        candidates = settings.candidates.len(),
        "starting Audit Bud"
    );

    tauri::Builder::default()
        .manage(AuditAssistant::from_settings(settings))
        .invoke_handler(tauri::generate_handler![
            commands::chat::send_message,
            commands::chat::get_transcript,
            commands::chat::get_documents,
            commands::chat::is_busy,
            commands::settings::get_settings,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
