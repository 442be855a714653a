use std::net::SocketAddr;

/// Application-level constants
pub const APP_NAME: &str = "Parapheur";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    format!("{}=info,tower_http=info", env!("CARGO_PKG_NAME"))
}

/// Address the API server binds to. Override with PARAPHEUR_BIND.
pub fn bind_addr() -> SocketAddr {
    std::env::var("PARAPHEUR_BIND")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8940)))
}

/// Base URL of the local Ollama instance. Override with OLLAMA_HOST.
pub fn ollama_base_url() -> String {
    std::env::var("OLLAMA_HOST").unwrap_or_else(|_| "http://localhost:11434".to_string())
}

/// Explicit model override. When unset the client probes its preference list.
pub fn ollama_model_override() -> Option<String> {
    std::env::var("PARAPHEUR_MODEL").ok().filter(|m| !m.is_empty())
}
