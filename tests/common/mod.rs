use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use sitechat::config::{ChatConfig, Config};
use sitechat::controller::ChatController;
use sitechat::session::SessionId;
use sitechat::transcript::Transcript;
use sitechat::HttpChatBackend;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Configuration whose origin is the given mock server
#[allow(dead_code)]
pub fn config_for(origin: &str) -> Config {
    Config {
        chat: ChatConfig {
            origin: Some(origin.to_string()),
            ..ChatConfig::default()
        },
        ..Config::default()
    }
}

/// Controller over a headless transcript talking to `origin`
#[allow(dead_code)]
pub fn headless_controller(
    origin: &str,
    session: &str,
) -> ChatController<HttpChatBackend, Transcript> {
    let config = config_for(origin);
    let backend = HttpChatBackend::from_config(&config.chat).expect("backend should build");
    ChatController::new(
        backend,
        Transcript::new(),
        SessionId::from(session),
        config.messages,
        config.chat.max_sources,
    )
}
