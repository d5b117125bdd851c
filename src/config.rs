//! Configuration management for Sitechat
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, SitechatError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Sitechat
///
/// Holds the chat endpoint settings, the user-visible phrases of the
/// widget, and the slide groups the rotators cycle through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Chat endpoint configuration
    #[serde(default)]
    pub chat: ChatConfig,

    /// Fixed phrases and decorations shown in the transcript
    #[serde(default)]
    pub messages: MessagesConfig,

    /// Slide groups driven by the rotators
    #[serde(default = "default_slides")]
    pub slides: Vec<SlideGroupConfig>,
}

/// Chat endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Origin of the site hosting the widget, e.g. `https://assistant.example.org`
    ///
    /// When unset or not a network origin (`file://...`, `null`), requests go
    /// to `dev_fallback` instead.
    #[serde(default)]
    pub origin: Option<String>,

    /// Local development address used when the origin is unusable
    #[serde(default = "default_dev_fallback")]
    pub dev_fallback: String,

    /// Maximum number of source links rendered under a reply
    #[serde(default = "default_max_sources")]
    pub max_sources: usize,

    /// Optional whole-request timeout (seconds). Unset means wait indefinitely.
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
}

fn default_dev_fallback() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_max_sources() -> usize {
    4
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            origin: None,
            dev_fallback: default_dev_fallback(),
            max_sources: default_max_sources(),
            request_timeout_seconds: None,
        }
    }
}

/// User-visible phrases and decorations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessagesConfig {
    /// Provisional assistant text while the request is in flight
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Shown when the backend answers without an `answer` field
    #[serde(default = "default_fallback_answer")]
    pub fallback_answer: String,

    /// Shown when the request fails for any reason
    #[serde(default = "default_error_phrase")]
    pub error: String,

    /// Title of the source link block
    #[serde(default = "default_sources_title")]
    pub sources_title: String,

    /// Label next to user bubbles
    #[serde(default = "default_user_label")]
    pub user_label: String,

    /// Display name of the assistant, shown where a page would show its avatar
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,
}

fn default_placeholder() -> String {
    "Recherche en cours...".to_string()
}

fn default_fallback_answer() -> String {
    "Je n'ai pas de réponse pour l'instant.".to_string()
}

fn default_error_phrase() -> String {
    "Erreur : impossible de joindre le serveur.".to_string()
}

fn default_sources_title() -> String {
    "Sources".to_string()
}

fn default_user_label() -> String {
    "Vous".to_string()
}

fn default_assistant_name() -> String {
    "Assistant EPITECH".to_string()
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            placeholder: default_placeholder(),
            fallback_answer: default_fallback_answer(),
            error: default_error_phrase(),
            sources_title: default_sources_title(),
            user_label: default_user_label(),
            assistant_name: default_assistant_name(),
        }
    }
}

/// One group of slides sharing a class selector and a rotation period
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlideGroupConfig {
    /// Class selector of the group, e.g. `.hero-bg-slide`
    pub selector: String,

    /// Rotation period in milliseconds
    pub interval_ms: u64,

    /// Image assets, one slide each, in display order
    #[serde(default)]
    pub images: Vec<String>,
}

fn default_slides() -> Vec<SlideGroupConfig> {
    vec![
        SlideGroupConfig {
            selector: ".header-bg-slide".to_string(),
            interval_ms: 3200,
            images: vec![
                "images/header-1.jpg".to_string(),
                "images/header-2.jpg".to_string(),
                "images/header-3.jpg".to_string(),
            ],
        },
        SlideGroupConfig {
            selector: ".hero-bg-slide".to_string(),
            interval_ms: 4500,
            images: vec![
                "images/hero-1.jpg".to_string(),
                "images/hero-2.jpg".to_string(),
            ],
        },
    ]
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn default_config() -> Self {
        Self {
            chat: ChatConfig::default(),
            messages: MessagesConfig::default(),
            slides: default_slides(),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SitechatError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| SitechatError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(origin) = std::env::var("SITECHAT_ORIGIN") {
            tracing::debug!(origin = %origin, "Env override: SITECHAT_ORIGIN");
            self.chat.origin = Some(origin);
        }

        if let Ok(max_sources) = std::env::var("SITECHAT_MAX_SOURCES") {
            match max_sources.parse::<usize>() {
                Ok(v) => {
                    self.chat.max_sources = v;
                    tracing::debug!(max_sources = v, "Env override: SITECHAT_MAX_SOURCES");
                }
                Err(_) => {
                    tracing::warn!("Invalid SITECHAT_MAX_SOURCES: {}", max_sources);
                }
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(origin) = &cli.origin {
            self.chat.origin = Some(origin.clone());
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.chat.max_sources == 0 {
            return Err(
                SitechatError::Config("chat.max_sources must be greater than 0".to_string()).into(),
            );
        }

        if url::Url::parse(&self.chat.dev_fallback).is_err() {
            return Err(SitechatError::Config(format!(
                "chat.dev_fallback is not a valid URL: {}",
                self.chat.dev_fallback
            ))
            .into());
        }

        if self.chat.request_timeout_seconds == Some(0) {
            return Err(SitechatError::Config(
                "chat.request_timeout_seconds must be greater than 0 when set".to_string(),
            )
            .into());
        }

        let phrases = [
            ("messages.placeholder", &self.messages.placeholder),
            ("messages.fallback_answer", &self.messages.fallback_answer),
            ("messages.error", &self.messages.error),
            ("messages.sources_title", &self.messages.sources_title),
        ];
        for (name, value) in phrases {
            if value.trim().is_empty() {
                return Err(SitechatError::Config(format!("{} cannot be empty", name)).into());
            }
        }

        for group in &self.slides {
            if !group.selector.starts_with('.') || group.selector.len() < 2 {
                return Err(SitechatError::Config(format!(
                    "slide selector must be a class selector like '.hero-bg-slide': {}",
                    group.selector
                ))
                .into());
            }
            if group.interval_ms == 0 {
                return Err(SitechatError::Config(format!(
                    "slide interval for {} must be greater than 0",
                    group.selector
                ))
                .into());
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
