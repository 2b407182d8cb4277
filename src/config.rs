// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Secrets (Groq API key, Clerk webhook secret) are injected as environment
//! variables by the deployment and read once at startup.

use std::env;
use std::str::FromStr;

/// Default chat model used for plan generation.
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";

/// Default Groq OpenAI-compatible API base URL.
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Which document store backs the plan and user collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Google Cloud Firestore (or the emulator when FIRESTORE_EMULATOR_HOST is set)
    Firestore,
    /// In-process store, lost on restart
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StorageBackend::Firestore),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::Invalid("STORAGE_BACKEND", other.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Storage backend selection
    pub storage_backend: StorageBackend,
    /// Chat model name
    pub groq_model: String,
    /// Completion API base URL
    pub groq_base_url: String,
    /// Per-request timeout for completion calls, in seconds
    pub completion_timeout_secs: u64,

    // --- Secrets ---
    /// Groq API key
    pub groq_api_key: String,
    /// Clerk webhook signing secret (`whsec_...`)
    pub clerk_webhook_secret: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            storage_backend: env::var("STORAGE_BACKEND")
                .unwrap_or_else(|_| "firestore".to_string())
                .parse()?,
            groq_model: env::var("GROQ_MODEL").unwrap_or_else(|_| DEFAULT_GROQ_MODEL.to_string()),
            groq_base_url: env::var("GROQ_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GROQ_BASE_URL.to_string()),
            completion_timeout_secs: env::var("COMPLETION_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),

            groq_api_key: env::var("GROQ_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GROQ_API_KEY"))?,
            clerk_webhook_secret: env::var("CLERK_WEBHOOK_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("CLERK_WEBHOOK_SECRET"))?,
        })
    }

    /// Config for tests: in-memory storage and a fixed webhook secret.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:3000".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            storage_backend: StorageBackend::Memory,
            groq_model: DEFAULT_GROQ_MODEL.to_string(),
            groq_base_url: DEFAULT_GROQ_BASE_URL.to_string(),
            completion_timeout_secs: 5,
            groq_api_key: "test_groq_key".to_string(),
            // base64("test_webhook_signing_key_32bytes")
            clerk_webhook_secret: "whsec_dGVzdF93ZWJob29rX3NpZ25pbmdfa2V5XzMyYnl0ZXM=".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
