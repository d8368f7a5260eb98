// Defaults for configuration, some overridable from the environment.

use std::env;

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const MODEL_VAR: &str = "GEMINI_MODEL";
pub const API_URL_VAR: &str = "GEMINI_API_URL";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";

// Use lazy_static to initialize static variables safely.
lazy_static::lazy_static! {
    pub static ref TEMPLATES_DIR: String = env::var("ASTROLOJI_TEMPLATES_DIR").unwrap_or_else(|_| "templates".to_string());
    pub static ref STATIC_DIR: String = env::var("ASTROLOJI_STATIC_DIR").unwrap_or_else(|_| "static".to_string());
}
