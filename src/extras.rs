//! Static resource and prompt template served when `--extras` is enabled.

use serde::{Deserialize, Serialize};

pub const APP_CONFIG_URI: &str = "config://app";
pub const APP_CONFIG_NAME: &str = "app_config";
pub const CODE_PROMPT_NAME: &str = "generate_code_request";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub theme: String,
    pub version: String,
    pub features: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            version: "1.0".to_string(),
            features: vec![
                "tools".to_string(),
                "resources".to_string(),
                "prompts".to_string(),
            ],
        }
    }
}

pub fn app_config_json() -> String {
    serde_json::to_string_pretty(&AppConfig::default()).unwrap_or_else(|_| "{}".to_string())
}

/// Instruction text for the code prompt. Inputs are interpolated as-is.
pub fn code_request_text(language: &str, task: &str) -> String {
    format!(
        "Write a {} function that does the following: {}",
        language, task
    )
}
