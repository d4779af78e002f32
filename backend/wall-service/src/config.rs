/// Configuration management for Wall Service
///
/// Configuration is read from environment variables (a `.env` file is loaded
/// first by the binary). Production deployments must provide explicit CORS
/// origins and a JWT secret.
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const MIN_JWT_SECRET_LEN: usize = 32;
const DEV_JWT_SECRET: &str = "whisper-local-development-secret-key!";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Bearer token verification
    pub auth: AuthConfig,
    /// Inference endpoints for WhisperBot and suggestions
    pub chat: ChatConfig,
    /// Feed and leaderboard limits
    pub wall: WallConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// JWT verification settings
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared HS256 secret of the identity provider
    pub jwt_secret: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

/// Inference endpoint settings
#[derive(Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// OpenAI-compatible chat completions endpoint
    pub api_url: String,
    /// Bearer key for the inference provider; chat is disabled without it
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Text-generation endpoint used for post suggestions
    pub suggest_api_url: String,
    pub timeout_ms: u64,
}

impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("suggest_api_url", &self.suggest_api_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: "https://router.huggingface.co/v1/chat/completions".to_string(),
            api_key: None,
            model: "deepseek-ai/DeepSeek-R1:novita".to_string(),
            max_tokens: 120,
            temperature: 0.8,
            suggest_api_url: "https://api-inference.huggingface.co/models/gpt2".to_string(),
            timeout_ms: 15_000,
        }
    }
}

/// Feed and leaderboard paging limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WallConfig {
    pub feed_page_limit_max: usize,
    pub leaderboard_limit_max: usize,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            feed_page_limit_max: 100,
            leaderboard_limit_max: 100,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");
        let chat_defaults = ChatConfig::default();
        let wall_defaults = WallConfig::default();

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("WALL_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or_default("WALL_SERVICE_PORT", 8085)?,
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if production => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:5173".to_string(),
                };

                if production && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            auth: {
                let jwt_secret = match std::env::var("JWT_SECRET") {
                    Ok(secret) => secret,
                    Err(_) if production => {
                        return Err("JWT_SECRET must be set in production".to_string())
                    }
                    Err(_) => DEV_JWT_SECRET.to_string(),
                };

                if jwt_secret.len() < MIN_JWT_SECRET_LEN {
                    return Err(format!(
                        "JWT_SECRET must be at least {} bytes",
                        MIN_JWT_SECRET_LEN
                    ));
                }

                AuthConfig {
                    jwt_secret,
                    issuer: non_empty_env("JWT_ISSUER"),
                    audience: non_empty_env("JWT_AUDIENCE"),
                }
            },
            chat: ChatConfig {
                api_url: std::env::var("CHAT_API_URL").unwrap_or(chat_defaults.api_url),
                api_key: non_empty_env("CHAT_API_KEY"),
                model: std::env::var("CHAT_MODEL").unwrap_or(chat_defaults.model),
                max_tokens: parse_env_or_default("CHAT_MAX_TOKENS", chat_defaults.max_tokens)?,
                temperature: parse_env_or_default("CHAT_TEMPERATURE", chat_defaults.temperature)?,
                suggest_api_url: std::env::var("SUGGEST_API_URL")
                    .unwrap_or(chat_defaults.suggest_api_url),
                timeout_ms: parse_env_or_default("INFERENCE_TIMEOUT_MS", chat_defaults.timeout_ms)?,
            },
            wall: WallConfig {
                feed_page_limit_max: parse_env_or_default(
                    "FEED_PAGE_LIMIT_MAX",
                    wall_defaults.feed_page_limit_max,
                )?,
                leaderboard_limit_max: parse_env_or_default(
                    "LEADERBOARD_LIMIT_MAX",
                    wall_defaults.leaderboard_limit_max,
                )?,
            },
        })
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_env_or_default_reports_bad_values() {
        std::env::set_var("WALL_TEST_BAD_PORT", "eighty");
        let err = parse_env_or_default::<u16>("WALL_TEST_BAD_PORT", 1).unwrap_err();
        assert!(err.contains("WALL_TEST_BAD_PORT"));
        std::env::remove_var("WALL_TEST_BAD_PORT");
    }

    #[test]
    fn parse_env_or_default_falls_back_when_unset() {
        assert_eq!(parse_env_or_default("WALL_TEST_UNSET_KEY", 42u32).unwrap(), 42);
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let auth = AuthConfig {
            jwt_secret: "super-secret-value-that-is-long-enough".into(),
            issuer: None,
            audience: None,
        };
        assert!(!format!("{:?}", auth).contains("super-secret"));

        let chat = ChatConfig {
            api_key: Some("hf_abcdef".into()),
            ..ChatConfig::default()
        };
        assert!(!format!("{:?}", chat).contains("hf_abcdef"));
    }
}
