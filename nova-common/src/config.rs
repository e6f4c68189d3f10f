//! Configuration loading and endpoint resolution
//!
//! Both services talk to the external processing pipeline and the published
//! asset store. Endpoint URLs resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use std::path::PathBuf;

/// Default base URL of the processing pipeline backend
pub const DEFAULT_PIPELINE_URL: &str = "http://localhost:8000";

/// Default base URL of the published asset store (documents + library listing)
pub const DEFAULT_ASSETS_URL: &str = "http://localhost:8000/assets";

/// Resolve an endpoint URL following the priority order above
pub fn resolve_endpoint(
    cli_arg: Option<&str>,
    env_var_name: &str,
    config_file_key: &str,
    default: &str,
) -> String {
    // Priority 1: Command-line argument
    if let Some(url) = cli_arg {
        return trim_trailing_slash(url);
    }

    // Priority 2: Environment variable
    if let Ok(url) = std::env::var(env_var_name) {
        if !url.is_empty() {
            return trim_trailing_slash(&url);
        }
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(url) = config.get(config_file_key).and_then(|v| v.as_str()) {
                    return trim_trailing_slash(url);
                }
            }
        }
    }

    // Priority 4: Compiled default
    default.to_string()
}

/// Locate the platform config file (`<config dir>/nova/config.toml`)
fn locate_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/nova/config.toml first, then /etc/nova/config.toml
        if let Some(path) = dirs::config_dir().map(|d| d.join("nova").join("config.toml")) {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/nova/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let path = dirs::config_dir()
            .map(|d| d.join("nova").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", path)))
        }
    }
}

fn trim_trailing_slash(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_argument_wins() {
        let url = resolve_endpoint(
            Some("http://cli:9000/"),
            "NOVA_TEST_UNSET_VAR",
            "pipeline_url",
            DEFAULT_PIPELINE_URL,
        );
        assert_eq!(url, "http://cli:9000");
    }

    #[test]
    fn env_var_beats_default() {
        std::env::set_var("NOVA_TEST_PIPELINE_A", "http://env:8001");
        let url = resolve_endpoint(
            None,
            "NOVA_TEST_PIPELINE_A",
            "pipeline_url",
            DEFAULT_PIPELINE_URL,
        );
        assert_eq!(url, "http://env:8001");
        std::env::remove_var("NOVA_TEST_PIPELINE_A");
    }

    #[test]
    fn falls_back_to_default() {
        let url = resolve_endpoint(
            None,
            "NOVA_TEST_UNSET_VAR_B",
            "no_such_key",
            DEFAULT_ASSETS_URL,
        );
        assert_eq!(url, DEFAULT_ASSETS_URL);
    }
}
