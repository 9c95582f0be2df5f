use config::{Config, Environment, File};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::env;
use std::path::Path;
use thiserror::Error;

pub mod env_vars;
pub mod models;

pub use env_vars::{apply_legacy_env, legacy_env_replacement, SECRET_MARKER};
pub use models::*;

/// Errors raised while assembling the application configuration.
#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("failed to apply environment secrets: {0}")]
    Secrets(#[from] serde_json::Error),
}

/// Directory holding `default.*` and `<RUN_ENV>.*` files unless `CLINICFLOW_CONFIG_DIR` is set.
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Loads the configuration for the current process.
///
/// Sources, later ones winning: `{dir}/default.*`, `{dir}/{RUN_ENV}.*`,
/// `CLINICFLOW__SECTION__KEY` variables, `secret_from_env` markers, and finally
/// the legacy variables for values that are still unset.
pub fn load_config() -> Result<AppConfig, ConfigLoadError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let config_dir =
        env::var("CLINICFLOW_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());

    load_config_from(Path::new(&config_dir), &run_env)
}

/// Same as [`load_config`] with an explicit directory and environment name.
pub fn load_config_from(config_dir: &Path, run_env: &str) -> Result<AppConfig, ConfigLoadError> {
    let prefix = env_vars::get_config_prefix();
    let default_path = config_dir.join("default");
    let env_path = config_dir.join(run_env);

    tracing::debug!(
        "Loading configuration from {} and {}",
        default_path.display(),
        env_path.display()
    );

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(
            Environment::with_prefix(&prefix)
                .separator(env_vars::CONFIG_SEPARATOR)
                .try_parsing(true),
        );

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    let mut config = apply_env_overrides_from_marker(raw_config, |key| env::var(key).ok())?;
    apply_legacy_env(&mut config, |key| env::var(key).ok());
    Ok(config)
}

/// Recursively replaces all "secret_from_env" string values with environment variable values
fn inject_env_secrets<F>(value: &mut Value, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    fn walk<F>(path: &mut Vec<String>, obj: &mut Value, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    path.push(k.to_string());
                    walk(path, v, lookup);
                    path.pop();
                }
            }
            Value::String(s) if s == SECRET_MARKER => {
                let env_key = env_vars::secret_path_to_env_var(&path.join("."));
                match lookup(&env_key) {
                    Some(env_val) => *obj = Value::String(env_val),
                    None => {
                        tracing::warn!("env var {} not found for {}", env_key, SECRET_MARKER);
                        *obj = Value::Null;
                    }
                }
            }
            _ => {}
        }
    }

    walk(&mut Vec::new(), value, lookup);
}

/// Applies environment overrides based on "secret_from_env" markers in the config.
///
/// Markers without a matching variable become unset values.
pub fn apply_env_overrides_from_marker<F>(
    config: AppConfig,
    lookup: F,
) -> Result<AppConfig, serde_json::Error>
where
    F: Fn(&str) -> Option<String>,
{
    let mut json = serde_json::to_value(&config)?;
    inject_env_secrets(&mut json, &lookup);
    serde_json::from_value(json)
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file once per process and returns the path that was used.
///
/// `DOTENV_OVERRIDE` selects a different file; the default is `.env`. A missing
/// file is not an error.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}
