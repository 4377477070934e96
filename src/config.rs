use serde::{Deserialize, Serialize};

use std::{env, fmt, fs, path::Path};

/// Prefix of the environment variables read when no config file is present.
pub const ENV_PREFIX: &str = "CONTACT_RELAY_";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// Plain connection upgraded with STARTTLS, which is required.
    #[default]
    StartTls,
    /// TLS from the first byte (SMTPS).
    Tls,
    /// No encryption at all. Only meant for local relays.
    None,
}

impl SmtpSecurity {
    pub const fn default_port(self) -> u16 {
        match self {
            Self::StartTls => 587,
            Self::Tls => 465,
            Self::None => 25,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    pub recipient: String,
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
    pub sender_address: String,
    pub smtp_host: String,
    #[serde(default)]
    pub smtp_port: Option<u16>,
    #[serde(default)]
    pub smtp_security: SmtpSecurity,
    #[serde(default)]
    pub smtp_username: String,
    #[serde(default)]
    pub smtp_password: String,
    #[serde(default = "default_expose_transport_errors")]
    pub expose_transport_errors: bool,
}

const fn default_port() -> u16 {
    5000
}

fn default_sender_name() -> String {
    "Avera Website".to_string()
}

const fn default_expose_transport_errors() -> bool {
    true
}

impl Config {
    pub fn smtp_port(&self) -> u16 {
        self.smtp_port
            .unwrap_or_else(|| self.smtp_security.default_port())
    }
}

// Hand-written so the SMTP password never ends up in the logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("recipient", &self.recipient)
            .field("sender_name", &self.sender_name)
            .field("sender_address", &self.sender_address)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port())
            .field("smtp_security", &self.smtp_security)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"<redacted>")
            .field("expose_transport_errors", &self.expose_transport_errors)
            .finish()
    }
}

fn load_from_file(path: &str) -> Result<Config, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(Into::into)
}

fn load_from_env() -> Result<Config, Box<dyn std::error::Error>> {
    envy::prefixed(ENV_PREFIX)
        .from_env::<Config>()
        .map_err(Into::into)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ConfigSource {
    File(String),
    ExampleFile,
    Env,
}

/// Environment variables beat the example file once the relay host is set
/// there, so a checkout never silently runs on placeholder credentials.
fn select_source(
    config_path: &str,
    exists: impl Fn(&str) -> bool,
    env_configured: bool,
) -> ConfigSource {
    if exists(config_path) {
        ConfigSource::File(config_path.to_string())
    } else if exists("config.yaml") {
        ConfigSource::File("config.yaml".to_string())
    } else if !env_configured && exists("config.example.yaml") {
        ConfigSource::ExampleFile
    } else {
        ConfigSource::Env
    }
}

pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    // Retrieve env variable
    let config_path =
        env::var("CONTACT_RELAY_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    let env_configured = env::var_os(format!("{ENV_PREFIX}SMTP_HOST")).is_some();

    match select_source(&config_path, |p| Path::new(p).exists(), env_configured) {
        ConfigSource::File(path) => {
            if path != config_path {
                tracing::warn!(
                    "Config file '{}' not found, falling back to '{}'",
                    config_path,
                    path
                );
            }
            tracing::info!("Loading configuration from '{}'", path);
            load_from_file(&path)
        }
        ConfigSource::ExampleFile => {
            tracing::warn!(
                "Config file '{}' and 'config.yaml' not found and {}SMTP_HOST is unset, \
                 falling back to 'config.example.yaml'\
                 \n This file should not be used and should be replaced with actual data",
                config_path,
                ENV_PREFIX
            );
            load_from_file("config.example.yaml")
        }
        ConfigSource::Env => {
            tracing::info!(
                "No config file found, loading configuration from {}* environment variables",
                ENV_PREFIX
            );
            match load_from_env() {
                Ok(config) => {
                    tracing::info!("Successfully loaded configuration from environment variables");
                    Ok(config)
                }
                Err(e) => Err(format!(
                    "Config file not found and environment variables are incomplete. \
                     Tried: '{config_path}', 'config.yaml', 'config.example.yaml', and {ENV_PREFIX}* \
                     environment variables. Error: {e}"
                )
                .into()),
            }
        }
    }
}
