// SPDX-FileCopyrightText: 2023 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use config::{Config, ConfigError, File, Source};
use serde::Deserialize;

/// Configuration of the client.
#[derive(Deserialize, Clone, Debug)]
pub struct ClientSettings {
    pub application: ApplicationSettings,
    #[serde(default)]
    pub http: HttpSettings,
}

/// Where the chat server lives.
#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    /// Base URL or hostname:port tuple of the server
    pub base_url: String,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct HttpSettings {
    pub user_agent: String,
    pub pool_idle_timeout_secs: u64,
    /// No timeout is applied if unset.
    pub request_timeout_secs: Option<u64>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: "ChatClient/0.1".to_owned(),
            pool_idle_timeout_secs: 4,
            request_timeout_secs: None,
        }
    }
}

/// The possible runtime environment for our application.
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn from_env() -> Result<Self, String> {
        std::env::var("CHAT_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{other} is not a supported environment. Use either `local` or `production`."
            )),
        }
    }
}

/// Load the configuration from the configuration directory `{prefix}configuration`.
pub fn get_configuration(prefix: &str) -> Result<ClientSettings, ConfigError> {
    let base_path = std::env::current_dir().map_err(|error| ConfigError::Foreign(error.into()))?;
    let configuration_directory = base_path.join(format!("{prefix}configuration"));

    // Detect the running environment.
    // Default to `local` if unspecified.
    let environment = Environment::from_env().map_err(ConfigError::Message)?;

    get_configuration_impl(
        File::from(configuration_directory.join("base")).required(true),
        File::from(configuration_directory.join(environment.as_str())).required(false),
    )
}

/// Load the configuration from the given configuration strings (in YAML format).
pub fn get_configuration_from_str(
    base: &str,
    environment: &str,
) -> Result<ClientSettings, ConfigError> {
    get_configuration_impl(
        File::from_str(base, config::FileFormat::Yaml),
        File::from_str(environment, config::FileFormat::Yaml),
    )
}

fn get_configuration_impl(
    base: impl Source + Send + Sync + 'static,
    environment: impl Source + Send + Sync + 'static,
) -> Result<ClientSettings, ConfigError> {
    let builder = Config::builder()
        // Read the "default" configuration file
        .add_source(base)
        // Layer on the environment-specific values.
        .add_source(environment)
        // Add in settings from environment variables (with a prefix of CHAT and '__' as separator)
        // E.g. `CHAT__HTTP__USER_AGENT=Bot/1.0` would set `ClientSettings.http.user_agent`
        .add_source(config::Environment::with_prefix("CHAT").separator("__"));
    builder.build()?.try_deserialize()
}
