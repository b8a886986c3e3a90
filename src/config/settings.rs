use std::env;
use std::time::Duration;

use config::{Config, ConfigError, File};
use dotenv::dotenv;
use secrecy::{ExposeSecret, SecretString};

use crate::config::jwt::JwtSettings;
use crate::config::redis::RedisSettings;

#[derive(serde::Deserialize, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub jwt: JwtConfig,
    pub redis: RedisSettings,
    pub match_rules: MatchSettings,
    pub photos: PhotoSettings,
}

#[derive(serde::Deserialize, Debug)]
pub struct JwtConfig {
    pub secret: SecretString,
    pub expiration_hours: i64,
}

#[derive(serde::Deserialize, Debug)]
pub struct ApplicationSettings {
    pub port: u16,
    pub host: String,
    pub log_level: String,
    /// Emails that register as privileged
    #[serde(default)]
    pub admin_emails: Vec<String>,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct MatchSettings {
    pub countdown_ticks: u32,
    pub tick_ms: u64,
}

impl MatchSettings {
    pub fn countdown_delay(&self) -> Duration {
        Duration::from_millis(self.tick_ms.saturating_mul(u64::from(self.countdown_ticks)))
    }
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            countdown_ticks: 3,
            tick_ms: 1000,
        }
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct PhotoSettings {
    pub max_bytes: usize,
}

impl Default for PhotoSettings {
    fn default() -> Self {
        Self { max_bytes: 200 * 1024 }
    }
}

pub fn get_config() -> Result<Settings, ConfigError> {
    let base_path = env::current_dir()
        .map_err(|e| ConfigError::Message(format!("Failed to determine the current directory: {}", e)))?;
    let configuration_directory = base_path.join("configuration");

    dotenv().ok();

    let environment: Environment = env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(ConfigError::Message)?;

    let env_filename = format!("{}.yml", environment.as_str());
    let config = Config::builder()
        .add_source(File::from(configuration_directory.join("base.yml")))
        .add_source(File::from(configuration_directory.join(env_filename)))
        .add_source(
            config::Environment::default()
                .prefix("APP")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    let mut settings = config.try_deserialize::<Settings>()?;

    // Allow JWT secret override from environment variable
    if let Ok(jwt_secret) = env::var("JWT_SECRET") {
        settings.jwt.secret = SecretString::new(jwt_secret.into_boxed_str());
    }

    Ok(settings)
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
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
                "{} is not a supported environment. \
                Use either `local` or `production`.",
                other
            )),
        }
    }
}

pub fn get_jwt_settings(settings: &Settings) -> JwtSettings {
    JwtSettings::new(
        settings.jwt.secret.expose_secret().to_string(),
        settings.jwt.expiration_hours,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_is_ticks_times_tick_length() {
        assert_eq!(MatchSettings::default().countdown_delay(), Duration::from_secs(3));
        let fast = MatchSettings {
            countdown_ticks: 3,
            tick_ms: 10,
        };
        assert_eq!(fast.countdown_delay(), Duration::from_millis(30));
    }

    #[test]
    fn unknown_environment_is_rejected() {
        assert!(Environment::try_from("staging".to_string()).is_err());
        assert_eq!(Environment::try_from("LOCAL".to_string()).unwrap().as_str(), "local");
    }
}
