use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct RedisSettings {
    #[serde(default)]
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub password: SecretString,
}

impl RedisSettings {
    pub fn get_redis_url(&self) -> SecretString {
        let password = self.password.expose_secret();
        let url = if password.is_empty() {
            format!("redis://{}:{}", self.host, self.port)
        } else {
            format!("redis://:{}@{}:{}", password, self.host, self.port)
        };
        SecretString::new(url.into_boxed_str())
    }
}
