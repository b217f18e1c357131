use config::{Config, File};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub email: EmailSettings,
}

#[derive(Deserialize, Debug)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub name: String,
    pub pool_size: u32,
}

impl DatabaseSettings {
    // Connection string to the postgres instance, without a database selected.
    pub fn get_database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }

    pub fn get_database_table_url(&self) -> String {
        format!("{}/{}", self.get_database_url(), self.name)
    }
}

#[derive(Deserialize, Debug)]
pub struct JwtSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_expiry_minutes: u64,
    pub refresh_expiry_days: u64,
}

#[derive(Deserialize, Debug)]
pub struct EmailSettings {
    pub api_uri: String,
    pub sender: String,
    pub authorization_token: String,
    pub timeout_seconds: u64,
}

impl Settings {
    pub fn get() -> Self {
        Config::builder()
            .add_source(File::with_name("configuration/base.yaml"))
            .build()
            .expect("Failed to get configuration")
            .try_deserialize::<Settings>()
            .expect("Failed to deserialize to Settings struct")
    }
}
