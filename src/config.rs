use std::net::SocketAddr;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    /// Signing key material for session and flash cookies, at least 64 bytes.
    pub secret_key: Option<String>,
    pub page_size: u64,
    pub autocomplete_limit: u64,
    pub section_extra_forms: usize,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://films.db?mode=rwc".to_string());

        let secret_key = std::env::var("SECRET_KEY").ok().filter(|s| !s.is_empty());

        let page_size: u64 =
            std::env::var("PAGE_SIZE").ok().and_then(|s| s.parse().ok()).unwrap_or(10);

        let autocomplete_limit: u64 =
            std::env::var("AUTOCOMPLETE_LIMIT").ok().and_then(|s| s.parse().ok()).unwrap_or(20);

        let section_extra_forms: usize =
            std::env::var("SECTION_EXTRA_FORMS").ok().and_then(|s| s.parse().ok()).unwrap_or(2);

        let admin_username = std::env::var("ADMIN_USERNAME").ok().filter(|s| !s.trim().is_empty());
        let admin_password = std::env::var("ADMIN_PASSWORD").ok().filter(|s| !s.is_empty());

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            secret_key,
            page_size: page_size.max(1),
            autocomplete_limit: autocomplete_limit.max(1),
            section_extra_forms,
            admin_username,
            admin_password,
        })
    }
}

#[cfg(test)]
impl Default for Config {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:0".parse().expect("static address"),
            database_url: "sqlite::memory:".to_string(),
            secret_key: None,
            page_size: 10,
            autocomplete_limit: 20,
            section_extra_forms: 2,
            admin_username: None,
            admin_password: None,
        }
    }
}
