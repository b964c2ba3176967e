use serde::Deserialize;

const DEFAULTS: &str = include_str!("../config/default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Base64-encoded HMAC key for signing tokens.
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub google_authorization_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// Comma separated origins, or `*`.
    pub allowed_origins: String,
}

impl CorsConfig {
    pub fn origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
}

impl AppConfig {
    /// The embedded defaults with no file or environment overrides.
    pub fn defaults() -> anyhow::Result<Self> {
        let cfg = ::config::Config::builder()
            .add_source(::config::File::from_str(DEFAULTS, ::config::FileFormat::Toml))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }
}

pub fn load() -> anyhow::Result<AppConfig> {
    let _ = dotenvy::dotenv();

    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(DEFAULTS, ::config::FileFormat::Toml))
        .add_source(::config::File::with_name("kooking").required(false));

    if let Ok(custom_path) = std::env::var("KOOKING_CONFIG") {
        builder = builder.add_source(::config::File::with_name(&custom_path).required(false));
    }
    builder = builder.add_source(::config::Environment::with_prefix("KOOKING").separator("__"));

    if let Ok(url) = std::env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", url)?;
    }

    let app_cfg: AppConfig = builder.build()?.try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

fn validate(cfg: &AppConfig) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        return Err(anyhow::anyhow!("invalid server.port: {}", cfg.server.port));
    }
    if cfg.database.max_connections == 0 {
        return Err(anyhow::anyhow!("database.max_connections must be > 0"));
    }
    if cfg.auth.jwt_secret.trim().is_empty() {
        return Err(anyhow::anyhow!(
            "auth.jwt_secret is not set (KOOKING__AUTH__JWT_SECRET)"
        ));
    }
    if cfg.auth.token_ttl_hours < 1 {
        return Err(anyhow::anyhow!("auth.token_ttl_hours must be >= 1"));
    }
    if cfg.cors.origins().is_empty() {
        return Err(anyhow::anyhow!("cors.allowed_origins must name at least one origin"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_secret() -> AppConfig {
        let mut cfg = AppConfig::defaults().unwrap();
        cfg.auth.jwt_secret = "a29va2luZy1jb25maWctdGVzdC1rZXktMDEyMzQ1Njc4OQ==".to_string();
        cfg
    }

    #[test]
    fn test_embedded_defaults_need_only_a_secret() {
        let cfg = AppConfig::defaults().unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.auth.token_ttl_hours, 24);
        assert!(cfg.auth.jwt_secret.is_empty());
        let err = validate(&cfg).unwrap_err();
        assert!(err.to_string().contains("jwt_secret"));

        validate(&with_secret()).unwrap();
    }

    #[test]
    fn test_validate_rejects_zero_pool() {
        let mut cfg = with_secret();
        cfg.database.max_connections = 0;
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let mut cfg = with_secret();
        cfg.auth.token_ttl_hours = 0;
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_cors_origins_split() {
        let cors = CorsConfig {
            allowed_origins: "http://a.test, http://b.test,,".to_string(),
        };
        assert_eq!(cors.origins(), vec!["http://a.test", "http://b.test"]);
    }
}
