use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Connection settings for TheMealDB. The free-tier key is "1".
#[derive(Debug, Clone, Deserialize)]
pub struct MealDbConfig {
    pub base_url: String,
    pub api_key: String,
    pub cache_ttl_secs: u64,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub debug: bool,
    pub jwt: JwtConfig,
    pub mealdb: MealDbConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let debug = std::env::var("APP_DEBUG")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "platebook".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "platebook-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: env_parse("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14),
        };
        let mealdb = MealDbConfig {
            base_url: std::env::var("MEALDB_BASE_URL")
                .unwrap_or_else(|_| "https://www.themealdb.com/api/json/v1/1".into()),
            api_key: std::env::var("MEALDB_API_KEY").unwrap_or_else(|_| "1".into()),
            cache_ttl_secs: env_parse("MEALDB_CACHE_TTL", 600),
            timeout_secs: env_parse("MEALDB_TIMEOUT", 8),
        };
        Ok(Self {
            database_url,
            debug,
            jwt,
            mealdb,
        })
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
