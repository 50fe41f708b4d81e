use anyhow::{Context, Result};

/// アプリケーション全体の設定
/// 環境変数からの読み込みは起動時に一度だけ行う
#[derive(Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub bot: BotConfig,
    pub http: HttpConfig,
    pub export: ExportConfig,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let database = DatabaseConfig {
            host: std::env::var("DATABASE_HOST").context("DATABASE_HOST is not set")?,
            port: std::env::var("DATABASE_PORT")
                .context("DATABASE_PORT is not set")?
                .parse::<u16>()
                .context("DATABASE_PORT must be a port number")?,
            username: std::env::var("DATABASE_USERNAME").context("DATABASE_USERNAME is not set")?,
            password: std::env::var("DATABASE_PASSWORD").context("DATABASE_PASSWORD is not set")?,
            database: std::env::var("DATABASE_NAME").context("DATABASE_NAME is not set")?,
        };
        let redis = RedisConfig {
            host: std::env::var("REDIS_HOST").context("REDIS_HOST is not set")?,
            port: std::env::var("REDIS_PORT")
                .context("REDIS_PORT is not set")?
                .parse::<u16>()
                .context("REDIS_PORT must be a port number")?,
        };
        // ボットの資格情報がない場合は起動できない（致命的エラー）
        let bot = BotConfig {
            token: std::env::var("BOT_TOKEN").context("BOT_TOKEN is not set")?,
        };
        let http = HttpConfig {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse::<u16>()
                .context("PORT must be a port number")?,
            secret_key: std::env::var("SECRET_KEY").context("SECRET_KEY is not set")?,
        };
        let export = ExportConfig {
            username: std::env::var("EXPORT_API_USERNAME")
                .context("EXPORT_API_USERNAME is not set")?,
            password: std::env::var("EXPORT_API_PASSWORD")
                .context("EXPORT_API_PASSWORD is not set")?,
        };
        let session = SessionConfig {
            ttl: std::env::var("REGISTRATION_SESSION_TTL")
                .unwrap_or_else(|_| "86400".into())
                .parse::<u64>()
                .context("REGISTRATION_SESSION_TTL must be seconds")?,
        };
        Ok(Self {
            database,
            redis,
            bot,
            http,
            export,
            session,
        })
    }
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

#[derive(Clone)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
pub struct BotConfig {
    pub token: String,
}

#[derive(Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    pub secret_key: String,
}

#[derive(Clone)]
pub struct ExportConfig {
    pub username: String,
    pub password: String,
}

/// 登録セッションの保持期間（秒）
/// 放置されたセッションは TTL で自動的に破棄される
#[derive(Clone)]
pub struct SessionConfig {
    pub ttl: u64,
}
