use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub progression: ProgressionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// 进度引擎参数（可在 config.toml 的 [progression] 段覆盖）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// 发帖获得的 XP
    #[serde(default = "default_xp_per_post")]
    pub xp_per_post: i64,
    /// 回帖获得的 XP
    #[serde(default = "default_xp_per_reply")]
    pub xp_per_reply: i64,
    /// 推荐成功后给推荐人的积分
    #[serde(default = "default_referral_points")]
    pub referral_points: i64,
    /// 被推荐人注册满多少天后才允许结算
    #[serde(default = "default_referral_activation_days")]
    pub referral_activation_days: i64,
    /// 超过多少天仍未达到活跃门槛则取消
    #[serde(default = "default_referral_expiry_days")]
    pub referral_expiry_days: i64,
}

fn default_xp_per_post() -> i64 {
    10
}
fn default_xp_per_reply() -> i64 {
    5
}
fn default_referral_points() -> i64 {
    100
}
fn default_referral_activation_days() -> i64 {
    2
}
fn default_referral_expiry_days() -> i64 {
    30
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            xp_per_post: default_xp_per_post(),
            xp_per_reply: default_xp_per_reply(),
            referral_points: default_referral_points(),
            referral_activation_days: default_referral_activation_days(),
            referral_expiry_days: default_referral_expiry_days(),
        }
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                // 有配置文件：先解析再用环境变量覆盖
                toml::from_str(&config_str).map_err(|e| format!("解析配置文件失败: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // 无配置文件：使用环境变量与默认值构建
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL")
                    .ok_or("缺少 DATABASE_URL 环境变量，且未找到配置文件 config.toml")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    progression: ProgressionConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("无法读取配置文件 {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("XP_PER_POST")
            && let Ok(n) = v.parse()
        {
            config.progression.xp_per_post = n;
        }
        if let Ok(v) = env::var("XP_PER_REPLY")
            && let Ok(n) = v.parse()
        {
            config.progression.xp_per_reply = n;
        }
        if let Ok(v) = env::var("REFERRAL_POINTS")
            && let Ok(n) = v.parse()
        {
            config.progression.referral_points = n;
        }
        if let Ok(v) = env::var("REFERRAL_ACTIVATION_DAYS")
            && let Ok(n) = v.parse()
        {
            config.progression.referral_activation_days = n;
        }
        if let Ok(v) = env::var("REFERRAL_EXPIRY_DAYS")
            && let Ok(n) = v.parse()
        {
            config.progression.referral_expiry_days = n;
        }

        Ok(config)
    }
}
