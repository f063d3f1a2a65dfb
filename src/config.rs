//! 服务配置
//!
//! 启动时先加载 `.env`（不存在也可以），再从环境变量读取。所有配置项都有默认值。

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::users::MergePolicy;

/// 服务配置结构
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// HTTP 服务配置
    pub http: HttpConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 用户资源配置
    pub users: UsersConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
    /// 绑定地址
    pub bind_address: String,
    /// HTTP 服务端口
    pub port: u16,
    /// 请求体最大字节数
    pub body_limit: usize,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// 日志级别 (trace, debug, info, warn, error)
    pub level: String,
    /// 日志文件目录，未设置时只输出到控制台
    pub log_dir: Option<PathBuf>,
    /// 日志文件名前缀
    pub file_prefix: String,
}

/// 用户资源配置
#[derive(Debug, Clone, PartialEq)]
pub struct UsersConfig {
    /// 更新时沿用真值判断的旧合并语义
    pub preserve_legacy_merge: bool,
    /// 启动时写入示例用户
    pub seed_sample_users: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            logging: LoggingConfig::default(),
            users: UsersConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
            body_limit: 100 * 1024,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            file_prefix: "crud-api".to_string(),
        }
    }
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            preserve_legacy_merge: false,
            seed_sample_users: true,
        }
    }
}

impl HttpConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|_| ConfigError::Invalid {
                key: "HOST",
                value: self.bind_address.clone(),
            })
    }
}

impl UsersConfig {
    pub fn merge_policy(&self) -> MergePolicy {
        MergePolicy::from_legacy_flag(self.preserve_legacy_merge)
    }
}

impl Config {
    /// 加载 `.env` 后从进程环境读取并校验
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// 通过 `lookup` 读取各配置项，缺失的项使用默认值
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("HOST") {
            config.http.bind_address = host.trim().to_string();
        }
        if let Some(port) = get("PORT") {
            config.http.port = parse_number("PORT", &port)?;
        }
        if let Some(limit) = get("BODY_LIMIT") {
            config.http.body_limit = parse_number("BODY_LIMIT", &limit)?;
        }
        if let Some(level) = get("LOG_LEVEL") {
            config.logging.level = level.trim().to_lowercase();
        }
        if let Some(dir) = get("LOG_DIR") {
            config.logging.log_dir = Some(PathBuf::from(dir.trim()));
        }
        if let Some(prefix) = get("LOG_FILE_PREFIX") {
            config.logging.file_prefix = prefix.trim().to_string();
        }
        if let Some(flag) = get("PRESERVE_LEGACY_MERGE") {
            config.users.preserve_legacy_merge = parse_bool("PRESERVE_LEGACY_MERGE", &flag)?;
        }
        if let Some(flag) = get("SEED_USERS") {
            config.users.seed_sample_users = parse_bool("SEED_USERS", &flag)?;
        }

        Ok(config)
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::Validation("HTTP端口必须大于0".to_string()));
        }
        if self.http.bind_address.is_empty() {
            return Err(ConfigError::Validation("绑定地址不能为空".to_string()));
        }
        if self.http.body_limit == 0 {
            return Err(ConfigError::Validation("请求体上限必须大于0".to_string()));
        }
        self.http.socket_addr()?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "无效的日志级别: {}，有效值: {:?}",
                self.logging.level, valid_levels
            )));
        }
        if self.logging.file_prefix.is_empty() {
            return Err(ConfigError::Validation("日志文件前缀不能为空".to_string()));
        }

        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
    })
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
        }),
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("环境变量 {key} 的值无效: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("配置验证错误: {0}")]
    Validation(String),
}
