//! 配置模块职责：
//! 1. 启动时一次性读取环境变量（以及 `.env` 文件），构建 analytics 运行时配置。
//! 2. 校验内部 token 共享密钥：production 环境禁止使用默认密钥。
//! 3. 提供布尔/时长解析等通用能力，非法值回退默认值。

use std::{str::FromStr, time::Duration};

use anyhow::{anyhow, bail};
use xl_shared_protocol::internal_token::{DEFAULT_TOKEN_TTL_SEC, InternalTokenAuthority};

/// 默认监听地址。
pub(crate) const DEFAULT_ANALYTICS_ADDR: &str = "0.0.0.0:5001";
/// 未配置时的内部 token 共享密钥（仅限开发/测试环境）。
pub(crate) const DEFAULT_INTERNAL_SECRET: &str = "internal-secret-key-change-in-production";

/// 运行环境。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Environment {
    Development,
    Production,
    Test,
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "default" | "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(anyhow!("unknown APP_ENV: {other}")),
        }
    }
}

impl Environment {
    /// 环境名称。
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        }
    }
}

/// analytics 运行时配置。
#[derive(Clone)]
pub(crate) struct Config {
    /// HTTP 监听地址。
    pub(crate) addr: String,
    pub(crate) environment: Environment,
    /// 调试模式：放宽 stdout 日志级别到 debug。
    pub(crate) debug: bool,
    /// 内部 token 共享密钥。
    pub(crate) internal_secret: String,
    /// 内部 token 有效期。
    pub(crate) internal_token_ttl: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("environment", &self.environment)
            .field("debug", &self.debug)
            .field("internal_secret", &"<redacted>")
            .field("internal_token_ttl", &self.internal_token_ttl)
            .finish()
    }
}

impl Config {
    /// 读取 `.env` 与进程环境变量构建配置。
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意 key 查询函数构建配置。
    pub(crate) fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("APP_ENV")
            .map(|raw| raw.parse::<Environment>())
            .transpose()?
            .unwrap_or(Environment::Development);

        let debug = parse_bool(lookup("APP_DEBUG").as_deref())
            .unwrap_or(environment == Environment::Development);

        let internal_secret = non_empty(lookup("INTERNAL_JWT_SECRET"))
            .unwrap_or_else(|| DEFAULT_INTERNAL_SECRET.to_string());
        if environment == Environment::Production && internal_secret == DEFAULT_INTERNAL_SECRET {
            bail!("INTERNAL_JWT_SECRET must be set to a non-default value in production");
        }

        let internal_token_ttl =
            duration_from_secs(lookup("INTERNAL_TOKEN_TTL_SEC").as_deref(), DEFAULT_TOKEN_TTL_SEC);

        Ok(Self {
            addr: non_empty(lookup("ANALYTICS_ADDR"))
                .unwrap_or_else(|| DEFAULT_ANALYTICS_ADDR.to_string()),
            environment,
            debug,
            internal_secret,
            internal_token_ttl,
        })
    }

    /// 是否仍在使用默认共享密钥。
    pub(crate) fn uses_default_secret(&self) -> bool {
        self.internal_secret == DEFAULT_INTERNAL_SECRET
    }

    /// 由共享密钥与有效期构建内部 token 签发器。
    pub(crate) fn token_authority(&self) -> anyhow::Result<InternalTokenAuthority> {
        InternalTokenAuthority::new(&self.internal_secret, self.internal_token_ttl)
            .map_err(|err| anyhow!("invalid internal token config: {err}"))
    }
}

/// 去除空白，空串视为未设置。
fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// 解析布尔文本，支持常见 true/false 写法；无法识别返回 None。
fn parse_bool(raw: Option<&str>) -> Option<bool> {
    match raw?.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

/// 读取秒级时长配置，非法值回退到默认秒数。
fn duration_from_secs(raw: Option<&str>, fallback_sec: u64) -> Duration {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(fallback_sec))
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, time::Duration};

    use super::{Config, DEFAULT_ANALYTICS_ADDR, Environment, parse_bool};

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.addr, DEFAULT_ANALYTICS_ADDR);
        assert_eq!(config.environment, Environment::Development);
        assert!(config.debug);
        assert!(config.uses_default_secret());
        assert_eq!(config.internal_token_ttl, Duration::from_secs(3600));
    }

    #[test]
    fn production_rejects_default_secret() {
        assert!(config_from(&[("APP_ENV", "production")]).is_err());
        assert!(
            config_from(&[
                ("APP_ENV", "production"),
                ("INTERNAL_JWT_SECRET", "internal-secret-key-change-in-production"),
            ])
            .is_err()
        );

        let config = config_from(&[
            ("APP_ENV", "production"),
            ("INTERNAL_JWT_SECRET", "prod-secret"),
        ])
        .unwrap();
        assert!(!config.debug);
        assert!(!config.uses_default_secret());
    }

    #[test]
    fn ttl_falls_back_on_invalid_values() {
        let config = config_from(&[("INTERNAL_TOKEN_TTL_SEC", "900")]).unwrap();
        assert_eq!(config.internal_token_ttl, Duration::from_secs(900));

        for raw in ["0", "-5", "soon", ""] {
            let config = config_from(&[("INTERNAL_TOKEN_TTL_SEC", raw)]).unwrap();
            assert_eq!(config.internal_token_ttl, Duration::from_secs(3600), "{raw}");
        }
    }

    #[test]
    fn unknown_environment_is_an_error() {
        assert!(config_from(&[("APP_ENV", "staging")]).is_err());
        assert_eq!(
            config_from(&[("APP_ENV", "TEST")]).unwrap().environment,
            Environment::Test
        );
    }

    #[test]
    fn bool_parsing_accepts_common_spellings() {
        assert_eq!(parse_bool(Some(" Yes ")), Some(true));
        assert_eq!(parse_bool(Some("off")), Some(false));
        assert_eq!(parse_bool(Some("maybe")), None);
        assert_eq!(parse_bool(None), None);
    }

    #[test]
    fn config_builds_authority_and_redacts_secret() {
        let config = config_from(&[("INTERNAL_JWT_SECRET", "s3cr3t-value")]).unwrap();
        let authority = config.token_authority().unwrap();
        let token = authority.issue_token().unwrap();

        assert!(authority.verify_token(&token).is_ok());
        assert!(!format!("{config:?}").contains("s3cr3t-value"));
    }
}
