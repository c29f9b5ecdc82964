//! analytics 共享状态：启动时构建一次，按引用分发给各请求。

use std::sync::Arc;

use xl_shared_protocol::InternalTokenAuthority;

use crate::{analytics::service::AnalyticsService, config::Config};

/// 请求间共享的只读状态。
#[derive(Clone)]
pub(crate) struct AppState {
    /// 内部 token 签发/校验器（共享密钥只读）。
    pub(crate) authority: Arc<InternalTokenAuthority>,
    pub(crate) analytics: AnalyticsService,
}

impl AppState {
    /// 由配置构建共享状态。
    pub(crate) fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            authority: Arc::new(config.token_authority()?),
            analytics: AnalyticsService,
        })
    }
}

/// 测试用状态：固定密钥与默认有效期。
#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    let config = Config::from_lookup(|key| match key {
        "APP_ENV" => Some("test".to_string()),
        "INTERNAL_JWT_SECRET" => Some("test-internal-secret".to_string()),
        _ => None,
    })
    .expect("test config");
    AppState::new(&config).expect("test state")
}
