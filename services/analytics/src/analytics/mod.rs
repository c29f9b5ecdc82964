//! 分析模块：占位统计服务与对应 HTTP 接口。

pub(crate) mod handlers;
pub(crate) mod service;
