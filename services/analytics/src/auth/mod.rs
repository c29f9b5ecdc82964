//! 鉴权模块：内部服务 token 的请求拦截。

pub(crate) mod middleware;
