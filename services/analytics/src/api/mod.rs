//! API 公共层：统一响应包裹与错误。

pub(crate) mod error;
pub(crate) mod response;
