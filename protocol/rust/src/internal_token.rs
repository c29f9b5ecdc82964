//! 内部服务 token：HS256 紧凑签名格式（`header.claims.signature`，均为无填充 base64url）。
//!
//! token 无状态、不落盘；校验所需信息全部在签名负载内。签名密钥在进程启动时注入一次，
//! 运行期不轮换。

use std::{fmt, time::Duration};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::unix_now;

/// 携带内部 token 的请求头（HTTP 头大小写不敏感）。
pub const INTERNAL_TOKEN_HEADER: &str = "x-internal-token";
/// 内部调用方主体标识。
pub const INTERNAL_SUBJECT: &str = "internal-service";
/// 内部调用方能力标签。
pub const INTERNAL_ROLE: &str = "INTERNAL_SERVICE";
/// 默认 token 有效期（秒）。
pub const DEFAULT_TOKEN_TTL_SEC: u64 = 3600;
/// 唯一支持的签名算法。
const TOKEN_ALGORITHM: &str = "HS256";
const TOKEN_TYPE: &str = "JWT";

type HmacSha256 = Hmac<Sha256>;

/// token 解码后的声明。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalClaims {
    #[serde(rename = "sub")]
    pub subject: String,
    pub role: String,
    #[serde(rename = "iat")]
    pub issued_at: u64,
    #[serde(rename = "exp")]
    pub expires_at: u64,
}

impl InternalClaims {
    /// 以固定主体/角色构造一份 `now` 起生效的声明。
    fn issued_at(now: u64, lifetime_sec: u64) -> Self {
        Self {
            subject: INTERNAL_SUBJECT.to_string(),
            role: INTERNAL_ROLE.to_string(),
            issued_at: now,
            expires_at: now.saturating_add(lifetime_sec),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// 签发器构造或签发失败。
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("internal token secret must not be empty")]
    EmptySecret,
    #[error("internal token secret rejected by signer")]
    InvalidSecret,
    #[error("internal token lifetime must be at least one second")]
    InvalidLifetime,
    #[error("encode internal token failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// token 无效的具体原因。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidTokenReason {
    #[error("token is malformed")]
    Malformed,
    #[error("unsupported signing algorithm")]
    UnsupportedAlgorithm,
    #[error("signature verification failed")]
    BadSignature,
    #[error("token claims are invalid")]
    InvalidClaims,
    #[error("token has expired")]
    Expired,
}

/// 校验失败：缺失或无效，两者对当前请求都是终态。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Internal token required")]
    MissingToken,
    #[error("Invalid internal token: {0}")]
    InvalidToken(InvalidTokenReason),
}

impl AuthError {
    /// 对外错误码。
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::InvalidToken(_) => "INVALID_TOKEN",
        }
    }
}

impl From<InvalidTokenReason> for AuthError {
    fn from(reason: InvalidTokenReason) -> Self {
        AuthError::InvalidToken(reason)
    }
}

/// 内部 token 签发与校验器，持有共享密钥与有效期。
#[derive(Clone)]
pub struct InternalTokenAuthority {
    mac: HmacSha256,
    lifetime_sec: u64,
}

impl fmt::Debug for InternalTokenAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InternalTokenAuthority")
            .field("secret", &"<redacted>")
            .field("lifetime_sec", &self.lifetime_sec)
            .finish()
    }
}

impl InternalTokenAuthority {
    /// 以共享密钥与有效期构造签发器。
    pub fn new(secret: impl AsRef<[u8]>, lifetime: Duration) -> Result<Self, TokenError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        let lifetime_sec = lifetime.as_secs();
        if lifetime_sec == 0 {
            return Err(TokenError::InvalidLifetime);
        }
        let mac = HmacSha256::new_from_slice(secret).map_err(|_| TokenError::InvalidSecret)?;
        Ok(Self { mac, lifetime_sec })
    }

    /// token 有效期。
    pub fn lifetime(&self) -> Duration {
        Duration::from_secs(self.lifetime_sec)
    }

    /// 签发一枚自当前时刻起生效的 token。
    pub fn issue_token(&self) -> Result<String, TokenError> {
        self.issue_token_at(unix_now())
    }

    /// 以指定时刻（unix 秒）签发 token。
    pub fn issue_token_at(&self, now: u64) -> Result<String, TokenError> {
        self.sign(&InternalClaims::issued_at(now, self.lifetime_sec))
    }

    /// 按当前时刻校验 token。
    pub fn verify_token(&self, token: &str) -> Result<InternalClaims, AuthError> {
        self.verify_token_at(token, unix_now())
    }

    /// 按指定时刻校验 token：格式 -> 算法 -> 签名 -> 声明 -> 过期。
    pub fn verify_token_at(&self, token: &str, now: u64) -> Result<InternalClaims, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let mut parts = token.split('.');
        let header_b64 = parts.next().unwrap_or_default();
        let claims_b64 = parts.next().unwrap_or_default();
        let sig_b64 = parts.next().unwrap_or_default();
        if header_b64.is_empty()
            || claims_b64.is_empty()
            || sig_b64.is_empty()
            || parts.next().is_some()
        {
            return Err(InvalidTokenReason::Malformed.into());
        }

        let header: TokenHeader = decode_segment(header_b64)?;
        if header.alg != TOKEN_ALGORITHM {
            return Err(InvalidTokenReason::UnsupportedAlgorithm.into());
        }

        let sig = URL_SAFE_NO_PAD
            .decode(sig_b64.as_bytes())
            .map_err(|_| InvalidTokenReason::Malformed)?;
        let mut mac = self.mac.clone();
        mac.update(signing_input(header_b64, claims_b64).as_bytes());
        mac.verify_slice(&sig)
            .map_err(|_| InvalidTokenReason::BadSignature)?;

        let claims: InternalClaims =
            decode_segment(claims_b64).map_err(|_| InvalidTokenReason::InvalidClaims)?;
        if claims.expires_at <= claims.issued_at {
            return Err(InvalidTokenReason::InvalidClaims.into());
        }
        if now >= claims.expires_at {
            return Err(InvalidTokenReason::Expired.into());
        }

        Ok(claims)
    }

    fn sign(&self, claims: &InternalClaims) -> Result<String, TokenError> {
        let header = TokenHeader {
            alg: TOKEN_ALGORITHM.to_string(),
            typ: Some(TOKEN_TYPE.to_string()),
        };
        let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?);
        let claims_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);

        let mut mac = self.mac.clone();
        mac.update(signing_input(&header_b64, &claims_b64).as_bytes());
        let sig_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{header_b64}.{claims_b64}.{sig_b64}"))
    }
}

fn signing_input(header_b64: &str, claims_b64: &str) -> String {
    format!("{header_b64}.{claims_b64}")
}

/// 解码单个 base64url JSON 段。
fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, InvalidTokenReason> {
    let raw = URL_SAFE_NO_PAD
        .decode(segment.as_bytes())
        .map_err(|_| InvalidTokenReason::Malformed)?;
    serde_json::from_slice(&raw).map_err(|_| InvalidTokenReason::Malformed)
}
