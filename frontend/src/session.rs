//! 会话存储
//!
//! 只负责持久化凭据的读写，不校验 token 格式，也不跟踪过期时间
//! （过期的 token 由后端以 401 拒绝）。

/// 持久化键值存储的抽象
///
/// 浏览器中由 `web::BrowserStorage`（localStorage）实现，测试中使用内存实现。
pub trait TokenStorage {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str) -> bool;
    fn remove(&self, key: &str) -> bool;
}

/// 会话存储
///
/// 克隆后共享同一个底层存储槽位。
#[derive(Debug, Clone)]
pub struct SessionStore<S> {
    storage: S,
    key: String,
}

impl<S: TokenStorage> SessionStore<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// 读取当前凭据；空字符串视为不存在
    pub fn token(&self) -> Option<String> {
        self.storage
            .read(&self.key)
            .filter(|token| !token.trim().is_empty())
    }

    /// 保存凭据，覆盖旧值
    pub fn set_token(&self, token: &str) {
        if !self.storage.write(&self.key, token) {
            log_warn!("[Session] Failed to persist token under '{}'", self.key);
        }
    }

    /// 删除凭据
    pub fn clear_token(&self) {
        if !self.storage.remove(&self.key) {
            log_warn!("[Session] Failed to remove token under '{}'", self.key);
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}
