//! 用户标识：规范 UUID 校验与 ID 生成

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

/// 8-4-4-4-12 形式的十六进制 UUID，大小写均可
static CANONICAL_UUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("UUID 正则表达式无效")
});

/// 判断字符串是否为规范 UUID 文本。
///
/// 所有带 `:userId` 的路由都通过这一个函数校验，不做任何归一化：
/// 带花括号、`urn:uuid:` 前缀或无连字符的写法都会被拒绝。
pub fn is_canonical_uuid(candidate: &str) -> bool {
    CANONICAL_UUID.is_match(candidate)
}

/// ID 生成器，每次调用返回一个新的规范 UUID 字符串
pub trait IdGenerator: Send {
    fn next_id(&self) -> String;
}

/// 随机 v4 UUID，小写输出
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV4;

impl IdGenerator for UuidV4 {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
