//! 用户数据模型

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub age: u32,
    pub hobbies: Vec<String>,
}

/// 可校验的用户字段名，顺序即错误信息中的列出顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UserField {
    Username,
    Age,
    Hobbies,
}

impl UserField {
    pub fn as_str(self) -> &'static str {
        match self {
            UserField::Username => "username",
            UserField::Age => "age",
            UserField::Hobbies => "hobbies",
        }
    }
}

impl std::fmt::Display for UserField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 创建/更新请求体。
///
/// 保留原始 JSON 值，区分"字段缺失"(`None`) 与"字段存在但为 null"
/// (`Some(Value::Null)`)，类型校验交给 [`UserStore`](super::store::UserStore)。
/// 请求体中的 `id` 以及其他未知字段一律忽略。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPayload {
    pub username: Option<Value>,
    pub age: Option<Value>,
    pub hobbies: Option<Value>,
}

impl UserPayload {
    /// 非对象的 JSON 值视为空对象
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::from_map(map),
            _ => Self::default(),
        }
    }

    fn from_map(mut map: Map<String, Value>) -> Self {
        Self {
            username: map.remove("username"),
            age: map.remove("age"),
            hobbies: map.remove("hobbies"),
        }
    }
}

/// 非空（去除首尾空白后）字符串，返回去除空白后的值
pub(crate) fn parse_username(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// 正整数，且能放进 u32
pub(crate) fn parse_age(value: &Value) -> Option<u32> {
    value
        .as_u64()
        .filter(|age| *age > 0)
        .and_then(|age| u32::try_from(age).ok())
}

/// 字符串数组，允许为空
pub(crate) fn parse_hobbies(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|hobby| hobby.as_str().map(str::to_string))
        .collect()
}

/// JavaScript 意义上的真值：null、false、0、NaN 和空字符串为假
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
