//! 请求体提取器

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::Value;

use super::error::ApiError;

/// 整体读入请求体后再解析为 JSON。
///
/// 不检查 `Content-Type`；空请求体视为 `{}`。读取失败（包括超出
/// `DefaultBodyLimit`）与 JSON 语法错误都归为内部错误。
#[derive(Debug, Clone, PartialEq)]
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Internal(format!("读取请求体失败: {}", rejection.body_text())))?;

        parse_body(&bytes).map(JsonBody)
    }
}

fn parse_body(bytes: &[u8]) -> Result<Value, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(bytes).map_err(|e| ApiError::Internal(format!("请求体 JSON 解析失败: {e}")))
}
