//! 核心中间件模块

use std::any::Any;
use std::time::{Duration, Instant};

use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use super::error::ApiError;

/// 请求日志中间件，每个请求结束后输出一行结构化日志
pub async fn request_logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);

    let response = next.run(req).await;
    let status = response.status();
    let elapsed_ms = elapsed_millis(start.elapsed());

    if status.is_server_error() {
        warn!(%method, %path, status = status.as_u16(), elapsed_ms, ?user_agent, "请求失败");
    } else {
        info!(%method, %path, status = status.as_u16(), elapsed_ms, ?user_agent, "请求完成");
    }

    response
}

/// 毫秒数超出 `u64` 时取上限
fn elapsed_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// `CatchPanicLayer` 的响应构造器：panic 信息只进日志，调用方拿到通用 500 信封
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "未知 panic".to_string()
    };

    ApiError::Internal(format!("处理器 panic: {detail}")).into_response()
}
