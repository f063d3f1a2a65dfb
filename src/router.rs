//! 路由装配
//!
//! 所有路由与中间件在这里组装成一个 [`Router`]，`main` 与集成测试共用。

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::get,
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::core::{
    middleware::{handle_panic, request_logging_middleware},
    ApiError,
};
use crate::users::{self, handler::AppState};

pub const WELCOME_TEXT: &str = "Welcome to the CRUD API!";

pub async fn welcome() -> &'static str {
    WELCOME_TEXT
}

/// 未匹配的路径或方法
pub async fn route_not_found() -> ApiError {
    ApiError::route_not_found()
}

pub fn build_router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(welcome).fallback(route_not_found))
        .merge(users::routes())
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}
