//! # CRUD API
//!
//! 在内存中管理用户记录的 HTTP/JSON 服务：
//! - `users`：用户模型、ID 规则与唯一持有用户集合的 [`UserStore`](users::UserStore)
//! - `core`：错误类型、统一响应信封、请求体提取与中间件
//! - `router`：把处理器与中间件组装成 axum [`Router`](axum::Router)
//! - `config` / `infrastructure`：环境配置与日志

pub mod config;
pub mod core;
pub mod infrastructure;
pub mod router;
pub mod users;

pub use config::{Config, ConfigError};
pub use router::build_router;
pub use users::handler::AppState;
