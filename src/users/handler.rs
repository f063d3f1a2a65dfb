//! 用户资源处理器
//!
//! 每个处理器先校验路径/请求体，再调用一次 [`UserStore`] 操作，
//! 最后把结果映射为状态码与响应信封。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
};
use tracing::warn;

use super::{
    id::is_canonical_uuid,
    model::{User, UserPayload},
    store::UserStore,
};
use crate::core::{ApiError, Envelope, JsonBody};

pub type SharedStore = Arc<Mutex<UserStore>>;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
}

impl AppState {
    pub fn new(store: UserStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// 锁只在一次同步的存储调用期间持有；中毒（之前的请求 panic 过）时继续使用内部数据
    fn store(&self) -> MutexGuard<'_, UserStore> {
        self.store.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            warn!("用户存储锁已中毒，继续使用现有数据");
            poisoned.into_inner()
        })
    }
}

/// 路径中的用户 id，只接受标准 UUID 文本
///
/// 百分号解码失败（如 `%FF`）与格式不符一样，拒绝为 400 信封。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::invalid_user_id())?;
        if is_canonical_uuid(&raw) {
            Ok(UserId(raw))
        } else {
            Err(ApiError::invalid_user_id())
        }
    }
}

pub async fn list_users(State(state): State<AppState>) -> Envelope<Vec<User>> {
    let users = state.store().list().to_vec();
    Envelope::ok("Users data fetched successfully", users)
}

pub async fn get_user(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> Result<Envelope<User>, ApiError> {
    let user = state.store().get(&id)?.clone();
    Ok(Envelope::ok("User data fetched successfully", user))
}

pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<Envelope<User>, ApiError> {
    let user = state.store().create(UserPayload::from_json(body))?;
    Ok(Envelope::created("User created successfully", user))
}

pub async fn update_user(
    State(state): State<AppState>,
    UserId(id): UserId,
    JsonBody(body): JsonBody,
) -> Result<Envelope<User>, ApiError> {
    let user = state.store().update(&id, UserPayload::from_json(body))?;
    Ok(Envelope::ok("User updated successfully", user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> Result<StatusCode, ApiError> {
    state.store().delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
