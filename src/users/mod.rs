//! 用户资源：模型、存储与 `/api/users` 路由

pub mod handler;
pub mod id;
pub mod model;
pub mod store;

use axum::{routing::get, Router};

use crate::router::route_not_found;
use handler::{create_user, delete_user, get_user, list_users, update_user, AppState};

pub use handler::SharedStore;
pub use id::{is_canonical_uuid, IdGenerator, UuidV4};
pub use model::{User, UserField, UserPayload};
pub use store::{MergePolicy, StoreError, UserStore};

/// `/api/users` 下的路由；未支持的方法同样返回 404 信封
///
/// 集合路径带不带结尾斜杠都可访问。
pub fn routes() -> Router<AppState> {
    let collection = get(list_users).post(create_user).fallback(route_not_found);

    Router::new()
        .route("/api/users", collection.clone())
        .route("/api/users/", collection)
        .route(
            "/api/users/:user_id",
            get(get_user)
                .put(update_user)
                .delete(delete_user)
                .fallback(route_not_found),
        )
}
