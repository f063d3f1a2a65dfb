//! HTTP 边界的公共部分：错误、响应信封、请求体提取与中间件

pub mod error;
pub mod extract;
pub mod middleware;
pub mod response;

pub use error::ApiError;
pub use extract::JsonBody;
pub use response::Envelope;
