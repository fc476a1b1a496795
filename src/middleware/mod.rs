pub mod auth;
pub mod response;

pub use auth::{jwt_auth_middleware, AdminUser};
pub use response::{ApiResponse, ApiResult, JsonBody};
