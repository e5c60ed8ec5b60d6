pub mod auth;
pub mod response;

pub use auth::{resolve_identity, AdminUser, AuthUser, MaybeUser};
pub use response::{ApiResponse, ApiResult};
