use axum::extract::{Query, State};

use crate::database::models::user;
use crate::middleware::auth::AdminUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::serializers::user::{accounts_response, AccountsResponse};
use crate::state::AppState;

use super::articles::{page_bounds, PageQuery};

/// GET /api/admin/users - Paginated account listing, admin only
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Query(query): Query<PageQuery>,
) -> ApiResult<AccountsResponse> {
    let (limit, offset) = page_bounds(&state, query.limit, query.offset);
    let (users, total) = user::list_users(&state.pool, limit, offset).await?;

    tracing::debug!(
        "Admin {} listed {} of {} accounts",
        admin.username,
        users.len(),
        total
    );

    Ok(ApiResponse::success(accounts_response(&users, total)))
}
