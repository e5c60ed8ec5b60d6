use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::database::models::user::{self, User};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated account context, inserted into request extensions by
/// [`resolve_identity`] and read back by the extractors below.
#[derive(Clone, Debug)]
pub struct AuthUser(pub User);

/// Identity resolution middleware, applied to the whole `/api` tree.
///
/// No `Authorization` header means the request proceeds anonymously; a
/// header that is present but does not verify is rejected outright, even
/// on routes that would have accepted an anonymous request. Verified
/// tokens whose account has vanished are treated as invalid.
pub async fn resolve_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = match extract_token(request.headers()) {
        Some(token) => token,
        None => return Ok(next.run(request).await),
    };

    let user_id = state.tokens.verify(&token)?;
    let user = user::find_user_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

    request.extensions_mut().insert(AuthUser(user));
    Ok(next.run(request).await)
}

/// Pull the token out of an `Authorization: Token <jwt>` header. Any other
/// scheme counts as no token presented.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Token ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))
    }
}

/// Lenient variant for routes that serve anonymous viewers too.
#[derive(Clone, Debug)]
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(
            parts.extensions.get::<AuthUser>().map(|auth| auth.0.clone()),
        ))
    }
}

/// Elevated tier. An unauthenticated request gets 401; an authenticated
/// account without the admin role gets 403.
#[derive(Clone, Debug)]
pub struct AdminUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

        if !user.is_admin() {
            return Err(ApiError::forbidden("Admin access required"));
        }

        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn token_scheme_is_extracted() {
        let headers = headers_with("Token abc.def.ghi");
        assert_eq!(extract_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn other_schemes_count_as_absent() {
        assert!(extract_token(&headers_with("Bearer abc.def.ghi")).is_none());
        assert!(extract_token(&headers_with("abc.def.ghi")).is_none());
        assert!(extract_token(&headers_with("Token ")).is_none());
        assert!(extract_token(&HeaderMap::new()).is_none());
    }
}
