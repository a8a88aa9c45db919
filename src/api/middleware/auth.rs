use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::api::AppState;
use crate::error::AppError;
use crate::models::api_token::ApiToken;
use crate::models::user::User;

/// The authenticated principal for the current request, resolved from the
/// `Authorization: Bearer` header. Handlers take this as an extractor, so
/// the principal is always passed explicitly rather than read from ambient
/// state.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let presented = header_value
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthorized)?;

        let token = ApiToken::find_by_token(&state.pool, presented)
            .await?
            .ok_or(AppError::Unauthorized)?;

        // The token row references a user, but the account may have been
        // removed since the token was minted.
        let user = User::find_by_id(&state.pool, token.user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        ApiToken::touch(&state.pool, token.id).await?;

        Ok(AuthenticatedUser { user_id: user.id })
    }
}
