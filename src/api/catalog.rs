//! Aggregate catalog endpoints

use axum::{extract::State, Json};

use crate::{error::AppResult, services::catalog::AvailableResources};

use super::AuthenticatedUser;

/// Everything the current user may request, grouped by kind
#[utoipa::path(
    get,
    path = "/catalog/available",
    tag = "catalog",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Available resources", body = AvailableResources)
    )
)]
pub async fn available_resources(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<AvailableResources>> {
    let resources = state.services.catalog.available_resources().await?;
    Ok(Json(resources))
}
