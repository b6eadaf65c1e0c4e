// src/handlers/dashboard.rs

use axum::{extract::State, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::roles::{BourgmestreSeul, GouverneurSeul, RoleAutorise},
    models::{
        auth::Acteur,
        dashboard::{StatsAdminGeneral, StatsBourgmestre},
    },
};

// GET /api/dashboard/admin-general
#[utoipa::path(
    get,
    path = "/api/dashboard/admin-general",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Compteurs de la province du gouverneur", body = StatsAdminGeneral),
        (status = 401, description = "Non authentifié"),
        (status = 403, description = "Réservé au gouverneur")
    ),
    security(("api_jwt" = []))
)]
pub async fn stats_admin_general(
    State(app_state): State<AppState>,
    garde: RoleAutorise<GouverneurSeul>,
) -> Result<Json<StatsAdminGeneral>, AppError> {
    let Acteur::Gouverneur { province_id, .. } = garde.acteur else {
        return Err(AppError::Forbidden);
    };
    let stats = app_state.dashboard_service.stats_admin_general(province_id).await?;
    Ok(Json(stats))
}

// GET /api/dashboard/bourgmestre
#[utoipa::path(
    get,
    path = "/api/dashboard/bourgmestre",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Compteurs de la commune du bourgmestre", body = StatsBourgmestre),
        (status = 401, description = "Non authentifié"),
        (status = 403, description = "Réservé au bourgmestre")
    ),
    security(("api_jwt" = []))
)]
pub async fn stats_bourgmestre(
    State(app_state): State<AppState>,
    garde: RoleAutorise<BourgmestreSeul>,
) -> Result<Json<StatsBourgmestre>, AppError> {
    let stats = app_state
        .dashboard_service
        .stats_bourgmestre(garde.acteur.id())
        .await?;
    Ok(Json(stats))
}
