// src/handlers/admins_generaux.rs
//
// La gestion des gouverneurs. La création est la route d'amorçage de la
// plateforme : une province sans gouverneur n'a encore personne pour en
// créer un. L'unicité 1:1 par province borne ce que la route peut faire.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::roles::{GouverneurSeul, RoleAutorise},
    models::acteurs::{
        AdministrateurGeneral, CreateAdminGeneralPayload, UpdateAdminGeneralPayload,
    },
};

pub async fn creer(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateAdminGeneralPayload>,
) -> Result<(StatusCode, Json<AdministrateurGeneral>), AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let admin = app_state
        .administrateur_service
        .creer_admin_general(&payload)
        .await?;

    Ok((StatusCode::CREATED, Json(admin)))
}

pub async fn lister(
    State(app_state): State<AppState>,
    _garde: RoleAutorise<GouverneurSeul>,
) -> Result<Json<Vec<AdministrateurGeneral>>, AppError> {
    let admins = app_state.administrateur_service.lister_admins_generaux().await?;
    Ok(Json(admins))
}

pub async fn trouver(
    State(app_state): State<AppState>,
    _garde: RoleAutorise<GouverneurSeul>,
    Path(id): Path<Uuid>,
) -> Result<Json<AdministrateurGeneral>, AppError> {
    let admin = app_state.administrateur_service.trouver_admin_general(id).await?;
    Ok(Json(admin))
}

// Un gouverneur ne modifie que son propre compte.
pub async fn mettre_a_jour(
    State(app_state): State<AppState>,
    garde: RoleAutorise<GouverneurSeul>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAdminGeneralPayload>,
) -> Result<Json<AdministrateurGeneral>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    if garde.acteur.id() != id {
        return Err(AppError::Forbidden);
    }

    let admin = app_state
        .administrateur_service
        .mettre_a_jour_admin_general(id, &payload)
        .await?;
    Ok(Json(admin))
}
