// src/handlers/administrateurs.rs
//
// La gestion des bourgmestres, réservée au gouverneur, restreinte à sa
// province.

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
    models::{
        acteurs::{
            AdministrateurAvecNom, CreateAdministrateurPayload, UpdateAdministrateurPayload,
        },
        auth::Acteur,
    },
};

fn province_du_gouverneur(acteur: &Acteur) -> Result<Uuid, AppError> {
    match acteur {
        Acteur::Gouverneur { province_id, .. } => Ok(*province_id),
        _ => Err(AppError::Forbidden),
    }
}

pub async fn creer(
    State(app_state): State<AppState>,
    garde: RoleAutorise<GouverneurSeul>,
    Json(payload): Json<CreateAdministrateurPayload>,
) -> Result<(StatusCode, Json<AdministrateurAvecNom>), AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    let province_id = province_du_gouverneur(&garde.acteur)?;

    let admin = app_state
        .administrateur_service
        .creer_bourgmestre(province_id, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(admin.into())))
}

pub async fn lister(
    State(app_state): State<AppState>,
    garde: RoleAutorise<GouverneurSeul>,
) -> Result<Json<Vec<AdministrateurAvecNom>>, AppError> {
    let province_id = province_du_gouverneur(&garde.acteur)?;
    let admins = app_state
        .administrateur_service
        .lister_ma_province(province_id)
        .await?;
    Ok(Json(admins.into_iter().map(Into::into).collect()))
}

pub async fn trouver(
    State(app_state): State<AppState>,
    garde: RoleAutorise<GouverneurSeul>,
    Path(id): Path<Uuid>,
) -> Result<Json<AdministrateurAvecNom>, AppError> {
    let province_id = province_du_gouverneur(&garde.acteur)?;
    let admin = app_state
        .administrateur_service
        .trouver_bourgmestre(province_id, id)
        .await?;
    Ok(Json(admin.into()))
}

pub async fn mettre_a_jour(
    State(app_state): State<AppState>,
    garde: RoleAutorise<GouverneurSeul>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAdministrateurPayload>,
) -> Result<Json<AdministrateurAvecNom>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    let province_id = province_du_gouverneur(&garde.acteur)?;

    let admin = app_state
        .administrateur_service
        .mettre_a_jour_bourgmestre(province_id, id, &payload)
        .await?;
    Ok(Json(admin.into()))
}

pub async fn supprimer(
    State(app_state): State<AppState>,
    garde: RoleAutorise<GouverneurSeul>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let province_id = province_du_gouverneur(&garde.acteur)?;
    app_state
        .administrateur_service
        .supprimer_bourgmestre(province_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
