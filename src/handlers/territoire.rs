// src/handlers/territoire.rs

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::roles::{BourgmestreSeul, GouverneurSeul, PersonnelCommunal, RoleAutorise},
    models::{
        auth::Acteur,
        territoire::{Commune, CommuneAvecBourgmestre, Province},
    },
};

// GET /api/provinces (public : alimente le formulaire d'inscription)
pub async fn lister_provinces(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Province>>, AppError> {
    let provinces = app_state.territoire_repo.lister_provinces().await?;
    Ok(Json(provinces))
}

// GET /api/communes/public/province/{id} (public)
pub async fn communes_publiques_par_province(
    State(app_state): State<AppState>,
    Path(province_id): Path<Uuid>,
) -> Result<Json<Vec<Commune>>, AppError> {
    app_state
        .territoire_repo
        .trouver_province(province_id)
        .await?
        .ok_or(AppError::NotFound("Province"))?;
    let communes = app_state.territoire_repo.communes_par_province(province_id).await?;
    Ok(Json(communes))
}

// GET /api/communes : toutes les communes, avec le bourgmestre en place.
pub async fn lister_communes(
    State(app_state): State<AppState>,
    _garde: RoleAutorise<PersonnelCommunal>,
) -> Result<Json<Vec<CommuneAvecBourgmestre>>, AppError> {
    let communes = app_state.territoire_repo.lister_communes().await?;
    Ok(Json(communes.into_iter().map(Into::into).collect()))
}

// GET /api/communes/ma-province : les communes de la province du gouverneur.
pub async fn communes_de_ma_province(
    State(app_state): State<AppState>,
    garde: RoleAutorise<GouverneurSeul>,
) -> Result<Json<Vec<CommuneAvecBourgmestre>>, AppError> {
    let Acteur::Gouverneur { province_id, .. } = garde.acteur else {
        return Err(AppError::Forbidden);
    };
    let communes = app_state
        .administrateur_service
        .communes_de_ma_province(province_id)
        .await?;
    Ok(Json(communes))
}

// GET /api/communes/ma-commune : la commune supervisée par le bourgmestre.
pub async fn ma_commune(
    State(app_state): State<AppState>,
    garde: RoleAutorise<BourgmestreSeul>,
) -> Result<Json<Commune>, AppError> {
    let commune = app_state
        .administrateur_service
        .ma_commune(garde.acteur.id())
        .await?;
    Ok(Json(commune))
}
