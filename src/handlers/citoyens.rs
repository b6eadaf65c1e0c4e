// src/handlers/citoyens.rs

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
    middleware::roles::{BourgmestreSeul, GestionCitoyens, PersonnelCommunal, RoleAutorise},
    models::{
        acteurs::{nom_complet, Citoyen, CitoyenAvecCommune, UpdateCitoyenPayload},
        auth::{InscriptionResponse, RegisterCitoyenPayload},
    },
};

// Handler d'inscription publique d'un citoyen. La réponse porte le jeton
// ET le profil créé : c'est la seule occasion de communiquer le numéro
// unique fraîchement frappé.
#[utoipa::path(
    post,
    path = "/api/citoyens/register",
    tag = "Citoyens",
    request_body = RegisterCitoyenPayload,
    responses(
        (status = 201, description = "Citoyen inscrit", body = InscriptionResponse),
        (status = 400, description = "Payload invalide"),
        (status = 404, description = "Commune inconnue")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterCitoyenPayload>,
) -> Result<(StatusCode, Json<InscriptionResponse>), AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let (token, citoyen) = app_state.auth_service.inscrire_citoyen(&payload).await?;

    Ok((StatusCode::CREATED, Json(InscriptionResponse { token, citoyen })))
}

pub async fn lister(
    State(app_state): State<AppState>,
    _garde: RoleAutorise<PersonnelCommunal>,
) -> Result<Json<Vec<Citoyen>>, AppError> {
    let citoyens = app_state.citoyen_repo.lister().await?;
    Ok(Json(citoyens))
}

pub async fn trouver(
    State(app_state): State<AppState>,
    _garde: RoleAutorise<PersonnelCommunal>,
    Path(id): Path<Uuid>,
) -> Result<Json<CitoyenAvecCommune>, AppError> {
    let citoyen = app_state
        .citoyen_repo
        .trouver_par_id(id)
        .await?
        .ok_or(AppError::NotFound("Citoyen"))?;
    let commune = app_state
        .territoire_repo
        .trouver_commune(citoyen.commune_id)
        .await?
        .ok_or(AppError::NotFound("Commune"))?;
    let nom_complet = nom_complet(&citoyen.nom, &citoyen.prenom, citoyen.postnom.as_deref());

    Ok(Json(CitoyenAvecCommune { citoyen, nom_complet, commune }))
}

// POST /api/citoyens : enregistrement d'un citoyen au guichet, par le
// personnel communal. Même circuit que l'inscription publique (le numéro
// unique est frappé de la même façon), mais la réponse ne porte pas de
// jeton : le citoyen se connectera lui-même.
pub async fn creer(
    State(app_state): State<AppState>,
    _garde: RoleAutorise<GestionCitoyens>,
    Json(payload): Json<RegisterCitoyenPayload>,
) -> Result<(StatusCode, Json<Citoyen>), AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let (_, citoyen) = app_state.auth_service.inscrire_citoyen(&payload).await?;
    Ok((StatusCode::CREATED, Json(citoyen)))
}

// PUT /api/citoyens/{id} : correction d'état civil par le personnel.
pub async fn mettre_a_jour(
    State(app_state): State<AppState>,
    _garde: RoleAutorise<GestionCitoyens>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCitoyenPayload>,
) -> Result<Json<Citoyen>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    if let Some(commune_id) = payload.commune_id {
        app_state
            .territoire_repo
            .trouver_commune(commune_id)
            .await?
            .ok_or(AppError::NotFound("Commune"))?;
    }

    let citoyen = app_state.citoyen_repo.mettre_a_jour(id, &payload).await?;
    Ok(Json(citoyen))
}

// DELETE /api/citoyens/{id} : réservé au bourgmestre. Les demandes du
// citoyen partent avec lui.
pub async fn supprimer(
    State(app_state): State<AppState>,
    _garde: RoleAutorise<BourgmestreSeul>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.citoyen_repo.supprimer(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
