// src/handlers/demandes.rs

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::roles::{
        AgentSeul, CitoyenSeul, PersonnelCommunal, RoleAutorise, TousActeurs, ValidationDocs,
    },
    models::{
        auth::Acteur,
        demande::{
            CreateDemandePayload, Demande, DemandeDetail, Statut, StatutDemande,
            UpdateDemandePayload,
        },
    },
};

// GET /api/statuts/public : le vocabulaire fermé des statuts. Seules les
// graphies canoniques sont exposées, quoi que contienne la table.
pub async fn lister_statuts(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Statut>>, AppError> {
    let statuts = app_state
        .demande_repo
        .lister_statuts()
        .await?
        .into_iter()
        .filter(|s| StatutDemande::depuis_nom(&s.nom).is_some())
        .collect();
    Ok(Json(statuts))
}

// POST /api/demandes : dépôt d'une demande par un citoyen. La commune de
// rattachement est la sienne, jamais celle du payload.
#[utoipa::path(
    post,
    path = "/api/demandes",
    tag = "Demandes",
    request_body = CreateDemandePayload,
    responses(
        (status = 201, description = "Demande soumise", body = Demande),
        (status = 400, description = "Payload invalide"),
        (status = 403, description = "Réservé aux citoyens")
    ),
    security(("api_jwt" = []))
)]
pub async fn creer(
    State(app_state): State<AppState>,
    garde: RoleAutorise<CitoyenSeul>,
    Json(payload): Json<CreateDemandePayload>,
) -> Result<(StatusCode, Json<Demande>), AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    let Acteur::Citoyen { id, commune_id } = garde.acteur else {
        return Err(AppError::Forbidden);
    };

    let demande = app_state.demande_service.creer(id, commune_id, &payload).await?;
    Ok((StatusCode::CREATED, Json(demande)))
}

pub async fn lister_toutes(
    State(app_state): State<AppState>,
    _garde: RoleAutorise<PersonnelCommunal>,
) -> Result<Json<Vec<DemandeDetail>>, AppError> {
    let demandes = app_state.demande_service.lister_toutes().await?;
    Ok(Json(demandes))
}

// GET /api/demandes/me : les demandes du citoyen connecté.
pub async fn mes_demandes(
    State(app_state): State<AppState>,
    garde: RoleAutorise<CitoyenSeul>,
) -> Result<Json<Vec<DemandeDetail>>, AppError> {
    let demandes = app_state.demande_service.mes_demandes(garde.acteur.id()).await?;
    Ok(Json(demandes))
}

// GET /api/demandes/validated : les documents validés du citoyen connecté.
pub async fn mes_documents_valides(
    State(app_state): State<AppState>,
    garde: RoleAutorise<CitoyenSeul>,
) -> Result<Json<Vec<DemandeDetail>>, AppError> {
    let demandes = app_state
        .demande_service
        .mes_documents_valides(garde.acteur.id())
        .await?;
    Ok(Json(demandes))
}

// GET /api/demandes/validation : les demandes en attente de signature,
// dans la portée de l'acteur.
pub async fn a_valider(
    State(app_state): State<AppState>,
    garde: RoleAutorise<PersonnelCommunal>,
) -> Result<Json<Vec<DemandeDetail>>, AppError> {
    let demandes = app_state.demande_service.lister_a_valider(&garde.acteur).await?;
    Ok(Json(demandes))
}

// GET /api/demandes/file-agent : la file de travail de l'agent connecté.
pub async fn file_agent(
    State(app_state): State<AppState>,
    garde: RoleAutorise<AgentSeul>,
) -> Result<Json<Vec<DemandeDetail>>, AppError> {
    let demandes = app_state.demande_service.file_de_l_agent(&garde.acteur).await?;
    Ok(Json(demandes))
}

pub async fn detail(
    State(app_state): State<AppState>,
    garde: RoleAutorise<TousActeurs>,
    Path(id): Path<Uuid>,
) -> Result<Json<DemandeDetail>, AppError> {
    let demande = app_state.demande_service.detail(&garde.acteur, id).await?;
    Ok(Json(demande))
}

// PUT /api/demandes/{id}/prendre-en-charge
#[utoipa::path(
    put,
    path = "/api/demandes/{id}/prendre-en-charge",
    tag = "Demandes",
    params(("id" = Uuid, Path, description = "Identifiant de la demande")),
    responses(
        (status = 200, description = "Demande passée en traitement", body = Demande),
        (status = 403, description = "Hors de la portée de l'agent"),
        (status = 409, description = "La demande n'est plus soumise")
    ),
    security(("api_jwt" = []))
)]
pub async fn prendre_en_charge(
    State(app_state): State<AppState>,
    garde: RoleAutorise<AgentSeul>,
    Path(id): Path<Uuid>,
) -> Result<Json<Demande>, AppError> {
    let demande = app_state
        .demande_service
        .prendre_en_charge(&garde.acteur, id)
        .await?;
    Ok(Json(demande))
}

// PUT /api/demandes/{id}/generate-document
#[utoipa::path(
    put,
    path = "/api/demandes/{id}/generate-document",
    tag = "Demandes",
    params(("id" = Uuid, Path, description = "Identifiant de la demande")),
    responses(
        (status = 200, description = "Document généré", body = Demande),
        (status = 409, description = "Génération déjà en cours ou état invalide"),
        (status = 504, description = "Rendu hors délai")
    ),
    security(("api_jwt" = []))
)]
pub async fn generer_document(
    State(app_state): State<AppState>,
    garde: RoleAutorise<PersonnelCommunal>,
    Path(id): Path<Uuid>,
) -> Result<Json<Demande>, AppError> {
    let demande = app_state
        .demande_service
        .generer_document(&garde.acteur, id)
        .await?;
    Ok(Json(demande))
}

// PUT /api/demandes/{id}/validate-document
#[utoipa::path(
    put,
    path = "/api/demandes/{id}/validate-document",
    tag = "Demandes",
    params(("id" = Uuid, Path, description = "Identifiant de la demande")),
    responses(
        (status = 200, description = "Document signé et demande validée", body = Demande),
        (status = 403, description = "Hors de la portée du signataire"),
        (status = 409, description = "Aucun document à signer")
    ),
    security(("api_jwt" = []))
)]
pub async fn valider_document(
    State(app_state): State<AppState>,
    garde: RoleAutorise<ValidationDocs>,
    Path(id): Path<Uuid>,
) -> Result<Json<Demande>, AppError> {
    let demande = app_state
        .demande_service
        .valider_document(&garde.acteur, id)
        .await?;
    Ok(Json(demande))
}

// GET /api/demandes/{id}/download
pub async fn telecharger(
    State(app_state): State<AppState>,
    garde: RoleAutorise<TousActeurs>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (fichier, octets) = app_state.demande_service.telecharger(&garde.acteur, id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{fichier}\""),
            ),
        ],
        octets,
    ))
}

pub async fn mettre_a_jour(
    State(app_state): State<AppState>,
    garde: RoleAutorise<TousActeurs>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDemandePayload>,
) -> Result<Json<Demande>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    let demande = app_state
        .demande_service
        .mettre_a_jour(&garde.acteur, id, &payload)
        .await?;
    Ok(Json(demande))
}

pub async fn supprimer(
    State(app_state): State<AppState>,
    garde: RoleAutorise<ValidationDocs>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.demande_service.supprimer(&garde.acteur, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
