// src/handlers/agents.rs
//
// La gestion des agents communaux, réservée au bourgmestre, restreinte à
// sa commune. La commune d'affectation vient toujours du contexte vérifié.

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
    middleware::roles::{BourgmestreSeul, RoleAutorise},
    models::acteurs::{Agent, CreateAgentPayload, UpdateAgentPayload},
};

pub async fn creer(
    State(app_state): State<AppState>,
    garde: RoleAutorise<BourgmestreSeul>,
    Json(payload): Json<CreateAgentPayload>,
) -> Result<(StatusCode, Json<Agent>), AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let agent = app_state
        .agent_service
        .creer_agent(garde.acteur.id(), &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(agent)))
}

pub async fn lister(
    State(app_state): State<AppState>,
    garde: RoleAutorise<BourgmestreSeul>,
) -> Result<Json<Vec<Agent>>, AppError> {
    let agents = app_state
        .agent_service
        .agents_de_ma_commune(garde.acteur.id())
        .await?;
    Ok(Json(agents))
}

pub async fn trouver(
    State(app_state): State<AppState>,
    garde: RoleAutorise<BourgmestreSeul>,
    Path(id): Path<Uuid>,
) -> Result<Json<Agent>, AppError> {
    let agent = app_state
        .agent_service
        .trouver_agent(garde.acteur.id(), id)
        .await?;
    Ok(Json(agent))
}

pub async fn mettre_a_jour(
    State(app_state): State<AppState>,
    garde: RoleAutorise<BourgmestreSeul>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAgentPayload>,
) -> Result<Json<Agent>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let agent = app_state
        .agent_service
        .mettre_a_jour_agent(garde.acteur.id(), id, &payload)
        .await?;
    Ok(Json(agent))
}

pub async fn supprimer(
    State(app_state): State<AppState>,
    garde: RoleAutorise<BourgmestreSeul>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state
        .agent_service
        .supprimer_agent(garde.acteur.id(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
