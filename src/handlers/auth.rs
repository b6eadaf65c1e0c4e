// src/handlers/auth.rs

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::ActeurConnecte,
    models::{
        acteurs::{
            nom_complet, AdministrateurAvecNom, AdministrateurGeneral, Agent, CitoyenAvecCommune,
        },
        auth::{Acteur, AuthResponse, LoginPayload},
    },
};

// Le profil de l'acteur connecté, selon son rôle.
#[derive(Serialize, ToSchema)]
#[serde(untagged)]
pub enum ProfilReponse {
    Citoyen(Box<CitoyenAvecCommune>),
    Agent(Box<Agent>),
    Bourgmestre(Box<AdministrateurAvecNom>),
    Gouverneur(Box<AdministrateurGeneral>),
}

// Handler de connexion unifiée (les quatre rôles)
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Connexion réussie", body = AuthResponse),
        (status = 401, description = "Identifiants invalides")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let token = app_state
        .auth_service
        .login(&payload.username, &payload.password, payload.role)
        .await?;

    Ok(Json(AuthResponse { token }))
}

// Handler de la route protégée /me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Profil de l'acteur connecté", body = ProfilReponse),
        (status = 401, description = "Non authentifié")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    ActeurConnecte(acteur): ActeurConnecte,
) -> Result<Json<ProfilReponse>, AppError> {
    let profil = match acteur {
        Acteur::Citoyen { id, commune_id } => {
            let citoyen = app_state
                .citoyen_repo
                .trouver_par_id(id)
                .await?
                .ok_or(AppError::Unauthenticated)?;
            let commune = app_state
                .territoire_repo
                .trouver_commune(commune_id)
                .await?
                .ok_or(AppError::NotFound("Commune"))?;
            let nom_complet =
                nom_complet(&citoyen.nom, &citoyen.prenom, citoyen.postnom.as_deref());
            ProfilReponse::Citoyen(Box::new(CitoyenAvecCommune { citoyen, nom_complet, commune }))
        }
        Acteur::Agent { id, .. } => {
            let agent = app_state
                .agent_repo
                .trouver_par_id(id)
                .await?
                .ok_or(AppError::Unauthenticated)?;
            ProfilReponse::Agent(Box::new(agent))
        }
        Acteur::Bourgmestre { id } => {
            let admin = app_state
                .administrateur_repo
                .trouver_par_id(id)
                .await?
                .ok_or(AppError::Unauthenticated)?;
            ProfilReponse::Bourgmestre(Box::new(admin.into()))
        }
        Acteur::Gouverneur { id, .. } => {
            let admin = app_state
                .admin_general_repo
                .trouver_par_id(id)
                .await?
                .ok_or(AppError::Unauthenticated)?;
            ProfilReponse::Gouverneur(Box::new(admin))
        }
    };

    Ok(Json(profil))
}
