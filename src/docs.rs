// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Citoyens ---
        handlers::citoyens::register,

        // --- Demandes (cycle de vie) ---
        handlers::demandes::creer,
        handlers::demandes::prendre_en_charge,
        handlers::demandes::generer_document,
        handlers::demandes::valider_document,

        // --- Dashboard ---
        handlers::dashboard::stats_admin_general,
        handlers::dashboard::stats_bourgmestre,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::LoginPayload,
            models::auth::RegisterCitoyenPayload,
            models::auth::AuthResponse,
            models::auth::InscriptionResponse,
            handlers::auth::ProfilReponse,

            // --- Acteurs ---
            models::acteurs::AdministrateurGeneral,
            models::acteurs::Administrateur,
            models::acteurs::AdministrateurAvecNom,
            models::acteurs::Agent,
            models::acteurs::Citoyen,
            models::acteurs::CitoyenAvecCommune,
            models::acteurs::CreateAdministrateurPayload,
            models::acteurs::UpdateAdministrateurPayload,
            models::acteurs::CreateAdminGeneralPayload,
            models::acteurs::UpdateAdminGeneralPayload,
            models::acteurs::CreateAgentPayload,
            models::acteurs::UpdateAgentPayload,
            models::acteurs::UpdateCitoyenPayload,

            // --- Territoire ---
            models::territoire::Province,
            models::territoire::Commune,
            models::territoire::CommuneAvecBourgmestre,

            // --- Demandes ---
            models::demande::TypeDemande,
            models::demande::Statut,
            models::demande::Demande,
            models::demande::DemandeDetail,
            models::demande::CreateDemandePayload,
            models::demande::UpdateDemandePayload,

            // --- Dashboard ---
            models::dashboard::StatsAdminGeneral,
            models::dashboard::StatsBourgmestre,
        )
    ),
    tags(
        (name = "Auth", description = "Authentification unifiée des quatre rôles"),
        (name = "Citoyens", description = "Inscription et profils des citoyens"),
        (name = "Demandes", description = "Cycle de vie des demandes de documents"),
        (name = "Dashboard", description = "Indicateurs par province et par commune")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
