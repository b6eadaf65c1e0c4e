// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, path::PathBuf, sync::Arc, time::Duration};

use crate::{
    db::{
        AdminGeneralRepository, AdministrateurRepository, AgentRepository, CitoyenRepository,
        DashboardRepository, DemandeRepository, TerritoireRepository,
    },
    services::{
        administrateur_service::AdministrateurService,
        agent_service::AgentService,
        auth::AuthService,
        dashboard_service::DashboardService,
        demande_service::DemandeService,
        document_service::PdfRenderer,
    },
};

// L'état partagé, accessible dans toute l'application.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub administrateur_service: AdministrateurService,
    pub agent_service: AgentService,
    pub demande_service: DemandeService,
    pub dashboard_service: DashboardService,
    pub territoire_repo: TerritoireRepository,
    pub citoyen_repo: CitoyenRepository,
    pub demande_repo: DemandeRepository,
    pub agent_repo: AgentRepository,
    pub administrateur_repo: AdministrateurRepository,
    pub admin_general_repo: AdminGeneralRepository,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL doit être définie");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET doit être défini");
        let dossier_documents =
            PathBuf::from(env::var("DOCUMENTS_DIR").unwrap_or_else(|_| "documents".into()));
        let dossier_polices =
            PathBuf::from(env::var("POLICES_DIR").unwrap_or_else(|_| "polices".into()));

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Connexion à la base de données établie avec succès !");

        std::fs::create_dir_all(&dossier_documents)?;

        // --- Montage du graphe de dépendances ---
        let territoire_repo = TerritoireRepository::new(db_pool.clone());
        let administrateur_repo = AdministrateurRepository::new(db_pool.clone());
        let admin_general_repo = AdminGeneralRepository::new(db_pool.clone());
        let agent_repo = AgentRepository::new(db_pool.clone());
        let citoyen_repo = CitoyenRepository::new(db_pool.clone());
        let demande_repo = DemandeRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            citoyen_repo.clone(),
            agent_repo.clone(),
            administrateur_repo.clone(),
            admin_general_repo.clone(),
            territoire_repo.clone(),
            jwt_secret,
        );
        let administrateur_service = AdministrateurService::new(
            administrateur_repo.clone(),
            admin_general_repo.clone(),
            territoire_repo.clone(),
            db_pool.clone(),
        );
        let agent_service = AgentService::new(agent_repo.clone(), territoire_repo.clone());
        let renderer = Arc::new(PdfRenderer::new(dossier_polices));
        let demande_service = DemandeService::new(
            demande_repo.clone(),
            citoyen_repo.clone(),
            territoire_repo.clone(),
            renderer,
            dossier_documents,
            db_pool.clone(),
        );
        let dashboard_service =
            DashboardService::new(dashboard_repo, demande_repo.clone(), territoire_repo.clone());

        Ok(Self {
            db_pool,
            auth_service,
            administrateur_service,
            agent_service,
            demande_service,
            dashboard_service,
            territoire_repo,
            citoyen_repo,
            demande_repo,
            agent_repo,
            administrateur_repo,
            admin_general_repo,
        })
    }
}
