// src/services/dashboard_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{DashboardRepository, DemandeRepository, TerritoireRepository},
    models::{
        dashboard::{StatsAdminGeneral, StatsBourgmestre},
        demande::StatutDemande,
    },
};

// Les tableaux de bord. Chaque série de compteurs est lue dans une même
// transaction pour rester un instantané cohérent.
#[derive(Clone)]
pub struct DashboardService {
    dashboard_repo: DashboardRepository,
    demande_repo: DemandeRepository,
    territoire_repo: TerritoireRepository,
}

impl DashboardService {
    pub fn new(
        dashboard_repo: DashboardRepository,
        demande_repo: DemandeRepository,
        territoire_repo: TerritoireRepository,
    ) -> Self {
        Self { dashboard_repo, demande_repo, territoire_repo }
    }

    pub async fn stats_admin_general(
        &self,
        province_id: Uuid,
    ) -> Result<StatsAdminGeneral, AppError> {
        self.dashboard_repo
            .stats_admin_general(self.dashboard_repo.pool(), province_id)
            .await
    }

    pub async fn stats_bourgmestre(
        &self,
        bourgmestre_id: Uuid,
    ) -> Result<StatsBourgmestre, AppError> {
        let commune = self
            .territoire_repo
            .trouver_commune_par_bourgmestre(bourgmestre_id)
            .await?
            .ok_or(AppError::NoCommuneSupervised)?;

        let pool = self.dashboard_repo.pool();
        let statut_en_traitement = self
            .demande_repo
            .statut_id(pool, StatutDemande::EnTraitement)
            .await?;
        let statut_validee = self
            .demande_repo
            .statut_id(pool, StatutDemande::Validee)
            .await?;

        self.dashboard_repo
            .stats_bourgmestre(pool, commune.id, statut_en_traitement, statut_validee)
            .await
    }
}
