// src/db/dashboard_repo.rs

use sqlx::{Acquire, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::dashboard::{StatsAdminGeneral, StatsBourgmestre},
};

// Le dépôt des agrégats des tableaux de bord.
#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // Agrégats de la province du gouverneur, dans une transaction pour un
    // instantané cohérent des trois compteurs.
    pub async fn stats_admin_general<'e, E>(
        &self,
        executor: E,
        province_id: Uuid,
    ) -> Result<StatsAdminGeneral, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let (communes,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM communes WHERE province_id = $1")
                .bind(province_id)
                .fetch_one(&mut *tx)
                .await?;

        let (administrateurs,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM administrateurs a
            JOIN communes c ON c.admin_id = a.id
            WHERE c.province_id = $1
            "#,
        )
        .bind(province_id)
        .fetch_one(&mut *tx)
        .await?;

        let (agents,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM agents ag
            JOIN communes c ON c.id = ag.commune_id
            WHERE c.province_id = $1
            "#,
        )
        .bind(province_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(StatsAdminGeneral { communes, administrateurs, agents })
    }

    // Agrégats de la commune du bourgmestre. Les ids de statut sont résolus
    // par nom en amont et passés ici, jamais codés en dur.
    pub async fn stats_bourgmestre<'e, E>(
        &self,
        executor: E,
        commune_id: Uuid,
        statut_en_traitement_id: Uuid,
        statut_validee_id: Uuid,
    ) -> Result<StatsBourgmestre, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let (agents,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM agents WHERE commune_id = $1")
                .bind(commune_id)
                .fetch_one(&mut *tx)
                .await?;

        let (demandes_total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM demandes WHERE commune_id = $1")
                .bind(commune_id)
                .fetch_one(&mut *tx)
                .await?;

        let (demandes_en_traitement,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM demandes WHERE commune_id = $1 AND statut_id = $2",
        )
        .bind(commune_id)
        .bind(statut_en_traitement_id)
        .fetch_one(&mut *tx)
        .await?;

        let (demandes_validees,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM demandes WHERE commune_id = $1 AND statut_id = $2",
        )
        .bind(commune_id)
        .bind(statut_validee_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(StatsBourgmestre {
            agents,
            demandes_total,
            demandes_en_traitement,
            demandes_validees,
        })
    }
}
