// src/db/territoire_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::territoire::{Commune, CommuneAvecBourgmestreRow, Province},
};

// Le dépôt du découpage administratif : provinces et communes.
#[derive(Clone)]
pub struct TerritoireRepository {
    pool: PgPool,
}

impl TerritoireRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn lister_provinces(&self) -> Result<Vec<Province>, AppError> {
        let provinces = sqlx::query_as::<_, Province>(
            "SELECT id, nom, created_at, updated_at FROM provinces ORDER BY nom ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(provinces)
    }

    pub async fn trouver_province(&self, id: Uuid) -> Result<Option<Province>, AppError> {
        let province = sqlx::query_as::<_, Province>(
            "SELECT id, nom, created_at, updated_at FROM provinces WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(province)
    }

    // Listing des communes avec l'identité du bourgmestre assigné.
    pub async fn lister_communes(&self) -> Result<Vec<CommuneAvecBourgmestreRow>, AppError> {
        let communes = sqlx::query_as::<_, CommuneAvecBourgmestreRow>(
            r#"
            SELECT
                c.id, c.nom, c.code, c.province_id, c.admin_id,
                a.username AS bourgmestre_username,
                a.nom      AS bourgmestre_nom,
                a.prenom   AS bourgmestre_prenom,
                a.postnom  AS bourgmestre_postnom
            FROM communes c
            LEFT JOIN administrateurs a ON a.id = c.admin_id
            ORDER BY c.nom ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(communes)
    }

    pub async fn communes_par_province(
        &self,
        province_id: Uuid,
    ) -> Result<Vec<Commune>, AppError> {
        let communes = sqlx::query_as::<_, Commune>(
            r#"
            SELECT id, nom, code, province_id, admin_id, created_at, updated_at
            FROM communes
            WHERE province_id = $1
            ORDER BY nom ASC
            "#,
        )
        .bind(province_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(communes)
    }

    pub async fn communes_par_province_avec_bourgmestre(
        &self,
        province_id: Uuid,
    ) -> Result<Vec<CommuneAvecBourgmestreRow>, AppError> {
        let communes = sqlx::query_as::<_, CommuneAvecBourgmestreRow>(
            r#"
            SELECT
                c.id, c.nom, c.code, c.province_id, c.admin_id,
                a.username AS bourgmestre_username,
                a.nom      AS bourgmestre_nom,
                a.prenom   AS bourgmestre_prenom,
                a.postnom  AS bourgmestre_postnom
            FROM communes c
            LEFT JOIN administrateurs a ON a.id = c.admin_id
            WHERE c.province_id = $1
            ORDER BY c.nom ASC
            "#,
        )
        .bind(province_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(communes)
    }

    pub async fn trouver_commune(&self, id: Uuid) -> Result<Option<Commune>, AppError> {
        let commune = sqlx::query_as::<_, Commune>(
            r#"
            SELECT id, nom, code, province_id, admin_id, created_at, updated_at
            FROM communes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(commune)
    }

    // Variante verrouillée (FOR UPDATE) pour les mutations multi-entités :
    // la ligne reste verrouillée jusqu'au commit de la transaction.
    pub async fn trouver_commune_verrouillee<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Commune>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let commune = sqlx::query_as::<_, Commune>(
            r#"
            SELECT id, nom, code, province_id, admin_id, created_at, updated_at
            FROM communes
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(commune)
    }

    // La commune supervisée par un bourgmestre donné (côté propriétaire de
    // la relation : c'est la commune qui pointe vers le bourgmestre).
    pub async fn trouver_commune_par_bourgmestre(
        &self,
        admin_id: Uuid,
    ) -> Result<Option<Commune>, AppError> {
        let commune = sqlx::query_as::<_, Commune>(
            r#"
            SELECT id, nom, code, province_id, admin_id, created_at, updated_at
            FROM communes
            WHERE admin_id = $1
            "#,
        )
        .bind(admin_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(commune)
    }

    // Assigne (ou retire, avec None) le bourgmestre d'une commune.
    // Toujours appelé dans la même transaction que la création/suppression
    // de l'administrateur concerné.
    pub async fn assigner_bourgmestre<'e, E>(
        &self,
        executor: E,
        commune_id: Uuid,
        admin_id: Option<Uuid>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE communes SET admin_id = $1, updated_at = now() WHERE id = $2")
            .bind(admin_id)
            .bind(commune_id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
