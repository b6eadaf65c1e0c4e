// src/db/citoyen_repo.rs

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::acteurs::{Citoyen, UpdateCitoyenPayload},
};

const COLONNES: &str = "id, nom, postnom, prenom, date_naissance, sexe, lieu_naissance, commune_id, numero_unique, password_hash, created_at, updated_at";

// Le dépôt des citoyens.
#[derive(Clone)]
pub struct CitoyenRepository {
    pool: PgPool,
}

impl CitoyenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn trouver_par_numero_unique(
        &self,
        numero: &str,
    ) -> Result<Option<Citoyen>, AppError> {
        let citoyen = sqlx::query_as::<_, Citoyen>(&format!(
            "SELECT {COLONNES} FROM citoyens WHERE numero_unique = $1"
        ))
        .bind(numero)
        .fetch_optional(&self.pool)
        .await?;
        Ok(citoyen)
    }

    pub async fn trouver_par_id(&self, id: Uuid) -> Result<Option<Citoyen>, AppError> {
        let citoyen = sqlx::query_as::<_, Citoyen>(&format!(
            "SELECT {COLONNES} FROM citoyens WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(citoyen)
    }

    pub async fn lister(&self) -> Result<Vec<Citoyen>, AppError> {
        let citoyens = sqlx::query_as::<_, Citoyen>(&format!(
            "SELECT {COLONNES} FROM citoyens ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(citoyens)
    }

    // Une collision sur numero_unique est signalée par une erreur dédiée :
    // l'appelant régénère un numéro et réessaie, il ne l'accepte jamais en
    // silence.
    pub async fn creer(
        &self,
        nom: &str,
        postnom: Option<&str>,
        prenom: &str,
        date_naissance: NaiveDate,
        sexe: &str,
        lieu_naissance: &str,
        commune_id: Uuid,
        numero_unique: &str,
        password_hash: &str,
    ) -> Result<Citoyen, AppError> {
        let citoyen = sqlx::query_as::<_, Citoyen>(&format!(
            r#"
            INSERT INTO citoyens
                (nom, postnom, prenom, date_naissance, sexe, lieu_naissance,
                 commune_id, numero_unique, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COLONNES}
            "#
        ))
        .bind(nom)
        .bind(postnom)
        .bind(prenom)
        .bind(date_naissance)
        .bind(sexe)
        .bind(lieu_naissance)
        .bind(commune_id)
        .bind(numero_unique)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::NumeroUniqueConflict;
                }
            }
            e.into()
        })?;

        Ok(citoyen)
    }

    pub async fn mettre_a_jour(
        &self,
        id: Uuid,
        payload: &UpdateCitoyenPayload,
    ) -> Result<Citoyen, AppError> {
        let citoyen = sqlx::query_as::<_, Citoyen>(&format!(
            r#"
            UPDATE citoyens
            SET nom = COALESCE($2, nom),
                postnom = COALESCE($3, postnom),
                prenom = COALESCE($4, prenom),
                sexe = COALESCE($5, sexe),
                lieu_naissance = COALESCE($6, lieu_naissance),
                commune_id = COALESCE($7, commune_id),
                updated_at = now()
            WHERE id = $1
            RETURNING {COLONNES}
            "#
        ))
        .bind(id)
        .bind(payload.nom.as_deref())
        .bind(payload.postnom.as_deref())
        .bind(payload.prenom.as_deref())
        .bind(payload.sexe.as_deref())
        .bind(payload.lieu_naissance.as_deref())
        .bind(payload.commune_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Citoyen"))?;
        Ok(citoyen)
    }

    // Les demandes du citoyen partent avec lui (ON DELETE CASCADE).
    pub async fn supprimer(&self, id: Uuid) -> Result<(), AppError> {
        let res = sqlx::query("DELETE FROM citoyens WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("Citoyen"));
        }
        Ok(())
    }
}
