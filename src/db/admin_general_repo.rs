// src/db/admin_general_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::acteurs::AdministrateurGeneral};

const COLONNES: &str = "id, nom, postnom, prenom, username, password_hash, email, province_id, created_at, updated_at";

// Le dépôt des gouverneurs (table 'administrateurs_generaux').
#[derive(Clone)]
pub struct AdminGeneralRepository {
    pool: PgPool,
}

impl AdminGeneralRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn trouver_par_username(
        &self,
        username: &str,
    ) -> Result<Option<AdministrateurGeneral>, AppError> {
        let admin = sqlx::query_as::<_, AdministrateurGeneral>(&format!(
            "SELECT {COLONNES} FROM administrateurs_generaux WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }

    pub async fn trouver_par_id(
        &self,
        id: Uuid,
    ) -> Result<Option<AdministrateurGeneral>, AppError> {
        let admin = sqlx::query_as::<_, AdministrateurGeneral>(&format!(
            "SELECT {COLONNES} FROM administrateurs_generaux WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }

    pub async fn lister(&self) -> Result<Vec<AdministrateurGeneral>, AppError> {
        let admins = sqlx::query_as::<_, AdministrateurGeneral>(&format!(
            "SELECT {COLONNES} FROM administrateurs_generaux ORDER BY nom ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(admins)
    }

    // L'unicité 1:1 par province et l'unicité du username sont portées par
    // des contraintes ; on traduit la violation en erreur métier.
    pub async fn creer(
        &self,
        nom: &str,
        postnom: Option<&str>,
        prenom: &str,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
        province_id: Uuid,
    ) -> Result<AdministrateurGeneral, AppError> {
        let admin = sqlx::query_as::<_, AdministrateurGeneral>(&format!(
            r#"
            INSERT INTO administrateurs_generaux
                (nom, postnom, prenom, username, password_hash, email, province_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLONNES}
            "#
        ))
        .bind(nom)
        .bind(postnom)
        .bind(prenom)
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .bind(province_id)
        .fetch_one(&self.pool)
        .await
        .map_err(traduire_violation_unicite)?;

        Ok(admin)
    }

    pub async fn mettre_a_jour(
        &self,
        id: Uuid,
        nom: Option<&str>,
        postnom: Option<&str>,
        prenom: Option<&str>,
        username: Option<&str>,
        password_hash: Option<&str>,
        email: Option<&str>,
    ) -> Result<AdministrateurGeneral, AppError> {
        let admin = sqlx::query_as::<_, AdministrateurGeneral>(&format!(
            r#"
            UPDATE administrateurs_generaux SET
                nom = COALESCE($2, nom),
                postnom = COALESCE($3, postnom),
                prenom = COALESCE($4, prenom),
                username = COALESCE($5, username),
                password_hash = COALESCE($6, password_hash),
                email = COALESCE($7, email),
                updated_at = now()
            WHERE id = $1
            RETURNING {COLONNES}
            "#
        ))
        .bind(id)
        .bind(nom)
        .bind(postnom)
        .bind(prenom)
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(traduire_violation_unicite)?
        .ok_or(AppError::NotFound("Administrateur général"))?;

        Ok(admin)
    }
}

fn traduire_violation_unicite(e: sqlx::Error) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some("administrateurs_generaux_province_id_key") => {
                    AppError::ProvinceAlreadyAssigned
                }
                _ => AppError::DuplicateUsername,
            };
        }
    }
    e.into()
}
