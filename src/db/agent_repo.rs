// src/db/agent_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{acteurs::Agent, demande::TypeDemande},
};

const COLONNES: &str =
    "id, nom, postnom, prenom, username, password_hash, commune_id, type_demande, created_at, updated_at";

// Le dépôt des agents communaux.
#[derive(Clone)]
pub struct AgentRepository {
    pool: PgPool,
}

impl AgentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn trouver_par_username(&self, username: &str) -> Result<Option<Agent>, AppError> {
        let agent = sqlx::query_as::<_, Agent>(&format!(
            "SELECT {COLONNES} FROM agents WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(agent)
    }

    pub async fn trouver_par_id(&self, id: Uuid) -> Result<Option<Agent>, AppError> {
        let agent =
            sqlx::query_as::<_, Agent>(&format!("SELECT {COLONNES} FROM agents WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(agent)
    }

    pub async fn creer(
        &self,
        nom: &str,
        postnom: Option<&str>,
        prenom: &str,
        username: &str,
        password_hash: &str,
        commune_id: Uuid,
        type_demande: TypeDemande,
    ) -> Result<Agent, AppError> {
        let agent = sqlx::query_as::<_, Agent>(&format!(
            r#"
            INSERT INTO agents (nom, postnom, prenom, username, password_hash, commune_id, type_demande)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLONNES}
            "#
        ))
        .bind(nom)
        .bind(postnom)
        .bind(prenom)
        .bind(username)
        .bind(password_hash)
        .bind(commune_id)
        .bind(type_demande)
        .fetch_one(&self.pool)
        .await
        .map_err(erreur_unicite_username)?;

        Ok(agent)
    }

    pub async fn lister_par_commune(&self, commune_id: Uuid) -> Result<Vec<Agent>, AppError> {
        let agents = sqlx::query_as::<_, Agent>(&format!(
            "SELECT {COLONNES} FROM agents WHERE commune_id = $1 ORDER BY nom ASC"
        ))
        .bind(commune_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(agents)
    }

    pub async fn mettre_a_jour(
        &self,
        id: Uuid,
        nom: Option<&str>,
        postnom: Option<&str>,
        prenom: Option<&str>,
        username: Option<&str>,
        password_hash: Option<&str>,
        type_demande: Option<TypeDemande>,
    ) -> Result<Agent, AppError> {
        let agent = sqlx::query_as::<_, Agent>(&format!(
            r#"
            UPDATE agents SET
                nom = COALESCE($2, nom),
                postnom = COALESCE($3, postnom),
                prenom = COALESCE($4, prenom),
                username = COALESCE($5, username),
                password_hash = COALESCE($6, password_hash),
                type_demande = COALESCE($7, type_demande),
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
        .bind(type_demande)
        .fetch_optional(&self.pool)
        .await
        .map_err(erreur_unicite_username)?
        .ok_or(AppError::NotFound("Agent"))?;

        Ok(agent)
    }

    pub async fn supprimer(&self, id: Uuid) -> Result<(), AppError> {
        let res = sqlx::query("DELETE FROM agents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("Agent"));
        }
        Ok(())
    }
}

fn erreur_unicite_username(e: sqlx::Error) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::DuplicateUsername;
        }
    }
    e.into()
}
