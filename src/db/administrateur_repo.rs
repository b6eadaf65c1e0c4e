// src/db/administrateur_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::acteurs::Administrateur};

const COLONNES: &str =
    "id, nom, postnom, prenom, username, password_hash, email, created_at, updated_at";

// Le dépôt des bourgmestres (table 'administrateurs').
#[derive(Clone)]
pub struct AdministrateurRepository {
    pool: PgPool,
}

impl AdministrateurRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn trouver_par_username(
        &self,
        username: &str,
    ) -> Result<Option<Administrateur>, AppError> {
        let admin = sqlx::query_as::<_, Administrateur>(&format!(
            "SELECT {COLONNES} FROM administrateurs WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }

    pub async fn trouver_par_id(&self, id: Uuid) -> Result<Option<Administrateur>, AppError> {
        let admin = sqlx::query_as::<_, Administrateur>(&format!(
            "SELECT {COLONNES} FROM administrateurs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }

    // Création d'un bourgmestre, dans la transaction de l'assignation de
    // sa commune. Violation d'unicité du username -> erreur dédiée.
    pub async fn creer<'e, E>(
        &self,
        executor: E,
        nom: &str,
        postnom: Option<&str>,
        prenom: &str,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
    ) -> Result<Administrateur, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let admin = sqlx::query_as::<_, Administrateur>(&format!(
            r#"
            INSERT INTO administrateurs (nom, postnom, prenom, username, password_hash, email)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLONNES}
            "#
        ))
        .bind(nom)
        .bind(postnom)
        .bind(prenom)
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .fetch_one(executor)
        .await
        .map_err(erreur_unicite_username)?;

        Ok(admin)
    }

    // Bourgmestres de la province donnée, via la jointure sur les communes
    // qui les référencent.
    pub async fn lister_par_province(
        &self,
        province_id: Uuid,
    ) -> Result<Vec<Administrateur>, AppError> {
        let admins = sqlx::query_as::<_, Administrateur>(
            r#"
            SELECT a.id, a.nom, a.postnom, a.prenom, a.username, a.password_hash,
                   a.email, a.created_at, a.updated_at
            FROM administrateurs a
            JOIN communes c ON c.admin_id = a.id
            WHERE c.province_id = $1
            ORDER BY a.nom ASC
            "#,
        )
        .bind(province_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(admins)
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
    ) -> Result<Administrateur, AppError> {
        let admin = sqlx::query_as::<_, Administrateur>(&format!(
            r#"
            UPDATE administrateurs SET
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
        .map_err(erreur_unicite_username)?
        .ok_or(AppError::NotFound("Bourgmestre"))?;

        Ok(admin)
    }

    // Suppression, dans la même transaction que la désassignation de la
    // commune : aucun état intermédiaire avec une référence pendante.
    pub async fn supprimer<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let res = sqlx::query("DELETE FROM administrateurs WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("Bourgmestre"));
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
