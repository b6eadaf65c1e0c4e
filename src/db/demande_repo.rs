// src/db/demande_repo.rs

use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::demande::{Demande, DemandeDetail, Statut, StatutDemande, TypeDemande},
};

const COLONNES: &str = "id, citoyen_id, commune_id, agent_id, type_demande, statut_id, donnees_json, commentaires, document_genere, jeton_verification, created_at, updated_at";

// Jointure complète pour les lectures : citoyen, statut, commune, agent.
const SELECT_DETAIL: &str = r#"
    SELECT
        d.id, d.citoyen_id, d.commune_id, d.agent_id, d.type_demande,
        d.statut_id, d.donnees_json, d.commentaires, d.document_genere,
        d.jeton_verification, d.created_at, d.updated_at,
        s.nom  AS statut_nom,
        ci.nom AS citoyen_nom,
        ci.prenom AS citoyen_prenom,
        ci.postnom AS citoyen_postnom,
        ci.numero_unique AS citoyen_numero_unique,
        co.nom AS commune_nom,
        ag.username AS agent_username
    FROM demandes d
    JOIN statuts s   ON s.id = d.statut_id
    JOIN citoyens ci ON ci.id = d.citoyen_id
    JOIN communes co ON co.id = d.commune_id
    LEFT JOIN agents ag ON ag.id = d.agent_id
"#;

// Le dépôt des demandes et des statuts.
#[derive(Clone)]
pub struct DemandeRepository {
    pool: PgPool,
}

impl DemandeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Statuts
    // ---

    pub async fn lister_statuts(&self) -> Result<Vec<Statut>, AppError> {
        let statuts = sqlx::query_as::<_, Statut>("SELECT id, nom FROM statuts ORDER BY nom ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(statuts)
    }

    /// Résout l'identifiant d'un statut par son nom canonique, au moment de
    /// l'appel. C'est la seule voie d'accès aux ids de statut : aucun
    /// ordinal n'est codé en dur ailleurs.
    pub async fn statut_id<'e, E>(
        &self,
        executor: E,
        statut: StatutDemande,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM statuts WHERE nom = $1")
            .bind(statut.as_nom())
            .fetch_optional(executor)
            .await?;
        row.map(|(id,)| id).ok_or(AppError::NotFound("Statut"))
    }

    /// Résolution inverse : retrouve le statut canonique porté par une ligne
    /// de demande. Un id qui ne correspond à aucun nom du vocabulaire fermé
    /// est traité comme introuvable.
    pub async fn statut_depuis_id<'e, E>(
        &self,
        executor: E,
        statut_id: Uuid,
    ) -> Result<StatutDemande, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row: Option<(String,)> = sqlx::query_as("SELECT nom FROM statuts WHERE id = $1")
            .bind(statut_id)
            .fetch_optional(executor)
            .await?;
        let (nom,) = row.ok_or(AppError::NotFound("Statut"))?;
        StatutDemande::depuis_nom(&nom).ok_or(AppError::NotFound("Statut"))
    }

    // ---
    // Demandes
    // ---

    pub async fn creer(
        &self,
        citoyen_id: Uuid,
        commune_id: Uuid,
        type_demande: TypeDemande,
        statut_id: Uuid,
        donnees_json: Option<&Value>,
        commentaires: Option<&str>,
    ) -> Result<Demande, AppError> {
        let demande = sqlx::query_as::<_, Demande>(&format!(
            r#"
            INSERT INTO demandes
                (citoyen_id, commune_id, type_demande, statut_id, donnees_json, commentaires)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLONNES}
            "#
        ))
        .bind(citoyen_id)
        .bind(commune_id)
        .bind(type_demande)
        .bind(statut_id)
        .bind(donnees_json)
        .bind(commentaires)
        .fetch_one(&self.pool)
        .await?;

        Ok(demande)
    }

    pub async fn trouver(&self, id: Uuid) -> Result<Option<Demande>, AppError> {
        let demande = sqlx::query_as::<_, Demande>(&format!(
            "SELECT {COLONNES} FROM demandes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(demande)
    }

    /// Verrouille la demande pour la durée de la transaction, sans attendre :
    /// si un autre appel tient déjà le verrou (génération concurrente), on
    /// échoue immédiatement en conflit au lieu de s'empiler.
    pub async fn trouver_verrouillee<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Demande>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let demande = sqlx::query_as::<_, Demande>(&format!(
            "SELECT {COLONNES} FROM demandes WHERE id = $1 FOR UPDATE NOWAIT"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            // 55P03 = lock_not_available
            if let Some(db_err) = e.as_database_error() {
                if db_err.code().as_deref() == Some("55P03") {
                    return AppError::GenerationConflict;
                }
            }
            e.into()
        })?;
        Ok(demande)
    }

    pub async fn lister_toutes(&self) -> Result<Vec<DemandeDetail>, AppError> {
        let demandes = sqlx::query_as::<_, DemandeDetail>(&format!(
            "{SELECT_DETAIL} ORDER BY d.created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(demandes)
    }

    pub async fn trouver_detail(&self, id: Uuid) -> Result<Option<DemandeDetail>, AppError> {
        let demande = sqlx::query_as::<_, DemandeDetail>(&format!(
            "{SELECT_DETAIL} WHERE d.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(demande)
    }

    pub async fn lister_par_citoyen(
        &self,
        citoyen_id: Uuid,
    ) -> Result<Vec<DemandeDetail>, AppError> {
        let demandes = sqlx::query_as::<_, DemandeDetail>(&format!(
            "{SELECT_DETAIL} WHERE d.citoyen_id = $1 ORDER BY d.created_at DESC"
        ))
        .bind(citoyen_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(demandes)
    }

    // Les documents validés d'un citoyen, le plus récent en tête.
    pub async fn lister_validees_par_citoyen(
        &self,
        citoyen_id: Uuid,
        statut_validee_id: Uuid,
    ) -> Result<Vec<DemandeDetail>, AppError> {
        let demandes = sqlx::query_as::<_, DemandeDetail>(&format!(
            r#"{SELECT_DETAIL}
            WHERE d.citoyen_id = $1 AND d.statut_id = $2
            ORDER BY d.updated_at DESC
            "#
        ))
        .bind(citoyen_id)
        .bind(statut_validee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(demandes)
    }

    // La file de travail d'un agent : les demandes soumises de SA commune
    // et de SA spécialisation.
    pub async fn file_a_traiter(
        &self,
        commune_id: Uuid,
        type_demande: TypeDemande,
        statut_soumise_id: Uuid,
    ) -> Result<Vec<DemandeDetail>, AppError> {
        let demandes = sqlx::query_as::<_, DemandeDetail>(&format!(
            r#"{SELECT_DETAIL}
            WHERE d.commune_id = $1 AND d.type_demande = $2 AND d.statut_id = $3
            ORDER BY d.created_at ASC
            "#
        ))
        .bind(commune_id)
        .bind(type_demande)
        .bind(statut_soumise_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(demandes)
    }

    // Les demandes avec document généré, en attente de signature.
    // `commune_id` optionnel : le bourgmestre est restreint à sa commune.
    pub async fn lister_a_valider(
        &self,
        statut_en_traitement_id: Uuid,
        commune_id: Option<Uuid>,
    ) -> Result<Vec<DemandeDetail>, AppError> {
        let demandes = sqlx::query_as::<_, DemandeDetail>(&format!(
            r#"{SELECT_DETAIL}
            WHERE d.statut_id = $1
              AND d.document_genere IS NOT NULL
              AND ($2::uuid IS NULL OR d.commune_id = $2)
            ORDER BY d.created_at ASC
            "#
        ))
        .bind(statut_en_traitement_id)
        .bind(commune_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(demandes)
    }

    pub async fn passer_en_traitement<'e, E>(
        &self,
        executor: E,
        demande_id: Uuid,
        agent_id: Uuid,
        statut_en_traitement_id: Uuid,
    ) -> Result<Demande, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let demande = sqlx::query_as::<_, Demande>(&format!(
            r#"
            UPDATE demandes
            SET agent_id = $2, statut_id = $3, updated_at = now()
            WHERE id = $1
            RETURNING {COLONNES}
            "#
        ))
        .bind(demande_id)
        .bind(agent_id)
        .bind(statut_en_traitement_id)
        .fetch_one(executor)
        .await?;
        Ok(demande)
    }

    pub async fn enregistrer_document<'e, E>(
        &self,
        executor: E,
        demande_id: Uuid,
        fichier: &str,
        jeton: Uuid,
    ) -> Result<Demande, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let demande = sqlx::query_as::<_, Demande>(&format!(
            r#"
            UPDATE demandes
            SET document_genere = $2, jeton_verification = $3, updated_at = now()
            WHERE id = $1
            RETURNING {COLONNES}
            "#
        ))
        .bind(demande_id)
        .bind(fichier)
        .bind(jeton)
        .fetch_one(executor)
        .await?;
        Ok(demande)
    }

    // Remplace l'artefact non signé par l'artefact signé et passe le statut
    // à "validee", d'un seul coup.
    pub async fn valider<'e, E>(
        &self,
        executor: E,
        demande_id: Uuid,
        fichier_signe: &str,
        statut_validee_id: Uuid,
    ) -> Result<Demande, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let demande = sqlx::query_as::<_, Demande>(&format!(
            r#"
            UPDATE demandes
            SET document_genere = $2, statut_id = $3, updated_at = now()
            WHERE id = $1
            RETURNING {COLONNES}
            "#
        ))
        .bind(demande_id)
        .bind(fichier_signe)
        .bind(statut_validee_id)
        .fetch_one(executor)
        .await?;
        Ok(demande)
    }

    pub async fn mettre_a_jour(
        &self,
        demande_id: Uuid,
        donnees_json: Option<&Value>,
        commentaires: Option<&str>,
    ) -> Result<Demande, AppError> {
        let demande = sqlx::query_as::<_, Demande>(&format!(
            r#"
            UPDATE demandes
            SET donnees_json = COALESCE($2, donnees_json),
                commentaires = COALESCE($3, commentaires),
                updated_at = now()
            WHERE id = $1
            RETURNING {COLONNES}
            "#
        ))
        .bind(demande_id)
        .bind(donnees_json)
        .bind(commentaires)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Demande"))?;
        Ok(demande)
    }

    pub async fn supprimer(&self, demande_id: Uuid) -> Result<(), AppError> {
        let res = sqlx::query("DELETE FROM demandes WHERE id = $1")
            .bind(demande_id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("Demande"));
        }
        Ok(())
    }
}
