// src/services/administrateur_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AdminGeneralRepository, AdministrateurRepository, TerritoireRepository},
    models::{
        acteurs::{
            Administrateur, AdministrateurGeneral, CreateAdminGeneralPayload,
            CreateAdministrateurPayload, UpdateAdminGeneralPayload, UpdateAdministrateurPayload,
        },
        territoire::{Commune, CommuneAvecBourgmestre},
    },
    services::auth,
};

// Gestion de la hiérarchie administrative : les gouverneurs (administrateurs
// généraux) et les bourgmestres qu'ils nomment. La relation
// bourgmestre<->commune est portée par `communes.admin_id` ; toute mutation
// la touchant se fait en transaction, commune verrouillée.
#[derive(Clone)]
pub struct AdministrateurService {
    administrateur_repo: AdministrateurRepository,
    admin_general_repo: AdminGeneralRepository,
    territoire_repo: TerritoireRepository,
    pool: PgPool,
}

impl AdministrateurService {
    pub fn new(
        administrateur_repo: AdministrateurRepository,
        admin_general_repo: AdminGeneralRepository,
        territoire_repo: TerritoireRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            administrateur_repo,
            admin_general_repo,
            territoire_repo,
            pool,
        }
    }

    // ---
    // Bourgmestres (créés par le gouverneur, pour sa province uniquement)
    // ---

    // Création atomique : l'insertion du bourgmestre et l'assignation de sa
    // commune réussissent ou échouent ensemble. La commune est verrouillée
    // pour écarter deux nominations concurrentes sur le même siège.
    pub async fn creer_bourgmestre(
        &self,
        province_gouverneur: Uuid,
        payload: &CreateAdministrateurPayload,
    ) -> Result<Administrateur, AppError> {
        let password_hash = auth::hacher_mot_de_passe(&payload.password).await?;

        let mut tx = self.pool.begin().await?;

        let commune = self
            .territoire_repo
            .trouver_commune_verrouillee(&mut *tx, payload.commune_id)
            .await?
            .ok_or(AppError::NotFound("Commune"))?;

        if commune.province_id != province_gouverneur {
            return Err(AppError::Forbidden);
        }
        if commune.admin_id.is_some() {
            return Err(AppError::CommuneAlreadyAssigned);
        }

        let admin = self
            .administrateur_repo
            .creer(
                &mut *tx,
                &payload.nom,
                payload.postnom.as_deref(),
                &payload.prenom,
                &payload.username,
                &password_hash,
                payload.email.as_deref(),
            )
            .await?;

        self.territoire_repo
            .assigner_bourgmestre(&mut *tx, commune.id, Some(admin.id))
            .await?;

        tx.commit().await?;
        tracing::info!("✅ Bourgmestre {} nommé sur la commune {}", admin.username, commune.nom);
        Ok(admin)
    }

    pub async fn lister_ma_province(
        &self,
        province_id: Uuid,
    ) -> Result<Vec<Administrateur>, AppError> {
        self.administrateur_repo.lister_par_province(province_id).await
    }

    pub async fn trouver_bourgmestre(
        &self,
        province_gouverneur: Uuid,
        id: Uuid,
    ) -> Result<Administrateur, AppError> {
        let admin = self
            .administrateur_repo
            .trouver_par_id(id)
            .await?
            .ok_or(AppError::NotFound("Bourgmestre"))?;
        self.verifier_portee_province(province_gouverneur, id).await?;
        Ok(admin)
    }

    pub async fn mettre_a_jour_bourgmestre(
        &self,
        province_gouverneur: Uuid,
        id: Uuid,
        payload: &UpdateAdministrateurPayload,
    ) -> Result<Administrateur, AppError> {
        self.verifier_portee_province(province_gouverneur, id).await?;

        let password_hash = match &payload.password {
            Some(password) => Some(auth::hacher_mot_de_passe(password).await?),
            None => None,
        };

        self.administrateur_repo
            .mettre_a_jour(
                id,
                payload.nom.as_deref(),
                payload.postnom.as_deref(),
                payload.prenom.as_deref(),
                payload.username.as_deref(),
                password_hash.as_deref(),
                payload.email.as_deref(),
            )
            .await
    }

    // Suppression atomique : la commune est désassignée dans la même
    // transaction, aucune référence pendante ne survit.
    pub async fn supprimer_bourgmestre(
        &self,
        province_gouverneur: Uuid,
        id: Uuid,
    ) -> Result<(), AppError> {
        self.verifier_portee_province(province_gouverneur, id).await?;

        let mut tx = self.pool.begin().await?;

        if let Some(commune) = self.territoire_repo.trouver_commune_par_bourgmestre(id).await? {
            self.territoire_repo
                .assigner_bourgmestre(&mut *tx, commune.id, None)
                .await?;
        }
        self.administrateur_repo.supprimer(&mut *tx, id).await?;

        tx.commit().await?;
        Ok(())
    }

    // La commune supervisée par le bourgmestre connecté.
    pub async fn ma_commune(&self, admin_id: Uuid) -> Result<Commune, AppError> {
        self.territoire_repo
            .trouver_commune_par_bourgmestre(admin_id)
            .await?
            .ok_or(AppError::NoCommuneSupervised)
    }

    // Les communes de la province du gouverneur, avec l'identité du
    // bourgmestre en place.
    pub async fn communes_de_ma_province(
        &self,
        province_id: Uuid,
    ) -> Result<Vec<CommuneAvecBourgmestre>, AppError> {
        let lignes = self
            .territoire_repo
            .communes_par_province_avec_bourgmestre(province_id)
            .await?;
        Ok(lignes.into_iter().map(Into::into).collect())
    }

    // ---
    // Gouverneurs (administrateurs généraux)
    // ---

    pub async fn creer_admin_general(
        &self,
        payload: &CreateAdminGeneralPayload,
    ) -> Result<AdministrateurGeneral, AppError> {
        self.territoire_repo
            .trouver_province(payload.province_id)
            .await?
            .ok_or(AppError::NotFound("Province"))?;

        let password_hash = auth::hacher_mot_de_passe(&payload.password).await?;

        let admin = self
            .admin_general_repo
            .creer(
                &payload.nom,
                payload.postnom.as_deref(),
                &payload.prenom,
                &payload.username,
                &password_hash,
                payload.email.as_deref(),
                payload.province_id,
            )
            .await?;

        tracing::info!("✅ Administrateur général {} créé pour la province", admin.username);
        Ok(admin)
    }

    pub async fn lister_admins_generaux(&self) -> Result<Vec<AdministrateurGeneral>, AppError> {
        self.admin_general_repo.lister().await
    }

    pub async fn trouver_admin_general(
        &self,
        id: Uuid,
    ) -> Result<AdministrateurGeneral, AppError> {
        self.admin_general_repo
            .trouver_par_id(id)
            .await?
            .ok_or(AppError::NotFound("Administrateur général"))
    }

    pub async fn mettre_a_jour_admin_general(
        &self,
        id: Uuid,
        payload: &UpdateAdminGeneralPayload,
    ) -> Result<AdministrateurGeneral, AppError> {
        let password_hash = match &payload.password {
            Some(password) => Some(auth::hacher_mot_de_passe(password).await?),
            None => None,
        };

        self.admin_general_repo
            .mettre_a_jour(
                id,
                payload.nom.as_deref(),
                payload.postnom.as_deref(),
                payload.prenom.as_deref(),
                payload.username.as_deref(),
                password_hash.as_deref(),
                payload.email.as_deref(),
            )
            .await
    }

    // ---
    // Internes
    // ---

    // Un gouverneur n'agit que sur les bourgmestres de sa province. Un
    // bourgmestre sans commune n'appartient à aucune province : hors portée.
    async fn verifier_portee_province(
        &self,
        province_gouverneur: Uuid,
        admin_id: Uuid,
    ) -> Result<(), AppError> {
        let commune = self
            .territoire_repo
            .trouver_commune_par_bourgmestre(admin_id)
            .await?;
        match commune {
            Some(c) if c.province_id == province_gouverneur => Ok(()),
            Some(_) => Err(AppError::Forbidden),
            None => Err(AppError::Forbidden),
        }
    }
}
