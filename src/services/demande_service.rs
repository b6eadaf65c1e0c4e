// src/services/demande_service.rs

use sqlx::PgPool;
use std::{path::PathBuf, sync::Arc, time::Duration};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CitoyenRepository, DemandeRepository, TerritoireRepository},
    models::{
        auth::Acteur,
        demande::{
            nom_fichier_document, CreateDemandePayload, Demande, DemandeDetail, StatutDemande,
            UpdateDemandePayload,
        },
    },
    services::document_service::{ContexteRendu, RenduDocument},
};

/// Délai maximal accordé au rendu d'un document. Au-delà, l'appel échoue
/// en `RenderTimeout`, distinct d'un échec de rendu ordinaire.
const DELAI_RENDU: Duration = Duration::from_secs(30);

// ---
// Gardes du cycle de vie
// ---
// Chaque opération exige l'état exact qui la précède :
// soumise -> prise en charge -> en_traitement -> génération -> validation.
// Aucune étape ne peut être sautée.

fn garde_prise_en_charge(statut: StatutDemande) -> Result<(), AppError> {
    match statut {
        StatutDemande::Soumise => Ok(()),
        _ => Err(AppError::EtatInvalide(
            "seule une demande soumise peut être prise en charge",
        )),
    }
}

fn garde_generation(statut: StatutDemande) -> Result<(), AppError> {
    match statut {
        StatutDemande::EnTraitement => Ok(()),
        _ => Err(AppError::EtatInvalide("la demande doit être en traitement")),
    }
}

fn garde_validation(statut: StatutDemande, document_genere: bool) -> Result<(), AppError> {
    if statut != StatutDemande::EnTraitement {
        return Err(AppError::EtatInvalide("la demande n'est pas en traitement"));
    }
    if !document_genere {
        return Err(AppError::EtatInvalide("le document doit d'abord être généré"));
    }
    Ok(())
}

// Un citoyen ne corrige sa demande que tant qu'aucun agent ne l'a prise.
fn garde_modification_citoyen(statut: StatutDemande) -> Result<(), AppError> {
    match statut {
        StatutDemande::Soumise => Ok(()),
        _ => Err(AppError::EtatInvalide(
            "une demande déjà prise en charge n'est plus modifiable",
        )),
    }
}

// Le moteur du cycle de vie des demandes :
// soumise -> en_traitement -> (document généré) -> validee.
// Chaque transition verrouille la ligne de la demande pour la durée de la
// transaction ; une génération concurrente sur la même demande échoue en 409.
#[derive(Clone)]
pub struct DemandeService {
    demande_repo: DemandeRepository,
    citoyen_repo: CitoyenRepository,
    territoire_repo: TerritoireRepository,
    renderer: Arc<dyn RenduDocument>,
    dossier_documents: PathBuf,
    pool: PgPool,
}

impl DemandeService {
    pub fn new(
        demande_repo: DemandeRepository,
        citoyen_repo: CitoyenRepository,
        territoire_repo: TerritoireRepository,
        renderer: Arc<dyn RenduDocument>,
        dossier_documents: PathBuf,
        pool: PgPool,
    ) -> Self {
        Self {
            demande_repo,
            citoyen_repo,
            territoire_repo,
            renderer,
            dossier_documents,
            pool,
        }
    }

    // La commune vient du citoyen authentifié, jamais du payload.
    pub async fn creer(
        &self,
        citoyen_id: Uuid,
        commune_id: Uuid,
        payload: &CreateDemandePayload,
    ) -> Result<Demande, AppError> {
        let statut_soumise = self
            .demande_repo
            .statut_id(&self.pool, StatutDemande::Soumise)
            .await?;

        self.demande_repo
            .creer(
                citoyen_id,
                commune_id,
                payload.type_demande,
                statut_soumise,
                payload.donnees_json.as_ref(),
                payload.commentaires.as_deref(),
            )
            .await
    }

    // ---
    // Lectures
    // ---

    pub async fn lister_toutes(&self) -> Result<Vec<DemandeDetail>, AppError> {
        self.demande_repo.lister_toutes().await
    }

    pub async fn mes_demandes(&self, citoyen_id: Uuid) -> Result<Vec<DemandeDetail>, AppError> {
        self.demande_repo.lister_par_citoyen(citoyen_id).await
    }

    // Les documents déjà validés et signés du citoyen connecté.
    pub async fn mes_documents_valides(
        &self,
        citoyen_id: Uuid,
    ) -> Result<Vec<DemandeDetail>, AppError> {
        let statut_validee = self
            .demande_repo
            .statut_id(&self.pool, StatutDemande::Validee)
            .await?;
        self.demande_repo
            .lister_validees_par_citoyen(citoyen_id, statut_validee)
            .await
    }

    // Un citoyen ne voit que ses propres demandes ; le personnel lit largement.
    pub async fn detail(&self, acteur: &Acteur, demande_id: Uuid) -> Result<DemandeDetail, AppError> {
        let demande = self
            .demande_repo
            .trouver_detail(demande_id)
            .await?
            .ok_or(AppError::NotFound("Demande"))?;

        if let Acteur::Citoyen { id, .. } = acteur {
            if demande.citoyen_id != *id {
                return Err(AppError::Forbidden);
            }
        }
        Ok(demande)
    }

    // La file de travail de l'agent : les demandes soumises de sa commune,
    // de sa spécialisation. Les deux portées viennent du contexte vérifié.
    pub async fn file_de_l_agent(&self, acteur: &Acteur) -> Result<Vec<DemandeDetail>, AppError> {
        let Acteur::Agent { commune_id, type_demande, .. } = acteur else {
            return Err(AppError::Forbidden);
        };
        let statut_soumise = self
            .demande_repo
            .statut_id(&self.pool, StatutDemande::Soumise)
            .await?;
        self.demande_repo
            .file_a_traiter(*commune_id, *type_demande, statut_soumise)
            .await
    }

    // Les demandes en attente de signature. Le bourgmestre et l'agent sont
    // restreints à leur commune ; le gouverneur voit tout.
    pub async fn lister_a_valider(&self, acteur: &Acteur) -> Result<Vec<DemandeDetail>, AppError> {
        let commune_id = match acteur {
            Acteur::Agent { commune_id, .. } => Some(*commune_id),
            Acteur::Bourgmestre { id } => Some(self.commune_du_bourgmestre(*id).await?.id),
            Acteur::Gouverneur { .. } => None,
            Acteur::Citoyen { .. } => return Err(AppError::Forbidden),
        };
        let statut_en_traitement = self
            .demande_repo
            .statut_id(&self.pool, StatutDemande::EnTraitement)
            .await?;
        self.demande_repo
            .lister_a_valider(statut_en_traitement, commune_id)
            .await
    }

    // ---
    // Transitions
    // ---

    // soumise -> en_traitement, par un agent de la même commune et de la
    // même spécialisation que la demande.
    pub async fn prendre_en_charge(
        &self,
        acteur: &Acteur,
        demande_id: Uuid,
    ) -> Result<Demande, AppError> {
        let Acteur::Agent { id: agent_id, commune_id, type_demande } = acteur else {
            return Err(AppError::Forbidden);
        };

        let mut tx = self.pool.begin().await?;

        let demande = self
            .demande_repo
            .trouver_verrouillee(&mut *tx, demande_id)
            .await?
            .ok_or(AppError::NotFound("Demande"))?;

        if demande.commune_id != *commune_id || demande.type_demande != *type_demande {
            return Err(AppError::Forbidden);
        }

        let statut = self
            .demande_repo
            .statut_depuis_id(&mut *tx, demande.statut_id)
            .await?;
        garde_prise_en_charge(statut)?;

        let statut_en_traitement = self
            .demande_repo
            .statut_id(&mut *tx, StatutDemande::EnTraitement)
            .await?;

        let demande = self
            .demande_repo
            .passer_en_traitement(&mut *tx, demande_id, *agent_id, statut_en_traitement)
            .await?;

        tx.commit().await?;
        Ok(demande)
    }

    // Génère l'artefact non signé. La demande reste en_traitement ; seuls
    // le fichier et le jeton de vérification sont frappés. En cas d'échec
    // de rendu, rien n'est commité : les champs document restent NULL.
    pub async fn generer_document(
        &self,
        acteur: &Acteur,
        demande_id: Uuid,
    ) -> Result<Demande, AppError> {
        let mut tx = self.pool.begin().await?;

        let demande = self
            .demande_repo
            .trouver_verrouillee(&mut *tx, demande_id)
            .await?
            .ok_or(AppError::NotFound("Demande"))?;

        self.verifier_portee_personnel(acteur, &demande).await?;

        let statut = self
            .demande_repo
            .statut_depuis_id(&mut *tx, demande.statut_id)
            .await?;
        garde_generation(statut)?;

        let jeton = Uuid::new_v4();
        let contexte = self.contexte_de_rendu(demande.clone(), jeton, false).await?;
        let octets = self.rendre_avec_delai(&contexte).await?;

        let fichier = nom_fichier_document(demande.type_demande, demande.id, jeton, false);
        let chemin = self.dossier_documents.join(&fichier);
        tokio::fs::write(&chemin, &octets).await.map_err(|e| {
            tracing::error!("Écriture du document {chemin:?} impossible: {e}");
            AppError::RenderFailed
        })?;

        let resultat = match self
            .demande_repo
            .enregistrer_document(&mut *tx, demande.id, &fichier, jeton)
            .await
        {
            Ok(demande) => tx.commit().await.map(|_| demande).map_err(AppError::from),
            Err(e) => Err(e),
        };

        match resultat {
            Ok(demande) => Ok(demande),
            Err(e) => {
                // La transaction est annulée : on retire aussi le fichier
                // pour ne laisser aucune référence pendante.
                if let Err(io) = tokio::fs::remove_file(&chemin).await {
                    tracing::warn!("Nettoyage du document {chemin:?} impossible: {io}");
                }
                Err(e)
            }
        }
    }

    // Validation/signature : bourgmestre restreint à la commune de la
    // demande (la sienne, dérivée par requête), gouverneur restreint à sa
    // province. Exige un document généré et non signé, remplace l'artefact,
    // passe le statut à validee dans la même transaction.
    pub async fn valider_document(
        &self,
        acteur: &Acteur,
        demande_id: Uuid,
    ) -> Result<Demande, AppError> {
        let mut tx = self.pool.begin().await?;

        let demande = self
            .demande_repo
            .trouver_verrouillee(&mut *tx, demande_id)
            .await?
            .ok_or(AppError::NotFound("Demande"))?;

        let commune = self
            .territoire_repo
            .trouver_commune(demande.commune_id)
            .await?
            .ok_or(AppError::NotFound("Commune"))?;

        match acteur {
            Acteur::Bourgmestre { id } => {
                let ma_commune = self.commune_du_bourgmestre(*id).await?;
                if ma_commune.id != demande.commune_id {
                    return Err(AppError::Forbidden);
                }
            }
            Acteur::Gouverneur { province_id, .. } => {
                if commune.province_id != *province_id {
                    return Err(AppError::Forbidden);
                }
            }
            _ => return Err(AppError::Forbidden),
        }

        let statut = self
            .demande_repo
            .statut_depuis_id(&mut *tx, demande.statut_id)
            .await?;
        garde_validation(statut, demande.document_genere.is_some())?;

        let (ancien_fichier, jeton) = match (&demande.document_genere, demande.jeton_verification)
        {
            (Some(fichier), Some(jeton)) => (fichier.clone(), jeton),
            _ => {
                return Err(AppError::EtatInvalide(
                    "le document doit d'abord être généré",
                ))
            }
        };

        // Résolu avant l'écriture du fichier : un statut introuvable ne doit
        // laisser aucun artefact signé orphelin sur le disque.
        let statut_validee = self
            .demande_repo
            .statut_id(&mut *tx, StatutDemande::Validee)
            .await?;

        let contexte = self.contexte_de_rendu(demande.clone(), jeton, true).await?;
        let octets = self.rendre_avec_delai(&contexte).await?;

        let fichier_signe = nom_fichier_document(demande.type_demande, demande.id, jeton, true);
        let chemin_signe = self.dossier_documents.join(&fichier_signe);
        tokio::fs::write(&chemin_signe, &octets).await.map_err(|e| {
            tracing::error!("Écriture du document signé {chemin_signe:?} impossible: {e}");
            AppError::RenderFailed
        })?;

        let resultat = match self
            .demande_repo
            .valider(&mut *tx, demande.id, &fichier_signe, statut_validee)
            .await
        {
            Ok(demande) => tx.commit().await.map(|_| demande).map_err(AppError::from),
            Err(e) => Err(e),
        };

        match resultat {
            Ok(demande) => {
                // L'artefact non signé est remplacé ; son fichier est retiré
                // au mieux, l'échec n'est que loggé.
                let ancien_chemin = self.dossier_documents.join(&ancien_fichier);
                if let Err(io) = tokio::fs::remove_file(&ancien_chemin).await {
                    tracing::warn!("Nettoyage de {ancien_chemin:?} impossible: {io}");
                }
                Ok(demande)
            }
            Err(e) => {
                if let Err(io) = tokio::fs::remove_file(&chemin_signe).await {
                    tracing::warn!("Nettoyage de {chemin_signe:?} impossible: {io}");
                }
                Err(e)
            }
        }
    }

    // Téléchargement : personnel, ou citoyen propriétaire. Tout autre
    // demandeur est refusé.
    pub async fn telecharger(
        &self,
        acteur: &Acteur,
        demande_id: Uuid,
    ) -> Result<(String, Vec<u8>), AppError> {
        let demande = self
            .demande_repo
            .trouver(demande_id)
            .await?
            .ok_or(AppError::NotFound("Demande"))?;

        if let Acteur::Citoyen { id, .. } = acteur {
            if demande.citoyen_id != *id {
                return Err(AppError::Forbidden);
            }
        }

        let fichier = demande
            .document_genere
            .ok_or(AppError::NotFound("Document"))?;
        let chemin = self.dossier_documents.join(&fichier);
        let octets = tokio::fs::read(&chemin).await.map_err(|e| {
            tracing::error!("Lecture du document {chemin:?} impossible: {e}");
            AppError::NotFound("Document")
        })?;

        Ok((fichier, octets))
    }

    // ---
    // Écritures hors transition
    // ---

    // Le statut n'est jamais modifiable par ici. Un citoyen ne corrige que
    // ses propres demandes, et seulement tant qu'elles sont encore soumises ;
    // le personnel reste borné à sa portée territoriale.
    pub async fn mettre_a_jour(
        &self,
        acteur: &Acteur,
        demande_id: Uuid,
        payload: &UpdateDemandePayload,
    ) -> Result<Demande, AppError> {
        let demande = self
            .demande_repo
            .trouver(demande_id)
            .await?
            .ok_or(AppError::NotFound("Demande"))?;

        if let Acteur::Citoyen { id, .. } = acteur {
            if demande.citoyen_id != *id {
                return Err(AppError::Forbidden);
            }
            let statut = self
                .demande_repo
                .statut_depuis_id(&self.pool, demande.statut_id)
                .await?;
            garde_modification_citoyen(statut)?;
        } else {
            self.verifier_portee_personnel(acteur, &demande).await?;
        }

        self.demande_repo
            .mettre_a_jour(
                demande_id,
                payload.donnees_json.as_ref(),
                payload.commentaires.as_deref(),
            )
            .await
    }

    // Suppression : uniquement l'outrepassement administratif, jamais une
    // étape du cycle de vie normal. Le bourgmestre ne supprime que dans sa
    // commune, le gouverneur que dans sa province.
    pub async fn supprimer(&self, acteur: &Acteur, demande_id: Uuid) -> Result<(), AppError> {
        let demande = self
            .demande_repo
            .trouver(demande_id)
            .await?
            .ok_or(AppError::NotFound("Demande"))?;
        self.verifier_portee_personnel(acteur, &demande).await?;
        self.demande_repo.supprimer(demande_id).await
    }

    // ---
    // Internes
    // ---

    // La portée territoriale d'un membre du personnel face à une demande :
    // l'agent est borné à sa commune et à sa spécialisation, le bourgmestre
    // à sa commune, le gouverneur à sa province. Un citoyen n'a aucune
    // portée de personnel.
    async fn verifier_portee_personnel(
        &self,
        acteur: &Acteur,
        demande: &Demande,
    ) -> Result<(), AppError> {
        match acteur {
            Acteur::Agent { commune_id, type_demande, .. } => {
                if demande.commune_id != *commune_id || demande.type_demande != *type_demande {
                    return Err(AppError::Forbidden);
                }
            }
            Acteur::Bourgmestre { id } => {
                let ma_commune = self.commune_du_bourgmestre(*id).await?;
                if ma_commune.id != demande.commune_id {
                    return Err(AppError::Forbidden);
                }
            }
            Acteur::Gouverneur { province_id, .. } => {
                let commune = self
                    .territoire_repo
                    .trouver_commune(demande.commune_id)
                    .await?
                    .ok_or(AppError::NotFound("Commune"))?;
                if commune.province_id != *province_id {
                    return Err(AppError::Forbidden);
                }
            }
            Acteur::Citoyen { .. } => return Err(AppError::Forbidden),
        }
        Ok(())
    }

    async fn commune_du_bourgmestre(
        &self,
        admin_id: Uuid,
    ) -> Result<crate::models::territoire::Commune, AppError> {
        self.territoire_repo
            .trouver_commune_par_bourgmestre(admin_id)
            .await?
            .ok_or(AppError::NoCommuneSupervised)
    }

    async fn contexte_de_rendu(
        &self,
        demande: Demande,
        jeton: Uuid,
        signe: bool,
    ) -> Result<ContexteRendu, AppError> {
        let citoyen = self
            .citoyen_repo
            .trouver_par_id(demande.citoyen_id)
            .await?
            .ok_or(AppError::NotFound("Citoyen"))?;
        let commune = self
            .territoire_repo
            .trouver_commune(demande.commune_id)
            .await?
            .ok_or(AppError::NotFound("Commune"))?;
        Ok(ContexteRendu { demande, citoyen, commune, jeton, signe })
    }

    async fn rendre_avec_delai(&self, contexte: &ContexteRendu) -> Result<Vec<u8>, AppError> {
        match tokio::time::timeout(DELAI_RENDU, self.renderer.rendre(contexte)).await {
            Ok(Ok(octets)) => Ok(octets),
            Ok(Err(e)) => {
                tracing::error!("Rendu du document échoué pour {}: {e}", contexte.demande.id);
                Err(e)
            }
            Err(_) => {
                tracing::error!(
                    "Rendu du document hors délai ({}s) pour {}",
                    DELAI_RENDU.as_secs(),
                    contexte.demande.id
                );
                Err(AppError::RenderTimeout)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(res: Result<(), AppError>) -> &'static str {
        match res {
            Err(AppError::EtatInvalide(msg)) => msg,
            autre => panic!("EtatInvalide attendu, reçu {autre:?}"),
        }
    }

    #[test]
    fn prise_en_charge_exige_une_demande_soumise() {
        assert!(garde_prise_en_charge(StatutDemande::Soumise).is_ok());
        assert_eq!(
            message(garde_prise_en_charge(StatutDemande::EnTraitement)),
            "seule une demande soumise peut être prise en charge"
        );
        assert_eq!(
            message(garde_prise_en_charge(StatutDemande::Validee)),
            "seule une demande soumise peut être prise en charge"
        );
    }

    #[test]
    fn generation_exige_une_demande_en_traitement() {
        assert!(garde_generation(StatutDemande::EnTraitement).is_ok());
        // soumise -> génération sauterait la prise en charge
        assert!(garde_generation(StatutDemande::Soumise).is_err());
        // une demande validée est close
        assert!(garde_generation(StatutDemande::Validee).is_err());
    }

    #[test]
    fn validation_ne_saute_aucune_etape() {
        // soumise -> validation directe, même avec un document, est refusée
        assert_eq!(
            message(garde_validation(StatutDemande::Soumise, true)),
            "la demande n'est pas en traitement"
        );
        // en_traitement sans document généré : rien à signer
        assert_eq!(
            message(garde_validation(StatutDemande::EnTraitement, false)),
            "le document doit d'abord être généré"
        );
        // une demande déjà validée ne se revalide pas
        assert!(garde_validation(StatutDemande::Validee, true).is_err());

        assert!(garde_validation(StatutDemande::EnTraitement, true).is_ok());
    }

    #[test]
    fn le_citoyen_ne_modifie_que_ses_demandes_soumises() {
        assert!(garde_modification_citoyen(StatutDemande::Soumise).is_ok());
        assert_eq!(
            message(garde_modification_citoyen(StatutDemande::EnTraitement)),
            "une demande déjà prise en charge n'est plus modifiable"
        );
        assert!(garde_modification_citoyen(StatutDemande::Validee).is_err());
    }
}
