// src/models/demande.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Les quatre catégories de documents civils que la plateforme délivre.
/// C'est aussi la spécialisation d'un agent : un agent ne traite qu'un type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "type_demande", rename_all = "snake_case")]
pub enum TypeDemande {
    ActeNaissance,
    ActeMariage,
    CertificatResidence,
    CarteIdentite,
}

impl TypeDemande {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeDemande::ActeNaissance => "acte_naissance",
            TypeDemande::ActeMariage => "acte_mariage",
            TypeDemande::CertificatResidence => "certificat_residence",
            TypeDemande::CarteIdentite => "carte_identite",
        }
    }

    /// Libellé affiché sur le document rendu.
    pub fn libelle(&self) -> &'static str {
        match self {
            TypeDemande::ActeNaissance => "Acte de naissance",
            TypeDemande::ActeMariage => "Acte de mariage",
            TypeDemande::CertificatResidence => "Certificat de résidence",
            TypeDemande::CarteIdentite => "Carte d'identité",
        }
    }
}

/// Vocabulaire fermé des statuts du cycle de vie d'une demande.
/// Les identifiants en base sont TOUJOURS résolus par nom via la table
/// `statuts`, jamais par un ordinal codé en dur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatutDemande {
    Soumise,
    EnTraitement,
    Validee,
}

impl StatutDemande {
    pub fn as_nom(&self) -> &'static str {
        match self {
            StatutDemande::Soumise => "soumise",
            StatutDemande::EnTraitement => "en_traitement",
            StatutDemande::Validee => "validee",
        }
    }

    /// Seule l'orthographe canonique est reconnue ; toute variante
    /// ("en traitement", "validée"...) est rejetée.
    pub fn depuis_nom(nom: &str) -> Option<Self> {
        match nom {
            "soumise" => Some(StatutDemande::Soumise),
            "en_traitement" => Some(StatutDemande::EnTraitement),
            "validee" => Some(StatutDemande::Validee),
            _ => None,
        }
    }
}

// Une ligne de la table des statuts.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Statut {
    pub id: Uuid,
    pub nom: String,
}

// Une demande telle que stockée en base.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Demande {
    pub id: Uuid,
    pub citoyen_id: Uuid,
    pub commune_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub type_demande: TypeDemande,
    pub statut_id: Uuid,
    #[schema(value_type = Object)]
    pub donnees_json: Option<Value>,
    pub commentaires: Option<String>,
    pub document_genere: Option<String>,
    pub jeton_verification: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Vue jointe d'une demande avec ses relations résolues (citoyen, statut, agent).
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DemandeDetail {
    pub id: Uuid,
    pub citoyen_id: Uuid,
    pub commune_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub type_demande: TypeDemande,
    pub statut_id: Uuid,
    pub statut_nom: String,
    #[schema(value_type = Object)]
    pub donnees_json: Option<Value>,
    pub commentaires: Option<String>,
    pub document_genere: Option<String>,
    pub jeton_verification: Option<Uuid>,
    pub citoyen_nom: String,
    pub citoyen_prenom: String,
    pub citoyen_postnom: Option<String>,
    pub citoyen_numero_unique: String,
    pub commune_nom: String,
    pub agent_username: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Payload de création d'une demande par un citoyen.
// La commune n'est PAS fournie par le client : elle vient du citoyen authentifié.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDemandePayload {
    pub type_demande: TypeDemande,
    #[schema(value_type = Object)]
    pub donnees_json: Option<Value>,
    #[validate(length(max = 2000, message = "Les commentaires sont trop longs."))]
    pub commentaires: Option<String>,
}

// Mise à jour par le personnel : uniquement les champs libres.
// Le statut ne se modifie jamais par ici, seulement via les transitions.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDemandePayload {
    #[schema(value_type = Object)]
    pub donnees_json: Option<Value>,
    #[validate(length(max = 2000, message = "Les commentaires sont trop longs."))]
    pub commentaires: Option<String>,
}

/// Nom du fichier PDF persisté pour une demande :
/// `{type}_{id}_{jeton}.pdf`, suffixé `_signed` pour l'artefact signé.
pub fn nom_fichier_document(
    type_demande: TypeDemande,
    demande_id: Uuid,
    jeton: Uuid,
    signe: bool,
) -> String {
    let suffixe = if signe { "_signed" } else { "" };
    format!("{}_{}_{}{}.pdf", type_demande.as_str(), demande_id, jeton, suffixe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulaire_des_statuts_est_ferme() {
        assert_eq!(StatutDemande::depuis_nom("soumise"), Some(StatutDemande::Soumise));
        assert_eq!(
            StatutDemande::depuis_nom("en_traitement"),
            Some(StatutDemande::EnTraitement)
        );
        assert_eq!(StatutDemande::depuis_nom("validee"), Some(StatutDemande::Validee));

        // Les graphies divergentes historiques ne passent pas.
        assert_eq!(StatutDemande::depuis_nom("en traitement"), None);
        assert_eq!(StatutDemande::depuis_nom("validée"), None);
        assert_eq!(StatutDemande::depuis_nom("Soumise"), None);
        assert_eq!(StatutDemande::depuis_nom(""), None);
    }

    #[test]
    fn aller_retour_nom_statut() {
        for statut in [
            StatutDemande::Soumise,
            StatutDemande::EnTraitement,
            StatutDemande::Validee,
        ] {
            assert_eq!(StatutDemande::depuis_nom(statut.as_nom()), Some(statut));
        }
    }

    #[test]
    fn nom_de_fichier_non_signe_et_signe() {
        let demande_id = Uuid::nil();
        let jeton = Uuid::nil();

        let brouillon = nom_fichier_document(TypeDemande::ActeNaissance, demande_id, jeton, false);
        assert_eq!(
            brouillon,
            format!("acte_naissance_{demande_id}_{jeton}.pdf")
        );

        let signe = nom_fichier_document(TypeDemande::CarteIdentite, demande_id, jeton, true);
        assert_eq!(
            signe,
            format!("carte_identite_{demande_id}_{jeton}_signed.pdf")
        );
    }
}
