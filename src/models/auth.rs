// src/models/auth.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{acteurs::Citoyen, demande::TypeDemande};

/// Les quatre rôles connus de la plateforme. Les valeurs sérialisées
/// ("admin" = bourgmestre, "admin_general" = gouverneur) sont le contrat
/// d'API historique des front-ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Citoyen,
    Agent,
    Admin,
    AdminGeneral,
}

/// Contenu ("claims") du JWT.
///
/// Portée par rôle :
/// - gouverneur : `province_id`
/// - agent : `commune_id` + `type_demande`
/// - bourgmestre : AUCUNE portée embarquée ; sa commune est retrouvée par
///   requête au moment de l'usage, pour ne jamais faire confiance à une
///   assignation périmée après réaffectation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commune_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_demande: Option<TypeDemande>,
    pub iat: usize,
    pub exp: usize,
}

/// Le contexte d'acteur vérifié, attaché à la requête par le middleware
/// d'authentification. C'est la SEULE source d'identité de confiance pour
/// les décisions d'autorisation en aval : un handler ne re-déduit jamais
/// "qui suis-je" d'un identifiant fourni par le client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Acteur {
    Citoyen { id: Uuid, commune_id: Uuid },
    Agent { id: Uuid, commune_id: Uuid, type_demande: TypeDemande },
    Bourgmestre { id: Uuid },
    Gouverneur { id: Uuid, province_id: Uuid },
}

impl Acteur {
    pub fn id(&self) -> Uuid {
        match self {
            Acteur::Citoyen { id, .. }
            | Acteur::Agent { id, .. }
            | Acteur::Bourgmestre { id }
            | Acteur::Gouverneur { id, .. } => *id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Acteur::Citoyen { .. } => Role::Citoyen,
            Acteur::Agent { .. } => Role::Agent,
            Acteur::Bourgmestre { .. } => Role::Admin,
            Acteur::Gouverneur { .. } => Role::AdminGeneral,
        }
    }

}

// Données de connexion : le citoyen s'identifie par son numéro unique,
// les autres rôles par leur nom d'utilisateur.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "Le nom d'utilisateur est obligatoire."))]
    pub username: String,
    #[validate(length(min = 1, message = "Le mot de passe est obligatoire."))]
    pub password: String,
    pub role: Role,
}

// Données d'inscription d'un citoyen (route publique).
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCitoyenPayload {
    #[validate(length(min = 1, message = "Le nom est obligatoire."))]
    pub nom: String,
    pub postnom: Option<String>,
    #[validate(length(min = 1, message = "Le prénom est obligatoire."))]
    pub prenom: String,
    pub date_naissance: NaiveDate,
    #[validate(length(min = 1, message = "Le sexe est obligatoire."))]
    pub sexe: String,
    #[validate(length(min = 1, message = "Le lieu de naissance est obligatoire."))]
    pub lieu_naissance: String,
    pub commune_id: Uuid,
    #[validate(length(min = 6, message = "Le mot de passe doit faire au moins 6 caractères."))]
    pub password: String,
}

// Réponse d'authentification avec le token.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Réponse d'inscription : le token ET le profil créé (avec le numéro unique).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InscriptionResponse {
    pub token: String,
    pub citoyen: Citoyen,
}
