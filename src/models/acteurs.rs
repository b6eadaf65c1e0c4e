// src/models/acteurs.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::demande::TypeDemande;

/// Convention canonique retenue : champs séparés `nom` / `prenom` / `postnom`.
/// `nomComplet` n'est jamais stocké, il se calcule à la frontière de
/// sérialisation, dans l'ordre nom, prénom, postnom.
pub fn nom_complet(nom: &str, prenom: &str, postnom: Option<&str>) -> String {
    let mut parties = vec![nom, prenom];
    if let Some(p) = postnom {
        if !p.is_empty() {
            parties.push(p);
        }
    }
    parties.join(" ")
}

// Gouverneur : administrateur général d'une province (1:1 par province).
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdministrateurGeneral {
    pub id: Uuid,
    pub nom: String,
    pub postnom: Option<String>,
    pub prenom: String,
    pub username: String,
    #[serde(skip_serializing)] // IMPORTANT pour la sécurité
    pub password_hash: String,
    pub email: Option<String>,
    pub province_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Bourgmestre : la commune supervisée est portée par `communes.admin_id`,
// jamais par un champ ici. Un bourgmestre sans commune est "non assigné".
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Administrateur {
    pub id: Uuid,
    pub nom: String,
    pub postnom: Option<String>,
    pub prenom: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: Uuid,
    pub nom: String,
    pub postnom: Option<String>,
    pub prenom: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub commune_id: Uuid,
    pub type_demande: TypeDemande,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Citoyen {
    pub id: Uuid,
    pub nom: String,
    pub postnom: Option<String>,
    pub prenom: String,
    pub date_naissance: NaiveDate,
    pub sexe: String,
    pub lieu_naissance: String,
    pub commune_id: Uuid,
    pub numero_unique: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// Payloads de création / mise à jour
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdministrateurPayload {
    #[validate(length(min = 1, message = "Le nom est obligatoire."))]
    pub nom: String,
    pub postnom: Option<String>,
    #[validate(length(min = 1, message = "Le prénom est obligatoire."))]
    pub prenom: String,
    #[validate(length(min = 3, message = "Le nom d'utilisateur doit faire au moins 3 caractères."))]
    pub username: String,
    #[validate(length(min = 6, message = "Le mot de passe doit faire au moins 6 caractères."))]
    pub password: String,
    #[validate(email(message = "L'e-mail fourni est invalide."))]
    pub email: Option<String>,
    pub commune_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdministrateurPayload {
    pub nom: Option<String>,
    pub postnom: Option<String>,
    pub prenom: Option<String>,
    #[validate(length(min = 3, message = "Le nom d'utilisateur doit faire au moins 3 caractères."))]
    pub username: Option<String>,
    #[validate(length(min = 6, message = "Le mot de passe doit faire au moins 6 caractères."))]
    pub password: Option<String>,
    #[validate(email(message = "L'e-mail fourni est invalide."))]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminGeneralPayload {
    #[validate(length(min = 1, message = "Le nom est obligatoire."))]
    pub nom: String,
    pub postnom: Option<String>,
    #[validate(length(min = 1, message = "Le prénom est obligatoire."))]
    pub prenom: String,
    #[validate(length(min = 3, message = "Le nom d'utilisateur doit faire au moins 3 caractères."))]
    pub username: String,
    #[validate(length(min = 6, message = "Le mot de passe doit faire au moins 6 caractères."))]
    pub password: String,
    #[validate(email(message = "L'e-mail fourni est invalide."))]
    pub email: Option<String>,
    pub province_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdminGeneralPayload {
    pub nom: Option<String>,
    pub postnom: Option<String>,
    pub prenom: Option<String>,
    #[validate(length(min = 3, message = "Le nom d'utilisateur doit faire au moins 3 caractères."))]
    pub username: Option<String>,
    #[validate(length(min = 6, message = "Le mot de passe doit faire au moins 6 caractères."))]
    pub password: Option<String>,
    #[validate(email(message = "L'e-mail fourni est invalide."))]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgentPayload {
    #[validate(length(min = 1, message = "Le nom est obligatoire."))]
    pub nom: String,
    pub postnom: Option<String>,
    #[validate(length(min = 1, message = "Le prénom est obligatoire."))]
    pub prenom: String,
    #[validate(length(min = 3, message = "Le nom d'utilisateur doit faire au moins 3 caractères."))]
    pub username: String,
    #[validate(length(min = 6, message = "Le mot de passe doit faire au moins 6 caractères."))]
    pub password: String,
    pub type_demande: TypeDemande,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAgentPayload {
    pub nom: Option<String>,
    pub postnom: Option<String>,
    pub prenom: Option<String>,
    #[validate(length(min = 3, message = "Le nom d'utilisateur doit faire au moins 3 caractères."))]
    pub username: Option<String>,
    #[validate(length(min = 6, message = "Le mot de passe doit faire au moins 6 caractères."))]
    pub password: Option<String>,
    pub type_demande: Option<TypeDemande>,
}

// Correction d'état civil par le personnel. Le numéro unique et le mot de
// passe ne se modifient jamais par ici.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCitoyenPayload {
    #[validate(length(min = 1, message = "Le nom est obligatoire."))]
    pub nom: Option<String>,
    pub postnom: Option<String>,
    #[validate(length(min = 1, message = "Le prénom est obligatoire."))]
    pub prenom: Option<String>,
    #[validate(length(min = 1, message = "Le sexe est obligatoire."))]
    pub sexe: Option<String>,
    #[validate(length(min = 1, message = "Le lieu de naissance est obligatoire."))]
    pub lieu_naissance: Option<String>,
    pub commune_id: Option<Uuid>,
}

// ---
// Vues de réponse avec nomComplet calculé
// ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdministrateurAvecNom {
    #[serde(flatten)]
    pub administrateur: Administrateur,
    pub nom_complet: String,
}

impl From<Administrateur> for AdministrateurAvecNom {
    fn from(a: Administrateur) -> Self {
        let nom_complet = nom_complet(&a.nom, &a.prenom, a.postnom.as_deref());
        Self { administrateur: a, nom_complet }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CitoyenAvecCommune {
    #[serde(flatten)]
    pub citoyen: Citoyen,
    pub nom_complet: String,
    pub commune: crate::models::territoire::Commune,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nom_complet_ordonne_nom_prenom_postnom() {
        assert_eq!(nom_complet("Kabila", "Joseph", Some("Kabange")), "Kabila Joseph Kabange");
    }

    #[test]
    fn nom_complet_sans_postnom() {
        assert_eq!(nom_complet("Mukendi", "Alain", None), "Mukendi Alain");
        assert_eq!(nom_complet("Mukendi", "Alain", Some("")), "Mukendi Alain");
    }
}
