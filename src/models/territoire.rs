// src/models/territoire.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

// Région administrative de premier niveau.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Province {
    pub id: Uuid,
    pub nom: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Une commune appartient à une province et est supervisée par au plus
// un bourgmestre (`admin_id` nullable : commune "non supervisée").
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Commune {
    pub id: Uuid,
    pub nom: String,
    pub code: Option<String>,
    pub province_id: Uuid,
    pub admin_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Vue jointe : commune + identité du bourgmestre assigné, pour les listings.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommuneAvecBourgmestreRow {
    pub id: Uuid,
    pub nom: String,
    pub code: Option<String>,
    pub province_id: Uuid,
    pub admin_id: Option<Uuid>,
    pub bourgmestre_username: Option<String>,
    pub bourgmestre_nom: Option<String>,
    pub bourgmestre_prenom: Option<String>,
    pub bourgmestre_postnom: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommuneAvecBourgmestre {
    pub id: Uuid,
    pub nom: String,
    pub code: Option<String>,
    pub province_id: Uuid,
    pub admin_id: Option<Uuid>,
    pub bourgmestre_username: Option<String>,
    pub bourgmestre_nom_complet: Option<String>,
}

impl From<CommuneAvecBourgmestreRow> for CommuneAvecBourgmestre {
    fn from(row: CommuneAvecBourgmestreRow) -> Self {
        let nom_complet = match (&row.bourgmestre_nom, &row.bourgmestre_prenom) {
            (Some(nom), Some(prenom)) => Some(crate::models::acteurs::nom_complet(
                nom,
                prenom,
                row.bourgmestre_postnom.as_deref(),
            )),
            _ => None,
        };
        Self {
            id: row.id,
            nom: row.nom,
            code: row.code,
            province_id: row.province_id,
            admin_id: row.admin_id,
            bourgmestre_username: row.bourgmestre_username,
            bourgmestre_nom_complet: nom_complet,
        }
    }
}
