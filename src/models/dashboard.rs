// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;

// Agrégats du tableau de bord du gouverneur : tout est compté dans SA
// province (jointure par communes.province_id, jamais un paramètre client).
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsAdminGeneral {
    pub communes: i64,
    pub administrateurs: i64,
    pub agents: i64,
}

// Agrégats du tableau de bord du bourgmestre, pour sa commune supervisée.
// Les compteurs par statut sont résolus par nom canonique.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsBourgmestre {
    pub agents: i64,
    pub demandes_total: i64,
    pub demandes_en_traitement: i64,
    pub demandes_validees: i64,
}
