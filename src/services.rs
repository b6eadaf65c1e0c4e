pub mod administrateur_service;
pub mod agent_service;
pub mod auth;
pub mod dashboard_service;
pub mod demande_service;
pub mod document_service;
