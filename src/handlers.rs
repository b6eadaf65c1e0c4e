pub mod administrateurs;
pub mod admins_generaux;
pub mod agents;
pub mod auth;
pub mod citoyens;
pub mod dashboard;
pub mod demandes;
pub mod territoire;
