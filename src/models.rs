pub mod acteurs;
pub mod auth;
pub mod dashboard;
pub mod demande;
pub mod territoire;
