pub mod territoire_repo;
pub use territoire_repo::TerritoireRepository;
pub mod administrateur_repo;
pub use administrateur_repo::AdministrateurRepository;
pub mod admin_general_repo;
pub use admin_general_repo::AdminGeneralRepository;
pub mod agent_repo;
pub use agent_repo::AgentRepository;
pub mod citoyen_repo;
pub use citoyen_repo::CitoyenRepository;
pub mod demande_repo;
pub use demande_repo::DemandeRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
