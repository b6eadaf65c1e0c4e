// src/services/agent_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AgentRepository, TerritoireRepository},
    models::acteurs::{Agent, CreateAgentPayload, UpdateAgentPayload},
    services::auth,
};

// Gestion des agents communaux par leur bourgmestre. La commune d'un agent
// n'est jamais fournie par le payload : c'est toujours celle que supervise
// le bourgmestre connecté.
#[derive(Clone)]
pub struct AgentService {
    agent_repo: AgentRepository,
    territoire_repo: TerritoireRepository,
}

impl AgentService {
    pub fn new(agent_repo: AgentRepository, territoire_repo: TerritoireRepository) -> Self {
        Self { agent_repo, territoire_repo }
    }

    pub async fn creer_agent(
        &self,
        bourgmestre_id: Uuid,
        payload: &CreateAgentPayload,
    ) -> Result<Agent, AppError> {
        let commune = self.ma_commune(bourgmestre_id).await?;
        let password_hash = auth::hacher_mot_de_passe(&payload.password).await?;

        let agent = self
            .agent_repo
            .creer(
                &payload.nom,
                payload.postnom.as_deref(),
                &payload.prenom,
                &payload.username,
                &password_hash,
                commune.id,
                payload.type_demande,
            )
            .await?;

        tracing::info!("✅ Agent {} recruté pour la commune {}", agent.username, commune.nom);
        Ok(agent)
    }

    pub async fn agents_de_ma_commune(
        &self,
        bourgmestre_id: Uuid,
    ) -> Result<Vec<Agent>, AppError> {
        let commune = self.ma_commune(bourgmestre_id).await?;
        self.agent_repo.lister_par_commune(commune.id).await
    }

    pub async fn trouver_agent(
        &self,
        bourgmestre_id: Uuid,
        agent_id: Uuid,
    ) -> Result<Agent, AppError> {
        let commune = self.ma_commune(bourgmestre_id).await?;
        let agent = self
            .agent_repo
            .trouver_par_id(agent_id)
            .await?
            .ok_or(AppError::NotFound("Agent"))?;
        if agent.commune_id != commune.id {
            return Err(AppError::Forbidden);
        }
        Ok(agent)
    }

    pub async fn mettre_a_jour_agent(
        &self,
        bourgmestre_id: Uuid,
        agent_id: Uuid,
        payload: &UpdateAgentPayload,
    ) -> Result<Agent, AppError> {
        // Vérifie au passage que l'agent relève bien de la commune.
        self.trouver_agent(bourgmestre_id, agent_id).await?;

        let password_hash = match &payload.password {
            Some(password) => Some(auth::hacher_mot_de_passe(password).await?),
            None => None,
        };

        self.agent_repo
            .mettre_a_jour(
                agent_id,
                payload.nom.as_deref(),
                payload.postnom.as_deref(),
                payload.prenom.as_deref(),
                payload.username.as_deref(),
                password_hash.as_deref(),
                payload.type_demande,
            )
            .await
    }

    pub async fn supprimer_agent(
        &self,
        bourgmestre_id: Uuid,
        agent_id: Uuid,
    ) -> Result<(), AppError> {
        self.trouver_agent(bourgmestre_id, agent_id).await?;
        self.agent_repo.supprimer(agent_id).await
    }

    async fn ma_commune(
        &self,
        bourgmestre_id: Uuid,
    ) -> Result<crate::models::territoire::Commune, AppError> {
        self.territoire_repo
            .trouver_commune_par_bourgmestre(bourgmestre_id)
            .await?
            .ok_or(AppError::NoCommuneSupervised)
    }
}
