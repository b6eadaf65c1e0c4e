// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{NaiveDate, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::{distributions::Alphanumeric, Rng};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        AdminGeneralRepository, AdministrateurRepository, AgentRepository, CitoyenRepository,
        TerritoireRepository,
    },
    models::{
        acteurs::Citoyen,
        auth::{Acteur, Claims, RegisterCitoyenPayload, Role},
        demande::TypeDemande,
    },
};

/// Durée de vie canonique d'un token, pour TOUS les points d'émission.
pub const DUREE_TOKEN_HEURES: i64 = 24;

const TENTATIVES_NUMERO_UNIQUE: u32 = 5;

// ---
// Émission / vérification des tokens
// ---

pub fn signer_token(secret: &str, claims: &Claims) -> Result<String, AppError> {
    Ok(encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

// Toute défaillance (signature, expiration, rôle inconnu dans le claim)
// devient un 401 indifférencié.
pub fn verifier_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthenticated)?;
    Ok(token_data.claims)
}

/// Construit les claims d'un acteur. Le bourgmestre ne porte AUCUNE portée :
/// sa commune est dérivée par requête au moment de l'usage.
pub fn nouveaux_claims(
    sub: Uuid,
    role: Role,
    province_id: Option<Uuid>,
    commune_id: Option<Uuid>,
    type_demande: Option<TypeDemande>,
) -> Claims {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::hours(DUREE_TOKEN_HEURES);
    Claims {
        sub,
        role,
        province_id,
        commune_id,
        type_demande,
        iat: now.timestamp() as usize,
        exp: expires_at.timestamp() as usize,
    }
}

// ---
// Mots de passe (bcrypt, hors du runtime async)
// ---

pub async fn hacher_mot_de_passe(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Échec de la tâche de hachage: {e}"))??;
    Ok(hashed)
}

pub async fn verifier_mot_de_passe(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let valide = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Échec de la tâche de vérification: {e}"))??;
    Ok(valide)
}

// ---
// Numéro unique du citoyen
// ---

/// Initiale de la province + initiales de la commune + date de naissance
/// + suffixe aléatoire. Le suffixe est court : la collision est possible,
/// donc détectée par contrainte d'unicité et réessayée par l'appelant.
pub fn generer_numero_unique(
    province_nom: &str,
    commune_nom: &str,
    date_naissance: NaiveDate,
) -> String {
    let initiale_province: String = province_nom
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default();

    let initiales_commune: String = commune_nom
        .split_whitespace()
        .filter_map(|mot| mot.chars().next())
        .take(3)
        .flat_map(|c| c.to_uppercase())
        .collect();

    let suffixe: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(4)
        .map(|octet| (octet as char).to_ascii_uppercase())
        .collect();

    format!(
        "{}{}-{}-{}",
        initiale_province,
        initiales_commune,
        date_naissance.format("%Y%m%d"),
        suffixe
    )
}

// ---
// Le service
// ---

#[derive(Clone)]
pub struct AuthService {
    citoyen_repo: CitoyenRepository,
    agent_repo: AgentRepository,
    administrateur_repo: AdministrateurRepository,
    admin_general_repo: AdminGeneralRepository,
    territoire_repo: TerritoireRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(
        citoyen_repo: CitoyenRepository,
        agent_repo: AgentRepository,
        administrateur_repo: AdministrateurRepository,
        admin_general_repo: AdminGeneralRepository,
        territoire_repo: TerritoireRepository,
        jwt_secret: String,
    ) -> Self {
        Self {
            citoyen_repo,
            agent_repo,
            administrateur_repo,
            admin_general_repo,
            territoire_repo,
            jwt_secret,
        }
    }

    // Connexion unifiée des quatre rôles. Le citoyen s'identifie par son
    // numéro unique. Les échecs sont indifférenciés (pas d'indice sur
    // l'existence du compte).
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<String, AppError> {
        let claims = match role {
            Role::Citoyen => {
                let citoyen = self
                    .citoyen_repo
                    .trouver_par_numero_unique(username)
                    .await?
                    .ok_or(AppError::InvalidCredentials)?;
                self.controler_mot_de_passe(password, &citoyen.password_hash).await?;
                nouveaux_claims(citoyen.id, Role::Citoyen, None, None, None)
            }
            Role::Agent => {
                let agent = self
                    .agent_repo
                    .trouver_par_username(username)
                    .await?
                    .ok_or(AppError::InvalidCredentials)?;
                self.controler_mot_de_passe(password, &agent.password_hash).await?;
                nouveaux_claims(
                    agent.id,
                    Role::Agent,
                    None,
                    Some(agent.commune_id),
                    Some(agent.type_demande),
                )
            }
            Role::Admin => {
                let admin = self
                    .administrateur_repo
                    .trouver_par_username(username)
                    .await?
                    .ok_or(AppError::InvalidCredentials)?;
                self.controler_mot_de_passe(password, &admin.password_hash).await?;
                // Pas de commune dans le token : dérivée à chaque usage.
                nouveaux_claims(admin.id, Role::Admin, None, None, None)
            }
            Role::AdminGeneral => {
                let admin = self
                    .admin_general_repo
                    .trouver_par_username(username)
                    .await?
                    .ok_or(AppError::InvalidCredentials)?;
                self.controler_mot_de_passe(password, &admin.password_hash).await?;
                nouveaux_claims(
                    admin.id,
                    Role::AdminGeneral,
                    Some(admin.province_id),
                    None,
                    None,
                )
            }
        };

        signer_token(&self.jwt_secret, &claims)
    }

    async fn controler_mot_de_passe(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<(), AppError> {
        if !verifier_mot_de_passe(password, password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }
        Ok(())
    }

    // Inscription publique d'un citoyen : frappe le numéro unique et
    // réessaie en cas de collision détectée par la contrainte d'unicité.
    pub async fn inscrire_citoyen(
        &self,
        payload: &RegisterCitoyenPayload,
    ) -> Result<(String, Citoyen), AppError> {
        let commune = self
            .territoire_repo
            .trouver_commune(payload.commune_id)
            .await?
            .ok_or(AppError::NotFound("Commune"))?;
        let province = self
            .territoire_repo
            .trouver_province(commune.province_id)
            .await?
            .ok_or(AppError::NotFound("Province"))?;

        let password_hash = hacher_mot_de_passe(&payload.password).await?;

        let mut tentative = 1;
        let citoyen = loop {
            let numero =
                generer_numero_unique(&province.nom, &commune.nom, payload.date_naissance);

            match self
                .citoyen_repo
                .creer(
                    &payload.nom,
                    payload.postnom.as_deref(),
                    &payload.prenom,
                    payload.date_naissance,
                    &payload.sexe,
                    &payload.lieu_naissance,
                    commune.id,
                    &numero,
                    &password_hash,
                )
                .await
            {
                Ok(citoyen) => break citoyen,
                Err(AppError::NumeroUniqueConflict) if tentative < TENTATIVES_NUMERO_UNIQUE => {
                    tracing::warn!(
                        "Collision sur le numéro unique {numero} (tentative {tentative}), régénération"
                    );
                    tentative += 1;
                }
                Err(e) => return Err(e),
            }
        };

        let claims = nouveaux_claims(citoyen.id, Role::Citoyen, None, None, None);
        let token = signer_token(&self.jwt_secret, &claims)?;
        Ok((token, citoyen))
    }

    // Résout un token en contexte d'acteur vérifié. L'acteur est rechargé
    // depuis la base : un compte supprimé après émission du token est
    // rejeté, et les portées (commune, province) sont toujours fraîches.
    pub async fn valider_token(&self, token: &str) -> Result<Acteur, AppError> {
        let claims = verifier_token(&self.jwt_secret, token)?;

        let acteur = match claims.role {
            Role::Citoyen => {
                let citoyen = self
                    .citoyen_repo
                    .trouver_par_id(claims.sub)
                    .await?
                    .ok_or(AppError::Unauthenticated)?;
                Acteur::Citoyen { id: citoyen.id, commune_id: citoyen.commune_id }
            }
            Role::Agent => {
                let agent = self
                    .agent_repo
                    .trouver_par_id(claims.sub)
                    .await?
                    .ok_or(AppError::Unauthenticated)?;
                Acteur::Agent {
                    id: agent.id,
                    commune_id: agent.commune_id,
                    type_demande: agent.type_demande,
                }
            }
            Role::Admin => {
                let admin = self
                    .administrateur_repo
                    .trouver_par_id(claims.sub)
                    .await?
                    .ok_or(AppError::Unauthenticated)?;
                Acteur::Bourgmestre { id: admin.id }
            }
            Role::AdminGeneral => {
                let admin = self
                    .admin_general_repo
                    .trouver_par_id(claims.sub)
                    .await?
                    .ok_or(AppError::Unauthenticated)?;
                Acteur::Gouverneur { id: admin.id, province_id: admin.province_id }
            }
        };

        Ok(acteur)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "secret-de-test";

    #[test]
    fn aller_retour_token() {
        let sub = Uuid::new_v4();
        let province_id = Uuid::new_v4();
        let claims = nouveaux_claims(sub, Role::AdminGeneral, Some(province_id), None, None);

        let token = signer_token(SECRET, &claims).unwrap();
        let relus = verifier_token(SECRET, &token).unwrap();

        assert_eq!(relus.sub, sub);
        assert_eq!(relus.role, Role::AdminGeneral);
        assert_eq!(relus.province_id, Some(province_id));
        assert_eq!(relus.commune_id, None);
    }

    #[test]
    fn token_signe_avec_un_autre_secret_est_rejete() {
        let claims = nouveaux_claims(Uuid::new_v4(), Role::Agent, None, None, None);
        let token = signer_token("autre-secret", &claims).unwrap();

        assert!(matches!(
            verifier_token(SECRET, &token),
            Err(AppError::Unauthenticated)
        ));
    }

    #[test]
    fn token_expire_est_rejete() {
        let mut claims = nouveaux_claims(Uuid::new_v4(), Role::Citoyen, None, None, None);
        // Expiré bien au-delà de la tolérance de l'horloge.
        claims.iat -= 7200;
        claims.exp = claims.iat + 60;

        let token = signer_token(SECRET, &claims).unwrap();
        assert!(matches!(
            verifier_token(SECRET, &token),
            Err(AppError::Unauthenticated)
        ));
    }

    #[test]
    fn token_corrompu_est_rejete() {
        let claims = nouveaux_claims(Uuid::new_v4(), Role::Citoyen, None, None, None);
        let mut token = signer_token(SECRET, &claims).unwrap();
        token.push('x');

        assert!(matches!(
            verifier_token(SECRET, &token),
            Err(AppError::Unauthenticated)
        ));
    }

    #[test]
    fn le_bourgmestre_ne_porte_aucune_portee_dans_le_token() {
        let claims = nouveaux_claims(Uuid::new_v4(), Role::Admin, None, None, None);
        assert_eq!(claims.province_id, None);
        assert_eq!(claims.commune_id, None);
        assert_eq!(claims.type_demande, None);
    }

    #[test]
    fn format_du_numero_unique() {
        let date = NaiveDate::from_ymd_opt(1990, 3, 7).unwrap();
        let numero = generer_numero_unique("Kinshasa", "Mont Ngafula", date);

        // K + MN + date + tiret + 4 caractères
        assert!(numero.starts_with("KMN-19900307-"), "numero = {numero}");
        assert_eq!(numero.len(), "KMN-19900307-XXXX".len());
    }

    #[test]
    fn deux_numeros_successifs_different() {
        let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let a = generer_numero_unique("Kinshasa", "Gombe", date);
        let b = generer_numero_unique("Kinshasa", "Gombe", date);
        // Même préfixe déterministe, suffixes aléatoires indépendants.
        let prefixe = a.len() - 4;
        assert_eq!(a[..prefixe], b[..prefixe]);
        assert_ne!(a, b);
    }
}
