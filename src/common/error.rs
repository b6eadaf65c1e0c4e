use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Notre type d'erreur, avec `thiserror` pour une meilleure ergonomie.
// Chaque variante correspond à une réponse HTTP structurée ; le détail
// technique part dans les logs, jamais au client.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erreur de validation")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Authentification requise")]
    Unauthenticated,

    #[error("Accès interdit : rôle insuffisant")]
    Forbidden,

    #[error("Identifiants incorrects")]
    InvalidCredentials,

    #[error("{0} introuvable")]
    NotFound(&'static str),

    #[error("Nom d'utilisateur déjà utilisé")]
    DuplicateUsername,

    #[error("Cette commune a déjà un bourgmestre")]
    CommuneAlreadyAssigned,

    #[error("Un administrateur général existe déjà pour cette province")]
    ProvinceAlreadyAssigned,

    #[error("Impossible de trouver votre commune")]
    NoCommuneSupervised,

    #[error("Numéro unique déjà attribué")]
    NumeroUniqueConflict,

    #[error("La demande est déjà verrouillée par un autre appel")]
    GenerationConflict,

    #[error("Opération impossible dans le statut actuel : {0}")]
    EtatInvalide(&'static str),

    #[error("Échec du rendu du document")]
    RenderFailed,

    #[error("Délai de rendu du document dépassé")]
    RenderTimeout,

    // Variante pour les erreurs de base de données (sqlx)
    #[error("Erreur de base de données")]
    DatabaseError(#[from] sqlx::Error),

    // Variante générique pour tout autre imprévu.
    // `anyhow::Error` conserve le contexte pour les logs.
    #[error("Erreur interne du serveur")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erreur de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erreur de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retourne le détail de validation, champ par champ.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Un ou plusieurs champs sont invalides.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "Token d'authentification invalide ou absent.".to_string(),
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "Accès interdit : rôle insuffisant.".to_string(),
            ),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Identifiants incorrects.".to_string())
            }
            AppError::NotFound(quoi) => (StatusCode::NOT_FOUND, format!("{quoi} introuvable.")),
            AppError::DuplicateUsername => (
                StatusCode::CONFLICT,
                "Ce nom d'utilisateur est déjà utilisé.".to_string(),
            ),
            AppError::CommuneAlreadyAssigned => (
                StatusCode::CONFLICT,
                "Cette commune a déjà un bourgmestre.".to_string(),
            ),
            AppError::ProvinceAlreadyAssigned => (
                StatusCode::CONFLICT,
                "Un administrateur général existe déjà pour cette province.".to_string(),
            ),
            AppError::NoCommuneSupervised => (
                StatusCode::CONFLICT,
                "Impossible de trouver votre commune.".to_string(),
            ),
            AppError::NumeroUniqueConflict => (
                StatusCode::CONFLICT,
                "Le numéro unique généré est déjà attribué.".to_string(),
            ),
            AppError::GenerationConflict => (
                StatusCode::CONFLICT,
                "Cette demande est déjà en cours de traitement, réessayez.".to_string(),
            ),
            AppError::EtatInvalide(detail) => (
                StatusCode::CONFLICT,
                format!("Opération impossible dans le statut actuel : {detail}."),
            ),
            AppError::RenderFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "La génération du document a échoué.".to_string(),
            ),
            AppError::RenderTimeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "La génération du document a dépassé le délai imparti.".to_string(),
            ),

            // Tous les autres (DatabaseError, InternalServerError...) deviennent 500.
            // Le log garde la cause détaillée que `thiserror` nous donne.
            ref e => {
                tracing::error!("Erreur interne du serveur: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Une erreur inattendue est survenue.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
