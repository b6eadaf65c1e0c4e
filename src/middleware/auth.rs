// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::{common::error::AppError, config::AppState, models::auth::Acteur};

// Le middleware lui-même : valide le Bearer et charge l'acteur depuis la
// base (un compte supprimé ne passe plus, même avec un jeton encore valide).
pub async fn garde_auth(
    State(app_state): State<AppState>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let headers = request.headers();
    let auth_header = headers.get("Authorization").and_then(|value| value.to_str().ok());

    if let Some(auth_header) = auth_header {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            let acteur = app_state.auth_service.valider_token(token).await?;

            // Insère l'acteur dans les extensions de la requête
            request.extensions_mut().insert(acteur);
            return Ok(next.run(request).await);
        }
    }

    Err(AppError::Unauthenticated)
}

// Extracteur pour obtenir l'acteur authentifié directement dans les handlers
pub struct ActeurConnecte(pub Acteur);

impl<S> FromRequestParts<S> for ActeurConnecte
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Acteur>()
            .cloned()
            .map(ActeurConnecte)
            .ok_or(AppError::Unauthenticated)
    }
}
