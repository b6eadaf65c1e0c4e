//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::garde_auth;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() est voulu ici : si la configuration échoue, l'application
    // ne doit pas démarrer.
    let app_state = AppState::new()
        .await
        .expect("Échec de l'initialisation de l'état de l'application.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Échec des migrations de la base de données.");

    tracing::info!("✅ Migrations de la base de données exécutées avec succès !");

    // Dans chaque groupe, les routes ajoutées APRÈS le .layer() restent
    // publiques : connexion, inscription, référentiels du formulaire
    // d'inscription.
    let auth_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), garde_auth))
        .route("/login", post(handlers::auth::login));

    let citoyen_routes = Router::new()
        .route(
            "/",
            get(handlers::citoyens::lister).post(handlers::citoyens::creer),
        )
        .route(
            "/{id}",
            get(handlers::citoyens::trouver)
                .put(handlers::citoyens::mettre_a_jour)
                .delete(handlers::citoyens::supprimer),
        )
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), garde_auth))
        .route("/register", post(handlers::citoyens::register));

    let commune_routes = Router::new()
        .route("/", get(handlers::territoire::lister_communes))
        .route("/ma-province", get(handlers::territoire::communes_de_ma_province))
        .route("/ma-commune", get(handlers::territoire::ma_commune))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), garde_auth))
        .route(
            "/public/province/{id}",
            get(handlers::territoire::communes_publiques_par_province),
        );

    let administrateur_routes = Router::new()
        .route(
            "/",
            post(handlers::administrateurs::creer).get(handlers::administrateurs::lister),
        )
        .route(
            "/{id}",
            get(handlers::administrateurs::trouver)
                .put(handlers::administrateurs::mettre_a_jour)
                .delete(handlers::administrateurs::supprimer),
        )
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), garde_auth));

    // Pas de middleware ici : le POST est la route d'amorçage (publique),
    // les autres sont gardées directement par l'extracteur de rôle.
    let admin_general_routes = Router::new()
        .route(
            "/",
            post(handlers::admins_generaux::creer).get(handlers::admins_generaux::lister),
        )
        .route(
            "/{id}",
            get(handlers::admins_generaux::trouver).put(handlers::admins_generaux::mettre_a_jour),
        );

    let agent_routes = Router::new()
        .route("/", post(handlers::agents::creer).get(handlers::agents::lister))
        .route(
            "/{id}",
            get(handlers::agents::trouver)
                .put(handlers::agents::mettre_a_jour)
                .delete(handlers::agents::supprimer),
        )
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), garde_auth));

    let demande_routes = Router::new()
        .route(
            "/",
            post(handlers::demandes::creer).get(handlers::demandes::lister_toutes),
        )
        .route("/me", get(handlers::demandes::mes_demandes))
        .route("/validated", get(handlers::demandes::mes_documents_valides))
        .route("/validation", get(handlers::demandes::a_valider))
        .route("/file-agent", get(handlers::demandes::file_agent))
        .route(
            "/{id}",
            get(handlers::demandes::detail)
                .put(handlers::demandes::mettre_a_jour)
                .delete(handlers::demandes::supprimer),
        )
        .route(
            "/{id}/prendre-en-charge",
            put(handlers::demandes::prendre_en_charge),
        )
        .route(
            "/{id}/generate-document",
            put(handlers::demandes::generer_document),
        )
        .route(
            "/{id}/validate-document",
            put(handlers::demandes::valider_document),
        )
        .route("/{id}/download", get(handlers::demandes::telecharger))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), garde_auth));

    let dashboard_routes = Router::new()
        .route("/admin-general", get(handlers::dashboard::stats_admin_general))
        .route("/bourgmestre", get(handlers::dashboard::stats_bourgmestre))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), garde_auth));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/provinces", get(handlers::territoire::lister_provinces))
        .route("/api/statuts/public", get(handlers::demandes::lister_statuts))
        .nest("/api/auth", auth_routes)
        .nest("/api/citoyens", citoyen_routes)
        .nest("/api/communes", commune_routes)
        .nest("/api/administrateurs", administrateur_routes)
        .nest("/api/administrateurs-generaux", admin_general_routes)
        .nest("/api/agents", agent_routes)
        .nest("/api/demandes", demande_routes)
        .nest("/api/dashboard", dashboard_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "4000".into());
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Échec du démarrage du listener TCP");
    tracing::info!("🚀 Serveur à l'écoute sur {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erreur du serveur Axum");
}
