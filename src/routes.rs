// src/routes.rs

use std::time::Duration;

use axum::{
    http::{header, Method},
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

/// Monta o router completo da API sobre um `AppState` já construído.
pub fn router(app_state: AppState) -> Router {
    // Rotas públicas
    let public_routes = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/v1/church/service/events", get(handlers::event::search_events))
        .route(
            "/v1/church/service/events/{code}",
            get(handlers::event::today_events),
        );

    // Igreja (perfil)
    let church_routes = Router::new()
        .route("/v1/church", get(handlers::church::list_my_churches))
        .route("/v1/church/register", post(handlers::church::register_church))
        .route("/v1/church/update/{code}", patch(handlers::church::update_church))
        .route("/v1/church/detail/{code}", get(handlers::church::church_detail))
        .route(
            "/v1/church/reactivate/{code}",
            patch(handlers::church::reactivate_church),
        )
        .route(
            "/v1/church/inactivate/{code}",
            delete(handlers::church::inactivate_church),
        );

    // Servos, locais e admins
    let roster_routes = Router::new()
        .route(
            "/v1/church/servants/{code}",
            post(handlers::roster::add_servant)
                .patch(handlers::roster::update_servant)
                .delete(handlers::roster::inactivate_servant)
                .get(handlers::roster::list_servants),
        )
        .route(
            "/v1/church/servants/reactivate/{code}",
            patch(handlers::roster::reactivate_servant),
        )
        .route(
            "/v1/church/locations/{code}",
            post(handlers::roster::add_location)
                .patch(handlers::roster::rename_location)
                .delete(handlers::roster::inactivate_location)
                .get(handlers::roster::list_locations),
        )
        .route(
            "/v1/church/locations/reactivate/{code}",
            patch(handlers::roster::reactivate_location),
        )
        .route(
            "/v1/church/admins/{code}",
            post(handlers::roster::add_admin)
                .delete(handlers::roster::remove_admin)
                .get(handlers::roster::list_admins),
        );

    // Programações: POST recebe o código da igreja, PATCH o ID da programação
    let event_routes = Router::new()
        .route(
            "/v1/church/service/{key}",
            post(handlers::event::create_event).patch(handlers::event::update_event),
        )
        .route(
            "/v1/church/service/publish/{id}",
            patch(handlers::event::publish_event),
        )
        .route(
            "/v1/church/service/liturgy/{id}",
            post(handlers::event::replace_agenda),
        )
        .route(
            "/v1/church/service/news/{id}",
            post(handlers::event::replace_announcements),
        )
        .route(
            "/v1/church/service/servants/{id}",
            post(handlers::event::replace_assignments),
        );

    let protected_routes = church_routes
        .merge(roster_routes)
        .merge(event_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_origin(Any)
        .max_age(Duration::from_secs(3600));

    // Combina tudo no router principal
    Router::new()
        .merge(SwaggerUi::new("/administration-api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}
