// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Church ---
        handlers::church::register_church,
        handlers::church::update_church,
        handlers::church::list_my_churches,
        handlers::church::church_detail,
        handlers::church::reactivate_church,
        handlers::church::inactivate_church,

        // --- Servants ---
        handlers::roster::add_servant,
        handlers::roster::update_servant,
        handlers::roster::inactivate_servant,
        handlers::roster::reactivate_servant,
        handlers::roster::list_servants,

        // --- Locations ---
        handlers::roster::add_location,
        handlers::roster::rename_location,
        handlers::roster::inactivate_location,
        handlers::roster::reactivate_location,
        handlers::roster::list_locations,

        // --- Admins ---
        handlers::roster::add_admin,
        handlers::roster::remove_admin,
        handlers::roster::list_admins,

        // --- Services ---
        handlers::event::create_event,
        handlers::event::update_event,
        handlers::event::publish_event,
        handlers::event::replace_agenda,
        handlers::event::replace_announcements,
        handlers::event::replace_assignments,

        // --- Events (públicas) ---
        handlers::event::search_events,
        handlers::event::today_events,
    ),
    components(
        schemas(
            // --- Church ---
            models::church::ChurchStatus,
            models::church::RosterStatus,
            models::church::Servant,
            models::church::Location,
            models::church::ChurchSummary,
            models::church::ChurchListing,
            models::church::ChurchProfile,
            models::church::ChurchDetail,
            models::church::ServantList,
            models::church::LocationList,

            // --- Services ---
            models::event::EventStatus,
            models::event::LocationRef,
            models::event::AgendaItem,
            models::event::Announcement,
            models::event::Assignment,
            models::event::Event,
            models::event::ScheduleInput,
            services::event_query_service::EventSearchResult,
            services::event_query_service::TodayEvents,

            // --- Payloads ---
            handlers::church::RegisterChurchPayload,
            handlers::church::UpdateChurchPayload,
            handlers::roster::ServantPayload,
            handlers::roster::ServantEmailPayload,
            handlers::roster::LocationPayload,
            handlers::roster::LocationCodePayload,
            handlers::roster::AdminPayload,
        )
    ),
    tags(
        (name = "Church", description = "Cadastro e perfil da igreja"),
        (name = "Servants", description = "Servos da igreja"),
        (name = "Locations", description = "Locais da igreja"),
        (name = "Admins", description = "Administradores da igreja"),
        (name = "Services", description = "Programações: agenda, publicação, liturgia, avisos e escala"),
        (name = "Events", description = "Consulta pública de programações publicadas")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
