// src/handlers/event.rs
//
// Programações ("services") de uma igreja. As rotas de escrita exigem
// token; as duas consultas de eventos são públicas.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        extract::{JsonBody, PathParam},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, church_code::ChurchCode},
    models::event::{AgendaItem, Announcement, Assignment, ScheduleInput},
    services::event_query_service::{EventSearchParams, EventSearchResult, TodayEvents},
};

// ---
// 1. Agenda
// ---
#[utoipa::path(
    post,
    path = "/v1/church/service/{code}",
    tag = "Services",
    request_body = ScheduleInput,
    params(("code" = String, Path, description = "Código da igreja")),
    responses(
        (status = 201, description = "Programação criada, pendente de publicação"),
        (status = 400, description = "Datas inválidas, conflito de horário ou sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_event(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ChurchCode(code): ChurchCode,
    JsonBody(input): JsonBody<ScheduleInput>,
) -> Result<StatusCode, AppError> {
    app_state.event_service.create(&user.0, &code, input).await?;
    Ok(StatusCode::CREATED)
}

#[utoipa::path(
    patch,
    path = "/v1/church/service/{id}",
    tag = "Services",
    request_body = ScheduleInput,
    params(("id" = Uuid, Path, description = "ID da programação")),
    responses(
        (status = 200, description = "Programação atualizada"),
        (status = 400, description = "Datas inválidas, conflito de horário ou sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_event(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    PathParam(id): PathParam<Uuid>,
    JsonBody(input): JsonBody<ScheduleInput>,
) -> Result<StatusCode, AppError> {
    app_state.event_service.update(&user.0, id, input).await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    patch,
    path = "/v1/church/service/publish/{id}",
    tag = "Services",
    params(("id" = Uuid, Path, description = "ID da programação")),
    responses(
        (status = 200, description = "Programação publicada"),
        (status = 400, description = "Já publicada ou sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn publish_event(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.event_service.publish(&user.0, id).await?;
    Ok(StatusCode::OK)
}

// ---
// 2. Liturgia, avisos e escala (lista inteira substituída)
// ---
#[utoipa::path(
    post,
    path = "/v1/church/service/liturgy/{id}",
    tag = "Services",
    request_body = Vec<AgendaItem>,
    params(("id" = Uuid, Path, description = "ID da programação")),
    responses(
        (status = 200, description = "Liturgia gravada", body = Vec<AgendaItem>),
        (status = 400, description = "Lista vazia, item inválido ou sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn replace_agenda(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    PathParam(id): PathParam<Uuid>,
    JsonBody(items): JsonBody<Vec<AgendaItem>>,
) -> Result<impl IntoResponse, AppError> {
    let agenda = app_state
        .event_service
        .replace_agenda(&user.0, id, items)
        .await?;
    Ok(Json(agenda))
}

#[utoipa::path(
    post,
    path = "/v1/church/service/news/{id}",
    tag = "Services",
    request_body = Vec<Announcement>,
    params(("id" = Uuid, Path, description = "ID da programação")),
    responses(
        (status = 200, description = "Avisos gravados", body = Vec<Announcement>),
        (status = 400, description = "Lista vazia, item inválido ou sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn replace_announcements(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    PathParam(id): PathParam<Uuid>,
    JsonBody(items): JsonBody<Vec<Announcement>>,
) -> Result<impl IntoResponse, AppError> {
    let announcements = app_state
        .event_service
        .replace_announcements(&user.0, id, items)
        .await?;
    Ok(Json(announcements))
}

#[utoipa::path(
    post,
    path = "/v1/church/service/servants/{id}",
    tag = "Services",
    request_body = Vec<Assignment>,
    params(("id" = Uuid, Path, description = "ID da programação")),
    responses(
        (status = 200, description = "Escala gravada", body = Vec<Assignment>),
        (status = 400, description = "Lista vazia, item inválido ou sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn replace_assignments(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    PathParam(id): PathParam<Uuid>,
    JsonBody(items): JsonBody<Vec<Assignment>>,
) -> Result<impl IntoResponse, AppError> {
    let assignments = app_state
        .event_service
        .replace_assignments(&user.0, id, items)
        .await?;
    Ok(Json(assignments))
}

// ---
// 3. Consultas públicas
// ---
#[utoipa::path(
    get,
    path = "/v1/church/service/events",
    tag = "Events",
    params(EventSearchParams),
    responses(
        (status = 200, description = "Igrejas e programações publicadas na janela", body = EventSearchResult),
        (status = 400, description = "Janela inválida ou maior que 30 dias")
    )
)]
pub async fn search_events(
    State(app_state): State<AppState>,
    Query(params): Query<EventSearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let result = app_state
        .event_query_service
        .search(&params, Utc::now())
        .await?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/v1/church/service/events/{code}",
    tag = "Events",
    params(("code" = String, Path, description = "Código da igreja")),
    responses(
        (status = 200, description = "Programações publicadas hoje (fuso da igreja)", body = TodayEvents),
        (status = 400, description = "Igreja inexistente ou inativa")
    )
)]
pub async fn today_events(
    State(app_state): State<AppState>,
    ChurchCode(code): ChurchCode,
) -> Result<impl IntoResponse, AppError> {
    let today = app_state
        .event_query_service
        .today(&code, Utc::now())
        .await?;
    Ok(Json(today))
}
