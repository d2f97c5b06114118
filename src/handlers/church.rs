// src/handlers/church.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::{error::AppError, extract::JsonBody},
    config::AppState,
    middleware::{auth::AuthenticatedUser, church_code::ChurchCode},
    models::church::{ChurchDetail, ChurchListing, ChurchProfile, ChurchSummary},
    services::{
        church_service::ChurchProfileInput,
        time_window::{MAX_OFFSET_MINUTES, MIN_OFFSET_MINUTES},
    },
};

// ---
// 1. Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterChurchPayload {
    #[validate(length(min = 1, max = 64, message = "O código da igreja é obrigatório."))]
    #[schema(example = "hkbp-menteng")]
    pub code: String,

    #[validate(length(min = 1, message = "O nome da igreja é obrigatório."))]
    #[schema(example = "HKBP Menteng")]
    pub name: String,

    pub address: Option<String>,

    /// Minutos em relação ao UTC. `0` é válido.
    #[validate(
        required(message = "O campo 'timeOffset' é obrigatório."),
        range(min = MIN_OFFSET_MINUTES, max = MAX_OFFSET_MINUTES)
    )]
    #[schema(example = 420)]
    pub time_offset: Option<i32>,

    #[serde(default)]
    #[schema(example = json!(["tata@example.com"]))]
    pub admins: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChurchPayload {
    #[validate(length(min = 1, message = "O nome da igreja é obrigatório."))]
    pub name: String,

    pub address: Option<String>,

    #[validate(
        required(message = "O campo 'timeOffset' é obrigatório."),
        range(min = MIN_OFFSET_MINUTES, max = MAX_OFFSET_MINUTES)
    )]
    pub time_offset: Option<i32>,

    /// Substitui a lista de admins; quem chama continua admin.
    #[serde(default)]
    pub admins: Vec<String>,
}

fn profile_input(
    name: String,
    address: Option<String>,
    time_offset: Option<i32>,
    admins: Vec<String>,
) -> Result<ChurchProfileInput, AppError> {
    let time_offset = time_offset
        .ok_or_else(|| AppError::Validation("O campo 'timeOffset' é obrigatório".into()))?;

    Ok(ChurchProfileInput {
        name,
        address,
        time_offset,
        admins,
    })
}

// ---
// 2. Handlers
// ---
#[utoipa::path(
    post,
    path = "/v1/church/register",
    tag = "Church",
    request_body = RegisterChurchPayload,
    responses(
        (status = 201, description = "Igreja cadastrada", body = ChurchSummary),
        (status = 400, description = "Dados inválidos ou igreja já existente")
    ),
    security(("api_jwt" = []))
)]
pub async fn register_church(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(payload): JsonBody<RegisterChurchPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let input = profile_input(payload.name, payload.address, payload.time_offset, payload.admins)?;
    let church = app_state
        .church_service
        .register(&user.0, &payload.code, input)
        .await?;

    Ok((StatusCode::CREATED, Json(church.summary())))
}

#[utoipa::path(
    patch,
    path = "/v1/church/update/{code}",
    tag = "Church",
    request_body = UpdateChurchPayload,
    params(("code" = String, Path, description = "Código da igreja")),
    responses(
        (status = 200, description = "Perfil atualizado", body = ChurchProfile),
        (status = 400, description = "Dados inválidos ou sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_church(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ChurchCode(code): ChurchCode,
    JsonBody(payload): JsonBody<UpdateChurchPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let input = profile_input(payload.name, payload.address, payload.time_offset, payload.admins)?;
    let profile = app_state
        .church_service
        .update_profile(&user.0, &code, input)
        .await?;

    Ok(Json(profile))
}

#[utoipa::path(
    get,
    path = "/v1/church",
    tag = "Church",
    responses(
        (status = 200, description = "Igrejas em que o usuário é admin", body = Vec<ChurchListing>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_my_churches(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let churches = app_state.church_service.list_for_admin(&user.0).await?;
    Ok(Json(churches))
}

#[utoipa::path(
    get,
    path = "/v1/church/detail/{code}",
    tag = "Church",
    params(("code" = String, Path, description = "Código da igreja")),
    responses(
        (status = 200, description = "Cadastro completo da igreja", body = ChurchDetail),
        (status = 400, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn church_detail(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ChurchCode(code): ChurchCode,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state.church_service.detail(&user.0, &code).await?;
    Ok(Json(detail))
}

#[utoipa::path(
    patch,
    path = "/v1/church/reactivate/{code}",
    tag = "Church",
    params(("code" = String, Path, description = "Código da igreja")),
    responses(
        (status = 200, description = "Igreja reativada"),
        (status = 400, description = "Igreja não está inativa ou sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn reactivate_church(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ChurchCode(code): ChurchCode,
) -> Result<StatusCode, AppError> {
    app_state.church_service.reactivate(&user.0, &code).await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    delete,
    path = "/v1/church/inactivate/{code}",
    tag = "Church",
    params(("code" = String, Path, description = "Código da igreja")),
    responses(
        (status = 200, description = "Igreja inativada"),
        (status = 400, description = "Igreja já inativa ou sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn inactivate_church(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ChurchCode(code): ChurchCode,
) -> Result<StatusCode, AppError> {
    app_state.church_service.inactivate(&user.0, &code).await?;
    Ok(StatusCode::OK)
}
