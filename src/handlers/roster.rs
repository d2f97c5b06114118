// src/handlers/roster.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::{error::AppError, extract::JsonBody},
    config::AppState,
    middleware::{auth::AuthenticatedUser, church_code::ChurchCode},
    models::church::{LocationList, RosterStatus, ServantList},
};

// ---
// 1. Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServantPayload {
    #[validate(email(message = "E-mail inválido."))]
    #[schema(example = "maria@example.com")]
    pub email: String,

    #[validate(length(min = 1, message = "O nome do servo é obrigatório."))]
    #[schema(example = "Maria Silva")]
    pub name: String,

    #[schema(example = "Pianista")]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServantEmailPayload {
    #[validate(length(min = 1, message = "O e-mail do servo é obrigatório."))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationPayload {
    #[validate(length(min = 1, max = 64, message = "O código do local é obrigatório."))]
    #[schema(example = "ruang_utama")]
    pub code: String,

    // Clientes antigos mandam o nome no campo "location"
    #[serde(alias = "location")]
    #[validate(length(min = 1, message = "O nome do local é obrigatório."))]
    #[schema(example = "Ruang utama gereja lantai 1")]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationCodePayload {
    #[validate(length(min = 1, message = "O código do local é obrigatório."))]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminPayload {
    #[serde(alias = "adminemail")]
    #[validate(email(message = "E-mail inválido."))]
    #[schema(example = "tata@example.com")]
    pub admin_email: String,
}

// ---
// 2. Servos
// ---
#[utoipa::path(
    post,
    path = "/v1/church/servants/{code}",
    tag = "Servants",
    request_body = ServantPayload,
    params(("code" = String, Path, description = "Código da igreja")),
    responses(
        (status = 200, description = "Servo cadastrado"),
        (status = 400, description = "Dados inválidos, servo repetido ou sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_servant(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ChurchCode(code): ChurchCode,
    JsonBody(payload): JsonBody<ServantPayload>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;

    app_state
        .roster_service
        .add_servant(&user.0, &code, &payload.email, &payload.name, payload.role)
        .await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    patch,
    path = "/v1/church/servants/{code}",
    tag = "Servants",
    request_body = ServantPayload,
    params(("code" = String, Path, description = "Código da igreja")),
    responses(
        (status = 200, description = "Nome e função atualizados"),
        (status = 400, description = "Servo inexistente/inativo ou sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_servant(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ChurchCode(code): ChurchCode,
    JsonBody(payload): JsonBody<ServantPayload>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;

    app_state
        .roster_service
        .update_servant(&user.0, &code, &payload.email, &payload.name, payload.role)
        .await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    delete,
    path = "/v1/church/servants/{code}",
    tag = "Servants",
    request_body = ServantEmailPayload,
    params(("code" = String, Path, description = "Código da igreja")),
    responses(
        (status = 200, description = "Servo inativado"),
        (status = 400, description = "Servo inexistente/já inativo ou sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn inactivate_servant(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ChurchCode(code): ChurchCode,
    JsonBody(payload): JsonBody<ServantEmailPayload>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;

    app_state
        .roster_service
        .set_servant_status(&user.0, &code, &payload.email, RosterStatus::Inactive)
        .await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    patch,
    path = "/v1/church/servants/reactivate/{code}",
    tag = "Servants",
    request_body = ServantEmailPayload,
    params(("code" = String, Path, description = "Código da igreja")),
    responses(
        (status = 200, description = "Servo reativado"),
        (status = 400, description = "Servo inexistente/já ativo ou sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn reactivate_servant(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ChurchCode(code): ChurchCode,
    JsonBody(payload): JsonBody<ServantEmailPayload>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;

    app_state
        .roster_service
        .set_servant_status(&user.0, &code, &payload.email, RosterStatus::Active)
        .await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/v1/church/servants/{code}",
    tag = "Servants",
    params(("code" = String, Path, description = "Código da igreja")),
    responses(
        (status = 200, description = "Servos ativos", body = ServantList),
        (status = 400, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_servants(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ChurchCode(code): ChurchCode,
) -> Result<impl IntoResponse, AppError> {
    let servants = app_state.roster_service.list_servants(&user.0, &code).await?;
    Ok(Json(servants))
}

// ---
// 3. Locais
// ---
#[utoipa::path(
    post,
    path = "/v1/church/locations/{code}",
    tag = "Locations",
    request_body = LocationPayload,
    params(("code" = String, Path, description = "Código da igreja")),
    responses(
        (status = 200, description = "Local cadastrado"),
        (status = 400, description = "Dados inválidos, local repetido ou sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_location(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ChurchCode(code): ChurchCode,
    JsonBody(payload): JsonBody<LocationPayload>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;

    app_state
        .roster_service
        .add_location(&user.0, &code, &payload.code, &payload.name)
        .await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    patch,
    path = "/v1/church/locations/{code}",
    tag = "Locations",
    request_body = LocationPayload,
    params(("code" = String, Path, description = "Código da igreja")),
    responses(
        (status = 200, description = "Local renomeado"),
        (status = 400, description = "Local inexistente/inativo ou sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn rename_location(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ChurchCode(code): ChurchCode,
    JsonBody(payload): JsonBody<LocationPayload>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;

    app_state
        .roster_service
        .rename_location(&user.0, &code, &payload.code, &payload.name)
        .await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    delete,
    path = "/v1/church/locations/{code}",
    tag = "Locations",
    request_body = LocationCodePayload,
    params(("code" = String, Path, description = "Código da igreja")),
    responses(
        (status = 200, description = "Local inativado"),
        (status = 400, description = "Local inexistente/já inativo ou sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn inactivate_location(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ChurchCode(code): ChurchCode,
    JsonBody(payload): JsonBody<LocationCodePayload>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;

    app_state
        .roster_service
        .set_location_status(&user.0, &code, &payload.code, RosterStatus::Inactive)
        .await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    patch,
    path = "/v1/church/locations/reactivate/{code}",
    tag = "Locations",
    request_body = LocationCodePayload,
    params(("code" = String, Path, description = "Código da igreja")),
    responses(
        (status = 200, description = "Local reativado"),
        (status = 400, description = "Local inexistente/já ativo ou sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn reactivate_location(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ChurchCode(code): ChurchCode,
    JsonBody(payload): JsonBody<LocationCodePayload>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;

    app_state
        .roster_service
        .set_location_status(&user.0, &code, &payload.code, RosterStatus::Active)
        .await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/v1/church/locations/{code}",
    tag = "Locations",
    params(("code" = String, Path, description = "Código da igreja")),
    responses(
        (status = 200, description = "Locais ativos", body = LocationList),
        (status = 400, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_locations(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ChurchCode(code): ChurchCode,
) -> Result<impl IntoResponse, AppError> {
    let locations = app_state.roster_service.list_locations(&user.0, &code).await?;
    Ok(Json(locations))
}

// ---
// 4. Admins
// ---
#[utoipa::path(
    post,
    path = "/v1/church/admins/{code}",
    tag = "Admins",
    request_body = AdminPayload,
    params(("code" = String, Path, description = "Código da igreja")),
    responses(
        (status = 200, description = "Admin adicionado"),
        (status = 400, description = "Já é admin ou sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_admin(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ChurchCode(code): ChurchCode,
    JsonBody(payload): JsonBody<AdminPayload>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;

    app_state
        .roster_service
        .add_admin(&user.0, &code, &payload.admin_email)
        .await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    delete,
    path = "/v1/church/admins/{code}",
    tag = "Admins",
    request_body = AdminPayload,
    params(("code" = String, Path, description = "Código da igreja")),
    responses(
        (status = 200, description = "Admin removido"),
        (status = 400, description = "Não é admin, último admin ou sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_admin(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ChurchCode(code): ChurchCode,
    JsonBody(payload): JsonBody<AdminPayload>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;

    app_state
        .roster_service
        .remove_admin(&user.0, &code, &payload.admin_email)
        .await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/v1/church/admins/{code}",
    tag = "Admins",
    params(("code" = String, Path, description = "Código da igreja")),
    responses(
        (status = 200, description = "E-mails dos admins", body = Vec<String>),
        (status = 400, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_admins(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ChurchCode(code): ChurchCode,
) -> Result<impl IntoResponse, AppError> {
    let admins = app_state.roster_service.list_admins(&user.0, &code).await?;
    Ok(Json(admins))
}
