//! Projects API endpoints.

use api_types::project::{ProjectCreate, ProjectList, ProjectView, ProjectsResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

pub(crate) fn map_status(status: engine::ProjectStatus) -> api_types::project::ProjectStatus {
    match status {
        engine::ProjectStatus::Active => api_types::project::ProjectStatus::Active,
        engine::ProjectStatus::Archived => api_types::project::ProjectStatus::Archived,
    }
}

pub(crate) fn map_project(project: engine::Project) -> ProjectView {
    ProjectView {
        id: project.id,
        name: project.name.clone(),
        balance_minor: project.balance,
        total_income_minor: project.total_income,
        total_expenses_minor: project.total_expenses,
        net_profit_minor: project.net_profit(),
        status: map_status(project.status),
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ProjectCreate>,
) -> Result<(StatusCode, Json<ProjectView>), ServerError> {
    let project = state
        .engine
        .create_project(&payload.name, &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(map_project(project))))
}

pub async fn list(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ProjectList>,
) -> Result<Json<ProjectsResponse>, ServerError> {
    let include_archived = payload.include_archived.unwrap_or(false);
    let projects = state
        .engine
        .list_projects(include_archived)
        .await?
        .into_iter()
        .map(map_project)
        .collect();

    Ok(Json(ProjectsResponse { projects }))
}

pub async fn archive(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    user::require_admin(&user)?;
    state.engine.archive_project(id).await?;
    Ok(StatusCode::OK)
}
