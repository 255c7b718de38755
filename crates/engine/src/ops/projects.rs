//! Project operations.

use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Project, ProjectStatus, ResultEngine, projects,
    util::{normalize_display_name, normalize_name_key},
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a new project with zero balances.
    ///
    /// Fails with [`EngineError::DuplicateName`] when another project already
    /// uses the same name (compared through normalization, so Arabic
    /// presentation variants collide as expected).
    pub async fn create_project(&self, name: &str, _user_id: &str) -> ResultEngine<Project> {
        let name = normalize_display_name(name, "project name")?;
        let name_norm = normalize_name_key(&name);

        with_tx!(self, |db_tx| {
            let existing = projects::Entity::find()
                .filter(projects::Column::NameNorm.eq(name_norm.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::DuplicateName(name));
            }

            let project = Project::new(name, Utc::now());
            projects::ActiveModel::from((&project, name_norm.as_str()))
                .insert(&db_tx)
                .await?;
            Ok(project)
        })
    }

    /// Return a single project by id.
    pub async fn project(&self, project_id: Uuid) -> ResultEngine<Project> {
        let model = projects::Entity::find_by_id(project_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("project".to_string()))?;
        Project::try_from(model)
    }

    /// Lists projects, newest first.
    pub async fn list_projects(&self, include_archived: bool) -> ResultEngine<Vec<Project>> {
        let mut query = projects::Entity::find().order_by_desc(projects::Column::CreatedAt);
        if !include_archived {
            query = query.filter(projects::Column::Status.eq(ProjectStatus::Active.as_str()));
        }

        let models = query.all(&self.database).await?;
        models.into_iter().map(Project::try_from).collect()
    }

    /// Archives a project (soft delete).
    ///
    /// Projects referenced by transactions are never hard-deleted; an
    /// archived project refuses new transactions but keeps its history and
    /// balances readable.
    pub async fn archive_project(&self, project_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_project(&db_tx, project_id).await?;
            if model.status == ProjectStatus::Archived.as_str() {
                return Err(EngineError::InvalidProject(
                    "project already archived".to_string(),
                ));
            }

            let active = projects::ActiveModel {
                id: ActiveValue::Set(model.id),
                status: ActiveValue::Set(ProjectStatus::Archived.as_str().to_string()),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    pub(super) async fn require_project(
        &self,
        db_tx: &DatabaseTransaction,
        project_id: Uuid,
    ) -> ResultEngine<projects::Model> {
        projects::Entity::find_by_id(project_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::NotFound("project".to_string()))
    }

    pub(super) async fn require_active_project(
        &self,
        db_tx: &DatabaseTransaction,
        project_id: Uuid,
    ) -> ResultEngine<projects::Model> {
        let model = self.require_project(db_tx, project_id).await?;
        if model.status != ProjectStatus::Active.as_str() {
            return Err(EngineError::InvalidProject(format!(
                "project '{}' is archived",
                model.name
            )));
        }
        Ok(model)
    }
}
