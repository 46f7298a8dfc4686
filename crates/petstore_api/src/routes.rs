//! `/pets` route table and handlers.
//!
//! Route table:
//! - GET    /ping      → liveness probe with crate version
//! - GET    /pets      → list
//! - GET    /pets/:id  → get
//! - POST   /pets      → add (form: petId, name, type, ownerId)
//! - PUT    /pets/:id  → modify (form: name, type, ownerId)
//! - DELETE /pets/:id  → delete, echoes the id

use crate::error::ApiError;
use axum::extract::rejection::FormRejection;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Form, Json, Router};
use petstore_core::{core_version, ping, CoreLogger, OwnerId, Pet, PetRepository, PetResult};
use serde::Deserialize;
use std::sync::Arc;

/// Shared handler state: the repository plus the injected logger.
pub struct ApiState<R> {
    repo: Arc<R>,
    logger: CoreLogger,
}

impl<R> Clone for ApiState<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            logger: self.logger.clone(),
        }
    }
}

impl<R> ApiState<R>
where
    R: PetRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, logger: CoreLogger) -> Self {
        Self {
            repo,
            logger: logger.with_target("petstore_api"),
        }
    }

    /// Runs a blocking repository call off the async workers and maps its failure.
    async fn run<T, F>(&self, operation: &'static str, call: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&R) -> PetResult<T> + Send + 'static,
    {
        let repo = Arc::clone(&self.repo);
        let result = match tokio::task::spawn_blocking(move || call(repo.as_ref())).await {
            Ok(result) => result.map_err(ApiError::from),
            Err(err) => {
                self.logger.error(format_args!(
                    "event=http_{operation} module=api status=task_failed error={err}"
                ));
                Err(ApiError::Internal(format!("{operation} task failed: {err}")))
            }
        };

        result.map_err(|err| self.report(operation, err))
    }

    /// Records the request outcome. Store failure details are logged by the
    /// repository, so the 500 line carries only the outcome.
    fn report(&self, operation: &'static str, err: ApiError) -> ApiError {
        match &err {
            ApiError::InvalidInput(message) => self.logger.debug(format_args!(
                "event=http_{operation} module=api status=rejected http_status=400 error={message}"
            )),
            ApiError::Internal(_) => self.logger.error(format_args!(
                "event=http_{operation} module=api status=error http_status=500"
            )),
        }
        err
    }
}

/// Form body accepted by `POST /pets` and `PUT /pets/:id`.
///
/// Every field is optional at extraction time so that a missing field becomes
/// a 400 with a readable message instead of an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetForm {
    pub pet_id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub owner_id: Option<String>,
}

impl PetForm {
    fn add_fields(&self) -> Result<(String, String, String, OwnerId), ApiError> {
        Ok((
            required(self.pet_id.as_deref(), "petId")?.to_string(),
            required(self.name.as_deref(), "name")?.to_string(),
            required(self.kind.as_deref(), "type")?.to_string(),
            self.owner_id()?,
        ))
    }

    /// Builds the pet for an update; the path id wins over any `petId` field.
    fn to_pet(&self, pet_id: String) -> Result<Pet, ApiError> {
        let name = required(self.name.as_deref(), "name")?;
        let kind = required(self.kind.as_deref(), "type")?;
        Ok(Pet::new(pet_id, name, kind, self.owner_id()?)?)
    }

    fn owner_id(&self) -> Result<OwnerId, ApiError> {
        let raw = required(self.owner_id.as_deref(), "ownerId")?;
        raw.trim()
            .parse::<OwnerId>()
            .map_err(|_| ApiError::InvalidInput(format!("ownerId must be an integer, got `{raw}`")))
    }
}

/// Builds the router serving `/pets` and `/ping`.
pub fn build_router<R>(repo: Arc<R>, logger: CoreLogger) -> Router
where
    R: PetRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/ping", get(handle_ping))
        .route("/pets", get(list_pets::<R>).post(add_pet::<R>))
        .route(
            "/pets/:id",
            get(get_pet::<R>).put(modify_pet::<R>).delete(delete_pet::<R>),
        )
        .with_state(ApiState::new(repo, logger))
}

async fn handle_ping() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": ping(),
        "version": core_version(),
    }))
}

/// Returns one pet.
///
/// # HTTP contract
/// - 200 with `{petId,name,type,ownerId}`.
/// - 400 when the id is unknown; 500 on storage failure.
async fn get_pet<R>(
    State(state): State<ApiState<R>>,
    Path(id): Path<String>,
) -> Result<Json<Pet>, ApiError>
where
    R: PetRepository + Send + Sync + 'static,
{
    let pet = state.run("get", move |repo| repo.get(&id)).await?;
    Ok(Json(pet))
}

/// Returns every pet; 500 on storage failure.
async fn list_pets<R>(State(state): State<ApiState<R>>) -> Result<Json<Vec<Pet>>, ApiError>
where
    R: PetRepository + Send + Sync + 'static,
{
    let pets = state.run("list", |repo| repo.list()).await?;
    Ok(Json(pets))
}

/// Creates a pet from form fields.
///
/// # HTTP contract
/// - 200 with the created pet.
/// - 400 for a missing/empty field, non-integer `ownerId`, or unknown owner.
/// - 500 on storage failure, including a duplicate `petId`.
async fn add_pet<R>(
    State(state): State<ApiState<R>>,
    form: Result<Form<PetForm>, FormRejection>,
) -> Result<Json<Pet>, ApiError>
where
    R: PetRepository + Send + Sync + 'static,
{
    let Form(form) = form.map_err(|err| state.report("add", rejection(err)))?;
    let (pet_id, name, kind, owner_id) = form
        .add_fields()
        .map_err(|err| state.report("add", err))?;

    let pet = state
        .run("add", move |repo| repo.add(&pet_id, &name, &kind, owner_id))
        .await?;
    Ok(Json(pet))
}

/// Replaces name, type and owner of the pet at `id`.
///
/// # HTTP contract
/// - 200 with the updated pet as sent.
/// - 400 when a field is missing/empty, the owner or pet is unknown.
/// - 500 on storage failure.
async fn modify_pet<R>(
    State(state): State<ApiState<R>>,
    Path(id): Path<String>,
    form: Result<Form<PetForm>, FormRejection>,
) -> Result<Json<Pet>, ApiError>
where
    R: PetRepository + Send + Sync + 'static,
{
    let Form(form) = form.map_err(|err| state.report("modify", rejection(err)))?;
    let pet = form
        .to_pet(id)
        .map_err(|err| state.report("modify", err))?;

    let pet = state
        .run("modify", move |repo| repo.modify(&pet).map(|()| pet))
        .await?;
    Ok(Json(pet))
}

/// Deletes the pet at `id` and echoes the id as a JSON string.
async fn delete_pet<R>(
    State(state): State<ApiState<R>>,
    Path(id): Path<String>,
) -> Result<Json<String>, ApiError>
where
    R: PetRepository + Send + Sync + 'static,
{
    let id = state
        .run("delete", move |repo| repo.delete(&id).map(|()| id))
        .await?;
    Ok(Json(id))
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, ApiError> {
    value.ok_or_else(|| ApiError::InvalidInput(format!("missing form field `{field}`")))
}

fn rejection(err: FormRejection) -> ApiError {
    ApiError::InvalidInput(err.body_text())
}
