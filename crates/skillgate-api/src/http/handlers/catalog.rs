//! Read-only catalog endpoints. All require an authenticated principal.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthPrincipal;
use crate::http::extractors::trace::RequestTrace;
use crate::http::response;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SkillsQuery {
    pub category: Option<String>,
}

/// GET /api/skills?category=...
pub async fn list_skills(
    State(state): State<AppState>,
    _principal: AuthPrincipal,
    Query(query): Query<SkillsQuery>,
) -> Json<Value> {
    let skills = state.catalog.list_skills(query.category.as_deref());
    let total = skills.len();
    response::ok(json!({ "skills": skills, "total": total }))
}

/// GET /api/skills/{id}
pub async fn get_skill(
    State(state): State<AppState>,
    _principal: AuthPrincipal,
    RequestTrace(trace): RequestTrace,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let skill = state
        .catalog
        .get_skill(&id)
        .map_err(|err| AppError::traced(err, trace.trace_id()))?;
    Ok(response::ok(json!({ "skill": skill })))
}

/// GET /api/categories
pub async fn list_categories(
    State(state): State<AppState>,
    _principal: AuthPrincipal,
) -> Json<Value> {
    response::ok(json!({ "categories": state.catalog.list_categories() }))
}
