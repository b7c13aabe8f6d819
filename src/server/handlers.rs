//! Request handlers: parse the request, call one storage operation, return JSON.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{
    dispatch::{execute_command, COMMANDS},
    error::{ApiError, ApiResult},
    AppState,
};
use crate::{parse_note_id, Note, NoteStats};

const CONSOLE_HTML: &str = include_str!("console.html");

/// Body for creating or replacing a note
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteRequest {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

/// Filters accepted by `GET /api/notes`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    pub all: bool,
    pub favorites: bool,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Body of `POST /api/cli/execute`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

pub async fn console() -> Html<&'static str> {
    Html(CONSOLE_HTML)
}

pub async fn list_notes(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<Note>> {
    let storage = state.storage.lock().await;
    let notes = match (query.favorites, query.tag, query.all) {
        (true, _, _) => storage.get_favorite_notes(),
        (false, Some(tag), _) => storage.get_notes_by_tag(&tag),
        (false, None, true) => storage.get_all_notes(),
        (false, None, false) => storage.get_active_notes(),
    };
    Json(notes)
}

pub async fn create_note(
    State(state): State<AppState>,
    payload: Result<Json<NoteRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let note = state
        .storage
        .lock()
        .await
        .create_note(&request.title, &request.content, &request.tags)?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Note>> {
    let id = parse_note_id(&id)?;
    Ok(Json(state.storage.lock().await.get_note(id)?))
}

pub async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<NoteRequest>, JsonRejection>,
) -> ApiResult<Json<Note>> {
    let id = parse_note_id(&id)?;
    let Json(request) = payload?;
    let note = state.storage.lock().await.update_note(
        id,
        &request.title,
        &request.content,
        &request.tags,
    )?;
    Ok(Json(note))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_note_id(&id)?;
    state.storage.lock().await.delete_note(id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Note>> {
    let id = parse_note_id(&id)?;
    Ok(Json(state.storage.lock().await.toggle_favorite(id)?))
}

pub async fn archive_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Note>> {
    let id = parse_note_id(&id)?;
    Ok(Json(state.storage.lock().await.archive_note(id)?))
}

pub async fn search_notes(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Note>>> {
    let q = query
        .q
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Search query is required"))?;
    Ok(Json(state.storage.lock().await.search_notes(&q)))
}

pub async fn list_tags(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.storage.lock().await.get_all_tags())
}

pub async fn get_stats(State(state): State<AppState>) -> Json<NoteStats> {
    Json(state.storage.lock().await.get_stats())
}

pub async fn execute(
    State(state): State<AppState>,
    payload: Result<Json<ExecuteRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    debug!("Console command: {} {:?}", request.command, request.args);

    let result = execute_command(
        &mut *state.storage.lock().await,
        &request.command,
        &request.args,
    )?;

    Ok(Json(json!({
        "result": result,
        "command": request.command,
        "args": request.args,
    })))
}

pub async fn help() -> Json<Value> {
    let commands: serde_json::Map<String, Value> = COMMANDS
        .iter()
        .map(|c| (c.name.to_string(), Value::from(c.description)))
        .collect();
    let examples: Vec<&str> = COMMANDS.iter().map(|c| c.example).collect();

    Json(json!({
        "commands": commands,
        "examples": examples,
    }))
}
