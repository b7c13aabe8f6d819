//! REST API and embedded web console.
//!
//! Routes (all JSON unless noted):
//! - `GET /` - HTML console (`window.quicknotes` in the browser dev tools)
//! - `GET|POST /api/notes`, `GET|PUT|DELETE /api/notes/:id`
//! - `POST /api/notes/:id/favorite`, `POST /api/notes/:id/archive`
//! - `GET /api/notes/search?q=`, `GET /api/tags`, `GET /api/stats`
//! - `POST /api/cli/execute`, `GET /api/cli/help`

mod dispatch;
mod error;
mod handlers;

use std::sync::Arc;

use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use log::info;
use tokio::{net::TcpListener, sync::Mutex};
use tower_http::cors::{Any, CorsLayer};

use crate::{NoteStorage, Result};

pub use dispatch::{execute_command, CommandHelp, COMMANDS};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use handlers::{ExecuteRequest, NoteRequest};

/// Shared handler state. The mutex serializes every store operation.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Mutex<NoteStorage>>,
}

/// Builds the full application router.
pub fn create_router(storage: Arc<Mutex<NoteStorage>>) -> Router {
    let state = AppState { storage };

    let api = Router::new()
        .route(
            "/notes",
            get(handlers::list_notes).post(handlers::create_note),
        )
        .route("/notes/search", get(handlers::search_notes))
        .route(
            "/notes/:id",
            get(handlers::get_note)
                .put(handlers::update_note)
                .delete(handlers::delete_note),
        )
        .route("/notes/:id/favorite", post(handlers::toggle_favorite))
        .route("/notes/:id/archive", post(handlers::archive_note))
        .route("/tags", get(handlers::list_tags))
        .route("/stats", get(handlers::get_stats))
        .route("/cli/execute", post(handlers::execute))
        .route("/cli/help", get(handlers::help));

    Router::new()
        .route("/", get(handlers::console))
        .nest("/api", api)
        .layer(build_cors_layer())
        .with_state(state)
}

fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}

/// Binds `address` and serves until the process is stopped.
pub async fn serve(storage: Arc<Mutex<NoteStorage>>, address: &str) -> Result<()> {
    let listener = TcpListener::bind(address).await?;
    info!("Web interface: http://{}", address);
    info!("API endpoints: http://{}/api", address);
    info!("Console: open the browser dev tools and use the 'quicknotes' object");

    axum::serve(listener, create_router(storage)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt; // for `oneshot`

    fn test_app() -> (TempDir, Router) {
        let dir = tempdir().unwrap();
        let storage = NoteStorage::open(dir.path().join("notes")).unwrap();
        let app = create_router(Arc::new(Mutex::new(storage)));
        (dir, app)
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn test_note_crud() {
        let (_dir, app) = test_app();

        let response = send(
            &app,
            json_request(
                Method::POST,
                "/api/notes",
                json!({ "title": "Go Slices", "content": "Slices are dynamic arrays", "tags": ["go"] }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["id"], 1);

        let response = send(&app, empty_request(Method::GET, "/api/notes/1")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["title"], "Go Slices");

        let response = send(
            &app,
            json_request(
                Method::PUT,
                "/api/notes/1",
                json!({ "title": "Go Maps", "content": "Maps are hash tables", "tags": ["go", "maps"] }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let updated = body_json(response).await;
        assert_eq!(updated["title"], "Go Maps");
        assert_eq!(updated["tags"], json!(["go", "maps"]));

        let response = send(&app, empty_request(Method::GET, "/api/notes")).await;
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

        let response = send(&app, empty_request(Method::DELETE, "/api/notes/1")).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&app, empty_request(Method::GET, "/api/notes/1")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_json(response).await["error"]
            .as_str()
            .unwrap()
            .contains("not found"));
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let (_dir, app) = test_app();

        let response = send(
            &app,
            json_request(Method::POST, "/api/notes", json!({ "title": "t", "content": "  " })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());

        let response = send(&app, empty_request(Method::GET, "/api/notes/abc")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());

        let response = send(
            &app,
            Request::builder()
                .method(Method::POST)
                .uri("/api/notes")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{ nope"))
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());

        let response = send(&app, empty_request(Method::GET, "/api/notes/search")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(&app, empty_request(Method::DELETE, "/api/notes/7")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_search_stats_and_flags() {
        let (_dir, app) = test_app();

        for (title, content) in [("Rust ownership", "borrowing"), ("Groceries", "milk")] {
            let response = send(
                &app,
                json_request(
                    Method::POST,
                    "/api/notes",
                    json!({ "title": title, "content": content }),
                ),
            )
            .await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = send(&app, empty_request(Method::GET, "/api/notes/search?q=rust")).await;
        let results = body_json(response).await;
        assert_eq!(results.as_array().unwrap().len(), 1);
        assert_eq!(results[0]["id"], 1);

        let response = send(&app, empty_request(Method::POST, "/api/notes/2/favorite")).await;
        assert_eq!(body_json(response).await["is_favorite"], true);

        let response = send(&app, empty_request(Method::POST, "/api/notes/1/archive")).await;
        assert_eq!(body_json(response).await["is_archived"], true);

        let response = send(&app, empty_request(Method::GET, "/api/stats")).await;
        assert_eq!(
            body_json(response).await,
            json!({ "total": 2, "active": 1, "archived": 1, "favorites": 1, "tags": 0 })
        );

        let response = send(&app, empty_request(Method::GET, "/api/notes?all=true")).await;
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_cli_execute_and_help() {
        let (_dir, app) = test_app();

        let response = send(
            &app,
            json_request(
                Method::POST,
                "/api/cli/execute",
                json!({ "command": "create", "args": ["My Note", "Note content", "tag1"] }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["command"], "create");
        assert_eq!(body["result"]["id"], 1);

        let response = send(
            &app,
            json_request(
                Method::POST,
                "/api/cli/execute",
                json!({ "command": "explode" }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(&app, empty_request(Method::GET, "/api/cli/help")).await;
        let help = body_json(response).await;
        assert!(help["commands"]["search"].is_string());
        assert_eq!(
            help["examples"].as_array().unwrap().len(),
            COMMANDS.len()
        );
    }

    #[tokio::test]
    async fn test_console_page() {
        let (_dir, app) = test_app();
        let response = send(&app, empty_request(Method::GET, "/")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("window.quicknotes"));
    }
}
