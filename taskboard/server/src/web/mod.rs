use axum::Router;
use axum::http::StatusCode;
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::task::TaskState;

pub mod api;

/// Builds the full application router around an established store connection.
pub fn create_app(db: DatabaseConnection) -> Router {
    let task_state = Arc::new(TaskState { db: Arc::new(db) });

    Router::new()
        .route("/health", axum::routing::get(health_check_handler))
        .merge(api::create_api_router(task_state))
        .fallback(fallback_handler)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Connects to the store, applies migrations and serves the API.
///
/// Fails before binding the listener if the database cannot be reached.
#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let db = Database::connect(&config.db_url).await.inspect_err(|err| {
        tracing::error!("Failed to connect to the database: {}", err);
    })?;
    tracing::info!("Database connected");
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    axum::serve(listener, create_app(db)).await?;
    Ok(())
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}

async fn fallback_handler() -> api::v1::ApiError {
    api::v1::ApiError::new(StatusCode::NOT_FOUND, api::v1::NOT_FOUND, "No such route")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use tower::ServiceExt;

    fn app_without_store() -> Router {
        create_app(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    #[tokio::test]
    async fn can_check_health_endpoint() {
        let response = app_without_store()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn can_serve_openapi_document() {
        let response = app_without_store()
            .oneshot(
                Request::builder()
                    .uri("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let document: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(document["paths"].get("/tasks").is_some());
        assert!(document["paths"].get("/tasks/{id}").is_some());
    }

    #[tokio::test]
    async fn can_answer_unknown_routes_with_json_not_found() {
        let response = app_without_store()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn fails_to_start_when_database_is_unreachable() {
        let config = Config {
            db_url: "sqlite:///nonexistent-dir/tasks.db?mode=ro".to_string(),
            port: 0,
        };

        assert!(start_web_server(config).await.is_err());
    }
}
