//! HTTP API server for the read-model projection engine.
//!
//! Accepts delivered domain events, folds them into the order and user
//! read models, and serves those models, with structured logging
//! (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use projections::{
    InMemoryReadModelRepository, OrderReadModel, PostgresReadModelRepository, ProjectionConfig,
    ProjectionProcessor, ProjectionService, ReadModelRepository, UserReadModel,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Order projection over whichever repository the server was started with.
pub type OrderService = ProjectionService<OrderReadModel, dyn ReadModelRepository<OrderReadModel>>;

/// User projection over whichever repository the server was started with.
pub type UserService = ProjectionService<UserReadModel, dyn ReadModelRepository<UserReadModel>>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub orders: Arc<OrderService>,
    pub users: Arc<UserService>,
    pub processor: ProjectionProcessor,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/events", post(routes::events::ingest))
        .route("/orders", get(routes::orders::list))
        .route(
            "/orders/{id}",
            get(routes::orders::get).delete(routes::orders::purge),
        )
        .route("/users", get(routes::users::list))
        .route(
            "/users/{id}",
            get(routes::users::get).delete(routes::users::purge),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires both projections over the given repositories and registers them
/// with a processor.
pub fn create_state(
    order_repository: Arc<dyn ReadModelRepository<OrderReadModel>>,
    user_repository: Arc<dyn ReadModelRepository<UserReadModel>>,
    config: &ProjectionConfig,
) -> Arc<AppState> {
    let orders: Arc<OrderService> = Arc::new(ProjectionService::from_config(order_repository, config));
    let users: Arc<UserService> = Arc::new(ProjectionService::from_config(user_repository, config));

    let processor = ProjectionProcessor::new()
        .with_projection(orders.clone())
        .with_projection(users.clone());

    Arc::new(AppState {
        orders,
        users,
        processor,
    })
}

/// Creates state backed by in-memory repositories.
pub fn create_in_memory_state(config: &ProjectionConfig) -> Arc<AppState> {
    create_state(
        Arc::new(InMemoryReadModelRepository::<OrderReadModel>::from_config(config)),
        Arc::new(InMemoryReadModelRepository::<UserReadModel>::from_config(config)),
        config,
    )
}

/// Creates state backed by PostgreSQL, running migrations first.
pub async fn create_postgres_state(
    pool: PgPool,
    config: &ProjectionConfig,
) -> projections::Result<Arc<AppState>> {
    let orders = PostgresReadModelRepository::<OrderReadModel>::new(pool.clone());
    orders.run_migrations().await?;
    let users = PostgresReadModelRepository::<UserReadModel>::new(pool);

    Ok(create_state(Arc::new(orders), Arc::new(users), config))
}
