use axum::{
    routing::{get, post},
    Router,
};
use registration_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let public_routes = Router::new()
        .route("/health", get(routes::health::health))
        .route(
            "/register",
            get(routes::register::registration_form).post(routes::register::submit_registration),
        );

    let admin_routes = Router::new()
        .route(
            "/api/customers",
            get(routes::customer_routes::list_customers)
                .post(routes::customer_routes::create_customer),
        )
        .route(
            "/api/customers/export",
            get(routes::export::export_customers),
        )
        .route(
            "/api/customers/approve",
            post(routes::customer_routes::approve_customer),
        )
        .route(
            "/api/customers/reject",
            post(routes::customer_routes::reject_customer),
        )
        .route(
            "/api/customers/:id",
            get(routes::customer_routes::get_customer)
                .put(routes::customer_routes::update_customer)
                .delete(routes::customer_routes::delete_customer),
        )
        .route(
            "/app/customers",
            get(routes::customer_routes::review_customers),
        )
        .route(
            "/api/dashboard/stats",
            get(routes::dashboard::get_dashboard_stats),
        )
        .layer(axum::middleware::from_fn(
            registration_backend::middleware::auth::require_merchant_session,
        ));

    let app = public_routes
        .merge(admin_routes)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
