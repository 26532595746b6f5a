mod handlers;

use std::net::SocketAddr;

use async_trait::async_trait;
use axum::{
  Router,
  routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

use crate::{prelude::*, state::AppState};

pub struct Plugin;

#[async_trait]
impl super::Plugin for Plugin {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], app.config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("HTTP Server listening on {addr}");

    let router = router(app);
    tokio::spawn(async move {
      if let Err(err) = axum::serve(listener, router).await {
        error!("HTTP server stopped: {err}");
      }
    });

    Ok(())
  }
}

pub fn router(app: Arc<AppState>) -> Router {
  Router::new()
    .route("/health", get(handlers::health))
    .route("/api/auth/register", post(handlers::register))
    .route("/api/auth/login", post(handlers::login))
    .route("/api/auth/logout", post(handlers::logout))
    .route("/api/auth/me", get(handlers::me).patch(handlers::update_profile))
    .route("/api/business", get(handlers::business))
    .route(
      "/api/bookings",
      get(handlers::my_bookings).post(handlers::submit_booking),
    )
    .route("/api/bookings/{id}/pay", post(handlers::pay_booking))
    .route("/api/bookings/{id}/cancel", post(handlers::cancel_booking))
    .route("/api/referrals", get(handlers::my_referrals))
    .route("/api/qr", post(handlers::generate_qr))
    .route("/ref/{id}", get(handlers::scan_referral))
    .route("/api/admin/overview", get(handlers::admin_overview))
    .route("/api/admin/customers", get(handlers::admin_customers))
    .route("/api/admin/bookings", get(handlers::admin_bookings))
    .route("/api/admin/referrals", get(handlers::admin_referrals))
    .route("/api/admin/free-hours", post(handlers::admin_free_hours))
    .route("/api/tasks", get(handlers::list_tasks).post(handlers::add_task))
    .route(
      "/api/tasks/{id}",
      put(handlers::edit_task).delete(handlers::delete_task),
    )
    .route("/api/tasks/{id}/toggle", post(handlers::toggle_task))
    .layer(
      ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
        CorsLayer::new()
          .allow_origin(Any)
          .allow_methods(Any)
          .allow_headers(Any),
      ),
    )
    .with_state(app)
}
