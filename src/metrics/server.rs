use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use kameo::actor::ActorRef;
use prometheus::{Encoder, Registry, TextEncoder};

use crate::actors::{GetSystemHealth, HealthMonitorActor, HealthStatus};

/// Shared by every worker of the health server
#[derive(Clone)]
pub struct HealthServerState {
    pub registry: Registry,
    pub health: Option<ActorRef<HealthMonitorActor>>,
}

/// Serve `/health` and `/metrics`.
/// Runs on its own actix system; call it from a dedicated thread.
pub async fn start_health_server(state: HealthServerState, port: u16) -> std::io::Result<()> {
    tracing::info!(port = port, "Starting health server on http://0.0.0.0:{}/health", port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .route("/health", web::get().to(health_handler))
            .route("/metrics", web::get().to(metrics_handler))
            .default_service(web::to(|| async { HttpResponse::NotFound().body("Not Found") }))
    })
    .workers(1)
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

async fn metrics_handler(state: web::Data<HealthServerState>) -> impl Responder {
    let encoder = TextEncoder::new();
    let metric_families = state.registry.gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return HttpResponse::InternalServerError().body("metrics encoding failed");
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}

async fn health_handler(state: web::Data<HealthServerState>) -> impl Responder {
    let Some(ref monitor) = state.health else {
        return HttpResponse::Ok().content_type("text/plain").body("OK");
    };

    match monitor.ask(GetSystemHealth).await {
        Ok(health) => health_response(&health.overall_status),
        Err(_) => HttpResponse::ServiceUnavailable()
            .content_type("text/plain")
            .body("health monitor unavailable"),
    }
}

fn health_response(status: &HealthStatus) -> HttpResponse {
    match status {
        HealthStatus::Healthy => HttpResponse::Ok().content_type("text/plain").body("OK"),
        HealthStatus::Degraded(reason) => HttpResponse::ServiceUnavailable()
            .content_type("text/plain")
            .body(format!("DEGRADED: {}", reason)),
        HealthStatus::Unhealthy(reason) => HttpResponse::ServiceUnavailable()
            .content_type("text/plain")
            .body(format!("UNHEALTHY: {}", reason)),
    }
}
