use kameo::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use boba_order_bot::actors::{GetSinkStats, HealthMonitorActor, OrderSinkActor};
use boba_order_bot::config::AppConfig;
use boba_order_bot::domain::order::{Customer, CustomerId, OrderCommandHandler};
use boba_order_bot::metrics::{start_health_server, HealthServerState, Metrics};
use boba_order_bot::persistence::{InMemoryOrderStore, OrderStore, PgOrderStore};
use boba_order_bot::registry::{spawn_reaper, SessionRegistry, StoreStatus};
use boba_order_bot::service::OrderService;
use boba_order_bot::transport::ConsoleDispatcher;
use boba_order_bot::utils::RetryPolicy;

const HEALTH_PROBE_INTERVAL: Duration = Duration::from_secs(30);

/// One console line: `<customer_id>[ <display name>]: <payload>`.
/// The first `:` ends the sender, so names and payloads may contain spaces.
fn parse_line(line: &str) -> Option<(Customer, &str)> {
    let (who, payload) = line.trim().split_once(':')?;
    let payload = payload.trim();
    if payload.is_empty() {
        return None;
    }

    let who = who.trim();
    let (id, name) = match who.split_once(char::is_whitespace) {
        Some((id, name)) if !name.trim().is_empty() => (id, name.trim().to_string()),
        _ => (who, format!("customer {}", who)),
    };
    let id = id.parse::<i64>().ok()?;
    Some((Customer::new(CustomerId(id), name), payload))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides the default filter
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,boba_order_bot=debug")))
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        operator_id = %config.operator_id,
        max_items = config.max_items,
        store_open = config.store_open_on_start,
        "Starting order bot"
    );

    // === 1. Menu and order store ===
    let catalog = Arc::new(config.load_catalog()?);
    tracing::info!(categories = ?catalog.categories(), "Menu loaded");

    let store: Arc<dyn OrderStore> = match config.database_url {
        Some(ref url) => Arc::new(PgOrderStore::connect(url).await?),
        None => {
            tracing::warn!("DATABASE_URL not set; orders are kept in memory only");
            Arc::new(InMemoryOrderStore::new())
        }
    };
    tracing::info!(store = store.name(), "Order store ready");

    // === 2. Metrics and actors ===
    let metrics = Arc::new(Metrics::new()?);
    let health_monitor = HealthMonitorActor::spawn(HealthMonitorActor::new(store.clone(), HEALTH_PROBE_INTERVAL));
    let sink = OrderSinkActor::spawn(
        OrderSinkActor::new(store.clone(), RetryPolicy::default())
            .with_metrics(metrics.clone())
            .with_health_monitor(health_monitor.clone()),
    );

    let server_state = HealthServerState {
        registry: metrics.registry().clone(),
        health: Some(health_monitor.clone()),
    };
    let port = config.health_port;
    std::thread::spawn(move || {
        let result = actix_web::rt::System::new().block_on(start_health_server(server_state, port));
        if let Err(e) = result {
            tracing::error!(error = %e, port = port, "Health server stopped");
        }
    });

    // === 3. Sessions and service ===
    let registry = Arc::new(SessionRegistry::new());
    let reaper = config.session_idle_ttl.map(|ttl| {
        let every = (ttl / 4).max(Duration::from_secs(1));
        spawn_reaper(registry.clone(), ttl, every, Some(metrics.clone()))
    });

    let handler = OrderCommandHandler::new(
        catalog,
        registry,
        Arc::new(StoreStatus::new(config.store_open_on_start)),
        config.max_items,
        Some(config.payment_link.clone()),
    );
    let service = OrderService::new(handler, store, config.operator_id)
        .with_sink(sink.clone())
        .with_metrics(metrics);
    let dispatcher = ConsoleDispatcher::new(config.operator_id);

    // === 4. Console transport ===
    tracing::info!("Reading events from stdin as '<customer_id>[ <name>]: <payload>'");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_line(&line) {
                    Some((customer, payload)) => service.process(&dispatcher, &customer, payload).await,
                    None => tracing::warn!(line = %line, "Ignoring malformed input line"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupt received");
                break;
            }
        }
    }

    tracing::info!("Shutting down");
    if let Some(reaper) = reaper {
        reaper.abort();
    }
    // Replies only after every queued save has been handled
    match sink.ask(GetSinkStats).await {
        Ok(stats) => tracing::info!(saved = stats.saved, failed = stats.failed, "Order sink drained"),
        Err(_) => tracing::warn!("Order sink stopped before draining"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_with_spaced_name_and_payload() {
        let (customer, payload) = parse_line("5 Alice Smith: item_Iced Latte").unwrap();
        assert_eq!(customer, Customer::new(CustomerId(5), "Alice Smith"));
        assert_eq!(payload, "item_Iced Latte");
    }

    #[test]
    fn test_parse_line_without_name() {
        let (customer, payload) = parse_line("  42: order_now ").unwrap();
        assert_eq!(customer.id, CustomerId(42));
        assert_eq!(customer.display_name, "customer 42");
        assert_eq!(payload, "order_now");
    }

    #[test]
    fn test_parse_line_rejects_malformed() {
        assert!(parse_line("5 order_now").is_none());
        assert!(parse_line("bob: order_now").is_none());
        assert!(parse_line("5 Alice:   ").is_none());
    }
}
