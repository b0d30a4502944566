use order_service::config::Settings;
use order_service::lifecycle::OrderSystem;
use order_service::model::Order;
use resilience::setup_tracing;
use std::error::Error;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    setup_tracing();

    let settings = Settings::load()?;
    info!(?settings, "Starting order service");

    let system = OrderSystem::new(&settings)?;
    let service = &system.order_service;

    let span = tracing::info_span!("seeding");
    async {
        for (customer_id, order_id, status) in [
            ("1234", "741", "NEW"),
            ("1234", "742", "SHIPPED"),
            ("5678", "901", "NEW"),
        ] {
            service
                .save_order(Order::new(customer_id, order_id, status))
                .await?;
        }
        info!("Seeded orders");
        Ok::<_, order_service::service::OrderError>(())
    }
    .instrument(span)
    .await?;

    let all = service.get_all_orders().await?;
    info!(count = all.len(), "All orders");

    let orders = service.get_orders_by_customer_id("1234").await;
    info!(?orders, "Orders of customer 1234");

    let span = tracing::info_span!("enrichment");
    match service.get_order("1234", "741").instrument(span).await {
        Ok(order) => info!(?order, "Enriched order"),
        Err(e) => error!(error = %e, "Order enrichment failed"),
    }

    service.delete_order("742").await?;
    service.delete_order("does-not-exist").await?;
    info!(remaining = service.get_all_orders().await?.len(), "Deleted orders");

    system.shutdown().await?;
    info!("Order service stopped");
    Ok(())
}
