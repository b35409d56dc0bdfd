//! delivery-api - construction-delivery platform service

use obra_bootstrap::run_server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run_server("config", |infra, metrics| async move {
        delivery_api::api::build_router(infra, metrics)
    })
    .await
}
