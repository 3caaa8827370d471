#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use naf_planner::{PlannerConfig, TimelinePlan, http_api, logging};

    let config = PlannerConfig::load()?;
    logging::init(&config.logging);

    let addr: SocketAddr = std::env::var("NAF_PLANNER_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    println!("naf-planner HTTP API listening on http://{addr}");
    let mut plan = TimelinePlan::default();
    plan.metadata.holiday_region = config.default_region;
    http_api::serve(addr, plan, config).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
