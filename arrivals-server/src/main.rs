use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use arrivals_server::cache::{CacheConfig, CachedUsageSource};
use arrivals_server::config::AppConfig;
use arrivals_server::consolidated::{ConsolidatedService, FileTimetableSource};
use arrivals_server::fares::ZoneFareTable;
use arrivals_server::otp::{FixtureScheduleSource, OtpClient, OtpConfig, ScheduleSource};
use arrivals_server::pipeline::{PipelineSources, standard_pipeline};
use arrivals_server::realtime::{
    EstimatesSource, ShuttleClient, ShuttleSource, TranviasClient, TussaClient, VitrasaClient,
    build_client,
};
use arrivals_server::ridership::{RidershipWhitelist, UsageClient, UsageSource};
use arrivals_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,arrivals_server=debug")),
        )
        .init();

    let config = AppConfig::from_env()?;

    // Schedule source: fixtures for offline work, otherwise the trip planner
    let schedule: Arc<dyn ScheduleSource> = match &config.otp_fixtures_dir {
        Some(dir) => Arc::new(FixtureScheduleSource::new(dir)?),
        None => Arc::new(OtpClient::new(
            OtpConfig::new(&config.otp_base_url).with_timeout(config.request_timeout_secs),
        )?),
    };

    let http = build_client(config.request_timeout_secs)?;
    let vitrasa: Arc<dyn EstimatesSource> =
        Arc::new(VitrasaClient::new(http.clone(), &config.vitrasa_base_url));
    let shuttle = config.shuttle_status_url.as_ref().map(|url| {
        Arc::new(ShuttleClient::new(http.clone(), url)) as Arc<dyn ShuttleSource>
    });

    let fares = ZoneFareTable::load(&config.fare_table_path).unwrap_or_else(|e| {
        warn!(error = %e, "fare table unavailable, xunta fares will not be priced");
        ZoneFareTable::empty()
    });

    let whitelist = RidershipWhitelist::load(&config.whitelist_path).unwrap_or_else(|e| {
        warn!(error = %e, "ridership whitelist unavailable, usage data disabled");
        RidershipWhitelist::empty()
    });
    let usage: Arc<dyn UsageSource> = Arc::new(CachedUsageSource::new(
        UsageClient::new(http.clone(), &config.vitrasa_base_url),
        &CacheConfig::default(),
    ));

    let pipeline = standard_pipeline(
        PipelineSources {
            vitrasa: vitrasa.clone(),
            tranvias: Arc::new(TranviasClient::new(http.clone(), &config.tranvias_base_url)),
            tussa: Arc::new(TussaClient::new(http.clone(), &config.tussa_base_url)),
            shuttle,
            whitelist: Arc::new(whitelist),
            usage: Some(usage),
        },
        config.stage_timeout,
    );
    info!(stages = ?pipeline.stage_names(), "arrivals pipeline ready");

    let consolidated = ConsolidatedService::new(
        Arc::new(FileTimetableSource::new(&config.timetable_dir)),
        vitrasa,
    );

    let state = AppState::new(schedule, pipeline, consolidated, fares);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "arrivals server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
