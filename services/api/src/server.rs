use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryAnnotationStore, InMemoryEssayRepository, LoggingDeliveryPublisher,
};
use crate::routes::with_grading_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use essay_flow::config::AppConfig;
use essay_flow::error::AppError;
use essay_flow::telemetry;
use essay_flow::workflows::grading::EssayGradingService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryEssayRepository::default());
    let annotations = Arc::new(InMemoryAnnotationStore::default());
    let delivery = Arc::new(LoggingDeliveryPublisher::default());
    let grading_service = Arc::new(EssayGradingService::new(
        repository,
        annotations,
        delivery,
        config.scoring.clone(),
    ));

    let app = with_grading_routes(grading_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "essay grading service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
