use std::sync::Arc;

use poem::middleware::Cors;
use poem::{endpoint::StaticFilesEndpoint, Endpoint, EndpointExt, Route};
use poem_openapi::OpenApiService;

use crate::api::{AuthApi, ConsumersApi, HealthApi, MlApi, OrdersApi};
use crate::business::{AuthService, ConsumerService, OrderService};
use crate::config::Config;
use crate::ml::{ForecastRunner, OutputFiles};
use crate::observability::{BodyLimitMiddleware, ErrorRenderingMiddleware, RequestTracingMiddleware};
use crate::security::TokenService;
use crate::store::InMemoryStore;

/// Everything the HTTP layer needs, wired once at startup.
pub struct AppState {
    pub config: Config,
    pub tokens: Arc<TokenService>,
    pub auth: Arc<AuthService>,
    pub consumers: Arc<ConsumerService>,
    pub orders: Arc<OrderService>,
    pub runner: Arc<ForecastRunner>,
    pub outputs: OutputFiles,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let tokens = Arc::new(TokenService::new());

        let auth = Arc::new(AuthService::new(
            store.clone(),
            store.clone(),
            tokens.clone(),
            config.token_ttl,
            config.refresh_token_ttl,
        ));
        let consumers = Arc::new(ConsumerService::new(
            store.clone(),
            store.clone(),
            config.page_size,
        ));
        let orders = Arc::new(OrderService::new(
            store.clone(),
            store.clone(),
            store,
            config.page_size,
        ));
        let runner = Arc::new(ForecastRunner::from_config(&config));
        let outputs = OutputFiles::new(config.output_dir.clone());

        Self {
            config,
            tokens,
            auth,
            consumers,
            orders,
            runner,
            outputs,
        }
    }
}

pub fn build_app(state: &AppState) -> impl Endpoint {
    let apis = (
        HealthApi::new(
            state.config.forecast_script.clone(),
            state.config.output_dir.clone(),
        ),
        AuthApi::new(state.auth.clone(), state.tokens.clone()),
        ConsumersApi::new(state.consumers.clone(), state.tokens.clone()),
        OrdersApi::new(state.orders.clone(), state.tokens.clone()),
        MlApi::new(state.runner.clone(), state.outputs.clone()),
    );

    let api_service = OpenApiService::new(apis, "Stockwise API", env!("CARGO_PKG_VERSION"))
        .server(format!("http://localhost:{}/api/v1", state.config.port));
    let ui = api_service.swagger_ui();
    let spec = api_service.spec_endpoint();

    Route::new()
        .nest("/api/v1", api_service)
        .nest("/docs", ui)
        .nest("/spec", spec)
        .nest(
            "/ml-outputs",
            StaticFilesEndpoint::new(state.config.output_dir.clone()),
        )
        .with(BodyLimitMiddleware::new(state.config.max_body_bytes))
        .with(RequestTracingMiddleware)
        .with(ErrorRenderingMiddleware)
        .with(
            Cors::new()
                .allow_origin(state.config.cors_origin.as_str())
                .allow_credentials(true),
        )
}
