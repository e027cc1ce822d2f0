//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all gateway handler
//! - Wire up middleware (tracing, request ID)
//! - Bind server to listener with graceful shutdown
//! - Dispatch requests: classify, run exactly one handler, else delegate
//!
//! # Design Decisions
//! - The request timeout bounds the gateway's own handlers only; delegated
//!   responses stream through for as long as the delegate keeps sending

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{request::Parts, uri::Authority, Request},
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::{GatewayConfig, RegistryConfig};
use crate::error::GatewayError;
use crate::http::forward::Forwarder;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::http::{migrate, response};
use crate::observability::metrics;
use crate::registry::{
    package_name, CacheLookup, ListCache, PackageResolver, PackageStore, ResolveError,
};
use crate::routing::{Action, Router as RuleRouter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub rules: Arc<RuleRouter>,
    pub resolver: Arc<PackageResolver>,
    pub forwarder: Forwarder,
    pub registry: Arc<RegistryConfig>,
    pub request_timeout: Duration,
}

impl AppState {
    /// Assemble state from configuration and connected backends.
    pub fn new(
        config: &GatewayConfig,
        store: Arc<dyn PackageStore>,
        cache: Arc<dyn ListCache>,
    ) -> Result<Self, GatewayError> {
        let authority = config
            .delegate
            .address
            .parse::<Authority>()
            .map_err(|_| GatewayError::DelegateAddress(config.delegate.address.clone()))?;

        Ok(Self {
            rules: Arc::new(RuleRouter::from_config(&config.registry)),
            resolver: Arc::new(PackageResolver::new(store, cache, config.cache.list_key.clone())),
            forwarder: Forwarder::new(authority, Duration::from_secs(config.timeouts.connect_secs)),
            registry: Arc::new(config.registry.clone()),
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        })
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and backends.
    pub fn new(
        config: GatewayConfig,
        store: Arc<dyn PackageStore>,
        cache: Arc<dyn ListCache>,
    ) -> Result<Self, GatewayError> {
        let state = AppState::new(&config, store, cache)?;
        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// The assembled router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            delegate = %self.config.delegate.address,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    dispatch(&state, request).await
}

/// Outcome of a rule's handler.
enum Handled {
    Responded(Response),
    /// The handler produced nothing; the request continues to the delegate.
    Declined,
}

/// Classify the request, run the first matching rule's handler, and
/// delegate when no rule matches or the handler declines.
pub async fn dispatch(state: &AppState, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request.request_id().to_string();
    let method = request.method().to_string();

    let matched = state.rules.classify(&request).map(|rule| (rule.name, rule.action));
    let (parts, body) = request.into_parts();

    let (rule_name, handled) = match matched {
        Some((name, action)) => {
            tracing::debug!(
                request_id = %request_id,
                method = %method,
                path = %parts.uri.path(),
                rule = name,
                "Rule matched"
            );
            let handler = execute(state, action, &parts, &request_id);
            let handled = match tokio::time::timeout(state.request_timeout, handler).await {
                Ok(handled) => handled,
                Err(_) => {
                    tracing::warn!(request_id = %request_id, rule = name, "Handler timed out");
                    Handled::Responded(response::gateway_timeout())
                }
            };
            (name, handled)
        }
        None => ("delegate", Handled::Declined),
    };

    let response = match handled {
        Handled::Responded(response) => response,
        Handled::Declined => {
            state
                .forwarder
                .forward(Request::from_parts(parts, body))
                .await
        }
    };

    tracing::debug!(
        request_id = %request_id,
        rule = rule_name,
        status = %response.status(),
        "Request complete"
    );
    metrics::record_request(&method, response.status().as_u16(), rule_name, start_time);

    response
}

async fn execute(state: &AppState, action: Action, parts: &Parts, request_id: &str) -> Handled {
    match action {
        Action::Migrate => Handled::Responded(migrate::respond(&parts.uri, &state.registry).await),
        Action::ListPackages => match state.resolver.resolve_package_list().await {
            CacheLookup::Hit(body) => Handled::Responded(response::package_list(body)),
            CacheLookup::Miss => {
                tracing::debug!(request_id, "Package list not cached");
                Handled::Declined
            }
            CacheLookup::Error(e) => {
                tracing::warn!(request_id, error = %e, "Package list cache read failed");
                Handled::Declined
            }
        },
        Action::LookupPackage => {
            let name = package_name(parts.uri.path());
            match state.resolver.resolve_package(name).await {
                Ok(package) => Handled::Responded(response::package(&package)),
                Err(e) => {
                    match &e {
                        ResolveError::NotFound(_) => {
                            tracing::debug!(request_id, package = name, "Package not found");
                        }
                        ResolveError::Store(cause) => {
                            tracing::error!(
                                request_id,
                                package = name,
                                error = %cause,
                                "Package lookup failed"
                            );
                        }
                    }
                    Handled::Responded(response::resolve_error(&e))
                }
            }
        }
    }
}
