//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the navigation handler and admin routes
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind server to listener
//! - Hand each navigation to the redirector
//! - Stop on the shutdown broadcast
//!
//! # Design Decisions
//! - Redirects write the stats file synchronously, so `handle` runs on the
//!   blocking pool and never stalls the async workers

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::config::{AdminConfig, RedirectorConfig};
use crate::http::{request, response};
use crate::stats::now_millis;
use crate::store::Store;
use crate::surfaces::{QuickAccess, Redirector, RuleManager};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub redirector: Arc<Redirector>,
    pub manager: Arc<RuleManager>,
    pub quick: Arc<QuickAccess>,
    pub admin: Arc<AdminConfig>,
    pub default_scheme: Arc<str>,
    pub redirect_status: StatusCode,
}

impl AppState {
    /// Build every surface over `store`.
    pub fn new(config: &RedirectorConfig, store: Arc<dyn Store>) -> Self {
        Self {
            redirector: Arc::new(Redirector::new(store.clone(), &config.matcher)),
            manager: Arc::new(RuleManager::new(store.clone())),
            quick: Arc::new(QuickAccess::new(store)),
            admin: Arc::new(config.admin.clone()),
            default_scheme: Arc::from(config.gateway.default_scheme.as_str()),
            redirect_status: StatusCode::from_u16(config.gateway.redirect_status)
                .unwrap_or(StatusCode::FOUND),
        }
    }
}

/// HTTP server that answers navigations with redirects.
pub struct GatewayServer {
    router: Router,
    state: AppState,
}

impl GatewayServer {
    /// Create a new gateway with the given configuration and store.
    pub fn new(config: &RedirectorConfig, store: Arc<dyn Store>) -> Self {
        let state = AppState::new(config, store);
        let router = Self::build_router(config, state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RedirectorConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/", any(redirect_handler))
            .route("/{*path}", any(redirect_handler))
            .with_state(state.clone());

        if config.admin.enabled {
            router = router.merge(setup_admin_router(state));
        }

        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.gateway.request_timeout_secs,
                ))),
        )
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            active_rules = self.state.redirector.active_rules(),
            "Redirect gateway starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("Redirect gateway stopped");
        Ok(())
    }
}

/// Navigation handler: redirect on a rule match, 404 otherwise.
async fn redirect_handler(State(state): State<AppState>, req: Request<Body>) -> Response {
    let request_id = request::request_id(req.headers()).to_string();

    let Some(url) =
        request::navigation_url(req.headers(), req.uri(), &state.default_scheme)
    else {
        tracing::warn!(request_id = %request_id, "Navigation without Host header");
        return response::missing_host();
    };

    let redirector = state.redirector.clone();
    let navigated = url.clone();
    let outcome =
        tokio::task::spawn_blocking(move || redirector.handle(&navigated, now_millis())).await;

    let redirect = match outcome {
        Ok(redirect) => redirect,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Redirect task failed");
            return response::internal_error();
        }
    };

    match redirect {
        Some(redirect) => {
            tracing::debug!(request_id = %request_id, from = %url, to = %redirect.url, "Redirect sent");
            response::redirect(state.redirect_status, &redirect.url)
        }
        None => {
            tracing::debug!(request_id = %request_id, url = %url, "No rule matched");
            response::no_match()
        }
    }
}
