//! HTTP surface of the registration gateway.

use crate::config::GatewayConfig;
use crate::error::{Result, ValidationFailure};
use crate::model::{LegacyCalendarRecord, UserRecord};
use crate::store::{MemoryStore, UserStore};
use crate::validation::Validator;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

type SharedStore = Arc<dyn UserStore>;

#[derive(Clone)]
pub struct AppState {
    store: SharedStore,
    validator: Arc<Validator>,
    confirmation_delay: Duration,
}

impl AppState {
    pub fn new(config: &GatewayConfig, store: SharedStore) -> Self {
        Self {
            store,
            validator: Arc::new(Validator::new(config.profile)),
            confirmation_delay: config.confirmation_delay,
        }
    }
}

#[derive(Serialize)]
struct StatusBody {
    status: &'static str,
}

const SUCCESS: StatusBody = StatusBody { status: "success" };

impl IntoResponse for ValidationFailure {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self.into_violations())).into_response()
    }
}

/// Builds the gateway routes over `state`.
///
/// Every route accepts cross-origin requests from any origin.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(greeting))
        .route("/users", get(list_users).post(register_user))
        .route("/users_wrong", get(list_users_legacy_calendar))
        .route("/reset", get(reset_users))
        .layer(
            tower::ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// A running registration gateway.
///
/// The server runs on a background task for as long as the process does.
pub struct GatewayServer {
    addr: SocketAddr,
    store: SharedStore,
    _handle: tokio::task::JoinHandle<()>,
}

impl GatewayServer {
    /// Binds and starts a gateway backed by a fresh [`MemoryStore`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use registration_gateway::{GatewayConfig, GatewayServer};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let server = GatewayServer::new(GatewayConfig::default()).await?;
    /// println!("Listening on {}", server.url());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(config: GatewayConfig) -> Result<Self> {
        Self::with_store(config, Arc::new(MemoryStore::new())).await
    }

    /// Binds and starts a gateway over an existing store.
    pub async fn with_store(config: GatewayConfig, store: SharedStore) -> Result<Self> {
        let app = router(AppState::new(&config, store.clone()));

        let bind_addr = if let Some(port) = config.port {
            format!("{}:{}", config.host, port)
        } else {
            format!("{}:0", config.host)
        };

        let listener = TcpListener::bind(&bind_addr).await?;
        let addr = listener.local_addr()?;

        info!(
            "Registration gateway listening on {} (profile: {})",
            addr, config.profile
        );

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            store,
            _handle: handle,
        })
    }

    /// Returns the socket address the server is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the base URL of the server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Handle to the store the server reads and mutates.
    pub fn store(&self) -> SharedStore {
        self.store.clone()
    }
}

async fn greeting() -> &'static str {
    "Hello World"
}

async fn list_users(State(state): State<AppState>) -> Json<Vec<UserRecord>> {
    let users = state.store.list().await;
    debug!("Listing {} users", users.len());
    Json(users)
}

async fn list_users_legacy_calendar(
    State(state): State<AppState>,
) -> Json<Vec<LegacyCalendarRecord>> {
    let users = state.store.list().await;
    debug!("Listing {} users in legacy calendar form", users.len());
    Json(users.iter().map(UserRecord::to_legacy_calendar).collect())
}

async fn register_user(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> std::result::Result<Json<StatusBody>, ValidationFailure> {
    let request = state.validator.validate(&body).map_err(|failure| {
        debug!("Rejected registration: {}", failure);
        failure
    })?;

    // Committed before the delay starts; the delay only holds back the reply.
    let record = state.store.insert(request.into_new_user()).await;
    info!("Registered user {} <{}>", record.id, record.email);

    tokio::time::sleep(state.confirmation_delay).await;
    Ok(Json(SUCCESS))
}

async fn reset_users(State(state): State<AppState>) -> Json<StatusBody> {
    state.store.reset().await;
    info!("Store reset to seed records");
    Json(SUCCESS)
}
