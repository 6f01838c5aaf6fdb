use axum::extract::DefaultBodyLimit;
use axum::http::HeaderName;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::{stream, upload, VidAxumState};

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct VidApp {
    pub state: VidAxumState,
    pub router: Router<()>,
}

impl VidApp {
    pub fn new(state: VidAxumState) -> Self {
        Self {
            router: routes(state.clone()),
            state,
        }
    }

    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "listening");
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}

/// Router with the upload, stream and health routes plus request tracing.
///
/// Every response carries `x-request-id`; a caller-supplied id is kept.
pub fn routes(state: VidAxumState) -> Router<()> {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route(
            "/upload",
            post(upload::upload).layer(DefaultBodyLimit::disable()),
        )
        .route("/stream/{name}", get(stream::stream))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id)),
        )
}

pub fn vid_app(state: VidAxumState) -> VidApp {
    VidApp::new(state)
}
