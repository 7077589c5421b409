use axum::body::Body;
use axum::http::Request;
use axum::Router;
use relay_core::RelayApp;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::rest;
use crate::RelayAxumState;

#[derive(Clone)]
pub struct AxumApp {
    pub app: RelayApp,
    router: Router<()>,
}

impl AxumApp {
    pub fn new(app: RelayApp) -> Self {
        let state = RelayAxumState::new(app.clone());
        Self {
            app,
            router: rest::relay_router(state),
        }
    }

    /// The routes wrapped in request-id and tracing layers.
    ///
    /// An incoming `x-request-id` is kept; otherwise a UUID is generated.
    /// Either way it is echoed on the response.
    pub fn into_router(self) -> Router<()> {
        self.router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                    let request_id = req
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default();
                    tracing::info_span!(
                        "http",
                        method = %req.method(),
                        path = %req.uri().path(),
                        request_id = %request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
    }

    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        info!("listening on http://{}", listener.local_addr()?);
        axum::serve(listener, self.into_router()).await?;
        Ok(())
    }
}

pub fn axum(app: RelayApp) -> AxumApp {
    AxumApp::new(app)
}
