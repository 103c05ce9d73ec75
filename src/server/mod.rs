pub mod docs;
mod error;
mod extract;
mod handlers;
pub mod types;

pub use error::{ApiError, UNAUTHORIZED_DETAIL};
pub use extract::ValidQuery;
pub use handlers::AppState;

use crate::{
    Result,
    auth::BasicCredentials,
    config::Config,
    toolkit::{ChemToolkit, PythonToolkit},
};
use axum::{
    Router,
    extract::{MatchedPath, Request},
    routing::get,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::{info, info_span};

/// Builds the application router.
///
/// The documentation pages are only mounted when `docs` carries credentials.
pub fn router(state: AppState, docs: Option<BasicCredentials>) -> Router {
    let api = Router::new()
        .route("/smiles-to-inchi/:secret/*smiles", get(handlers::smiles_to_inchi))
        .route(
            "/smiles-to-inchi-plain/:secret/*smiles",
            get(handlers::smiles_to_inchi_plain),
        )
        .route(
            "/smiles-to-inchikey-plain/:secret/*smiles",
            get(handlers::smiles_to_inchi_key_plain),
        )
        .route(
            "/inchi-to-inchikey/:secret/*inchi",
            get(handlers::inchi_to_inchi_key),
        )
        .route(
            "/inchi-to-inchikey-plain/:secret/*inchi",
            get(handlers::inchi_to_inchi_key_plain),
        )
        .route(
            "/smiles-to-isodist/:secret/*smiles",
            get(handlers::smiles_to_isotope_distribution),
        )
        .route(
            "/smiles-to-isoplot/:secret/*smiles",
            get(handlers::smiles_to_isotope_plot),
        )
        .route("/smiles-to-image/:secret/*smiles", get(handlers::smiles_to_image))
        .route("/svg/:secret/:width/:height/*smiles", get(handlers::smiles_to_svg))
        .route("/png/:secret/:width/:height/*smiles", get(handlers::smiles_to_png))
        .with_state(state);

    let app = match docs {
        Some(credentials) => api.merge(docs::router(credentials)),
        None => api,
    };

    // spans carry the route pattern, never the raw path with its secret
    app.layer(
        TraceLayer::new_for_http().make_span_with(|request: &Request| {
            let route = request
                .extensions()
                .get::<MatchedPath>()
                .map(MatchedPath::as_str)
                .unwrap_or("unmatched");
            info_span!("http_request", method = %request.method(), route)
        }),
    )
}

pub async fn run(config: Config) -> Result<()> {
    // Start the toolkit and make sure RDKit is importable before serving
    let toolkit = Arc::new(PythonToolkit::new(config.toolkit.clone()));
    toolkit.ping().await?;

    let toolkit: Arc<dyn ChemToolkit> = toolkit;
    let state = AppState::new(toolkit, &config.auth);
    let docs = config
        .docs
        .as_ref()
        .map(|docs| BasicCredentials::new(docs.username.clone(), docs.password.clone()));
    if docs.is_none() {
        info!("No docs credentials configured; documentation pages disabled");
    }

    let app = router(state, docs);

    // Start server
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
