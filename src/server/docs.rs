//! Interactive documentation, guarded by HTTP basic auth.

use super::{error::ApiError, handlers, types};
use crate::{
    auth::BasicCredentials,
    convert::{InchiRecord, IsotopeRecord, StructureRecord},
    toolkit::ImageFormat,
};
use axum::{
    Json, Router,
    extract::{Request, State},
    http::header,
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;
use tracing::warn;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Chemical Translator API",
        version = "0.0.1",
        description = "Convert SMILES to InChI and InChI key, to SVG or PNG depictions and to isotopic distributions."
    ),
    paths(
        handlers::smiles_to_inchi,
        handlers::smiles_to_inchi_plain,
        handlers::smiles_to_inchi_key_plain,
        handlers::inchi_to_inchi_key,
        handlers::inchi_to_inchi_key_plain,
        handlers::smiles_to_isotope_distribution,
        handlers::smiles_to_isotope_plot,
        handlers::smiles_to_image,
        handlers::smiles_to_svg,
        handlers::smiles_to_png,
    ),
    components(schemas(
        InchiRecord,
        StructureRecord,
        IsotopeRecord,
        ImageFormat,
        types::ErrorResponse,
        types::BinaryImage,
    )),
    tags(
        (name = "smiles", description = "Conversions starting from SMILES"),
        (name = "inchi", description = "Conversions starting from InChI"),
    )
)]
pub struct ApiDoc;

const SWAGGER_UI: &str = r#"<!DOCTYPE html>
<html>
<head>
<link type="text/css" rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui.css">
<title>docs</title>
</head>
<body>
<div id="swagger-ui"></div>
<script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
<script>
const ui = SwaggerUIBundle({
    url: '/openapi.json',
    dom_id: '#swagger-ui',
    layout: 'BaseLayout',
    deepLinking: true,
    presets: [SwaggerUIBundle.presets.apis, SwaggerUIBundle.SwaggerUIStandalonePreset],
})
</script>
</body>
</html>
"#;

const REDOC: &str = r#"<!DOCTYPE html>
<html>
<head>
<title>docs</title>
<meta charset="utf-8"/>
<meta name="viewport" content="width=device-width, initial-scale=1">
</head>
<body>
<redoc spec-url="/openapi.json"></redoc>
<script src="https://cdn.jsdelivr.net/npm/redoc@2/bundles/redoc.standalone.js"></script>
</body>
</html>
"#;

pub fn router(credentials: BasicCredentials) -> Router {
    Router::new()
        .route("/", get(swagger_ui))
        .route("/docs", get(swagger_ui))
        .route("/redoc", get(redoc))
        .route("/openapi.json", get(openapi_json))
        .layer(middleware::from_fn_with_state(
            Arc::new(credentials),
            require_basic_auth,
        ))
}

async fn require_basic_auth(
    State(credentials): State<Arc<BasicCredentials>>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| credentials.verify_header(value));

    if !authorized {
        warn!("Rejected documentation request without valid credentials");
        return ApiError::Unauthorized.into_response();
    }

    next.run(request).await
}

async fn swagger_ui() -> Html<&'static str> {
    Html(SWAGGER_UI)
}

async fn redoc() -> Html<&'static str> {
    Html(REDOC)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/smiles-to-inchi/{secret}/{smiles}",
            "/smiles-to-inchi-plain/{secret}/{smiles}",
            "/smiles-to-inchikey-plain/{secret}/{smiles}",
            "/inchi-to-inchikey/{secret}/{inchi}",
            "/inchi-to-inchikey-plain/{secret}/{inchi}",
            "/smiles-to-isodist/{secret}/{smiles}",
            "/smiles-to-isoplot/{secret}/{smiles}",
            "/smiles-to-image/{secret}/{smiles}",
            "/svg/{secret}/{width}/{height}/{smiles}",
            "/png/{secret}/{width}/{height}/{smiles}",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected}"
            );
        }
    }
}
