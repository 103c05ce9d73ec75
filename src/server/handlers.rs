use super::{
    error::ApiError,
    extract::ValidQuery,
    types::{ImageQuery, IsotopeDistributionQuery, IsotopePlotQuery, check_side},
};
use crate::{
    auth::ApiSecret,
    config::AuthConfig,
    convert::{ConversionRequest, ConversionResult, Converter},
    toolkit::{ChemToolkit, ImageFormat},
};
// Referenced only by name inside `#[utoipa::path]` response bodies.
#[allow(unused_imports)]
use crate::{
    convert::{InchiRecord, IsotopeRecord, StructureRecord},
    server::types::{BinaryImage, ErrorResponse},
};
use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct AppState {
    pub converter: Converter,
    pub secret: ApiSecret,
    pub allow_unauthenticated_inchi_key_plain: bool,
}

impl AppState {
    pub fn new(toolkit: Arc<dyn ChemToolkit>, auth: &AuthConfig) -> Self {
        Self {
            converter: Converter::new(toolkit),
            secret: ApiSecret::new(auth.api_secret.clone()),
            allow_unauthenticated_inchi_key_plain: auth.allow_unauthenticated_inchi_key_plain,
        }
    }

    fn authorize(&self, supplied: &str) -> Result<(), ApiError> {
        if self.secret.verify(supplied) {
            Ok(())
        } else {
            warn!("Rejected request with a wrong API secret");
            Err(ApiError::Unauthorized)
        }
    }

    async fn convert(&self, secret: &str, request: ConversionRequest) -> Result<Response, ApiError> {
        self.authorize(secret)?;
        self.respond(request).await
    }

    async fn respond(&self, request: ConversionRequest) -> Result<Response, ApiError> {
        debug!("Converting {:?}", request);
        let result = self.converter.run(request).await?;
        Ok(into_response(result))
    }
}

fn into_response(result: ConversionResult) -> Response {
    match result {
        ConversionResult::Record(record) => Json(record).into_response(),
        ConversionResult::Text(text) => text.into_response(),
        ConversionResult::Image(image) => {
            ([(header::CONTENT_TYPE, image.media_type())], image.bytes).into_response()
        }
    }
}

/// Get InChI string and key from SMILES
///
/// Example SMILES: `N#Cc1ccccc1C/C=C\C`
#[utoipa::path(
    get,
    path = "/smiles-to-inchi/{secret}/{smiles}",
    params(
        ("secret" = String, Path, description = "API secret"),
        ("smiles" = String, Path, description = "SMILES to convert to InChI"),
    ),
    responses(
        (status = 200, description = "InChI and InChI key", body = InchiRecord),
        (status = 401, description = "Wrong API secret", body = ErrorResponse),
        (status = 404, description = "Conversion failed", body = ErrorResponse),
    ),
    tag = "smiles"
)]
pub async fn smiles_to_inchi(
    State(state): State<AppState>,
    Path((secret, smiles)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    state
        .convert(&secret, ConversionRequest::SmilesToInchi { smiles })
        .await
}

/// Get plain text InChI from SMILES
///
/// Answers `Failed` when the SMILES cannot be converted.
#[utoipa::path(
    get,
    path = "/smiles-to-inchi-plain/{secret}/{smiles}",
    params(
        ("secret" = String, Path, description = "API secret"),
        ("smiles" = String, Path, description = "SMILES to convert to InChI"),
    ),
    responses(
        (status = 200, description = "InChI or the text `Failed`", body = String, content_type = "text/plain"),
        (status = 401, description = "Wrong API secret", body = ErrorResponse),
    ),
    tag = "smiles"
)]
pub async fn smiles_to_inchi_plain(
    State(state): State<AppState>,
    Path((secret, smiles)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    state
        .convert(&secret, ConversionRequest::SmilesToInchiPlain { smiles })
        .await
}

/// Get plain text InChI key from SMILES
#[utoipa::path(
    get,
    path = "/smiles-to-inchikey-plain/{secret}/{smiles}",
    params(
        ("secret" = String, Path, description = "API secret"),
        ("smiles" = String, Path, description = "SMILES to convert to an InChI key"),
    ),
    responses(
        (status = 200, description = "InChI key or the text `Failed`", body = String, content_type = "text/plain"),
        (status = 401, description = "Wrong API secret", body = ErrorResponse),
    ),
    tag = "smiles"
)]
pub async fn smiles_to_inchi_key_plain(
    State(state): State<AppState>,
    Path((secret, smiles)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    state
        .convert(&secret, ConversionRequest::SmilesToInchiKeyPlain { smiles })
        .await
}

/// Convert InChI to InChI key and SMILES
///
/// `InChI=1S/C11H11N/c1-2-3-6-10-7-4-5-8-11(10)9-12/h2-5,7-8H,6H2,1H3/b3-2-`
/// gives the key `IVOJPQZCVBYKKF-IHWYPQMZSA-N`.
#[utoipa::path(
    get,
    path = "/inchi-to-inchikey/{secret}/{inchi}",
    params(
        ("secret" = String, Path, description = "API secret"),
        ("inchi" = String, Path, description = "InChI to convert"),
    ),
    responses(
        (status = 200, description = "InChI key and SMILES", body = StructureRecord),
        (status = 401, description = "Wrong API secret", body = ErrorResponse),
        (status = 404, description = "Conversion failed", body = ErrorResponse),
    ),
    tag = "inchi"
)]
pub async fn inchi_to_inchi_key(
    State(state): State<AppState>,
    Path((secret, inchi)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    state
        .convert(&secret, ConversionRequest::InchiToStructure { inchi })
        .await
}

/// Get plain text InChI key from an InChI string
#[utoipa::path(
    get,
    path = "/inchi-to-inchikey-plain/{secret}/{inchi}",
    params(
        ("secret" = String, Path, description = "API secret"),
        ("inchi" = String, Path, description = "InChI to convert to an InChI key"),
    ),
    responses(
        (status = 200, description = "InChI key or the text `Failed`", body = String, content_type = "text/plain"),
        (status = 401, description = "Wrong API secret", body = ErrorResponse),
    ),
    tag = "inchi"
)]
pub async fn inchi_to_inchi_key_plain(
    State(state): State<AppState>,
    Path((secret, inchi)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let request = ConversionRequest::InchiToInchiKeyPlain { inchi };
    if state.allow_unauthenticated_inchi_key_plain {
        state.respond(request).await
    } else {
        state.convert(&secret, request).await
    }
}

/// Get the isotopic distribution of a molecule from SMILES
///
/// Peaks cover the requested probability and are ordered by mass.
#[utoipa::path(
    get,
    path = "/smiles-to-isodist/{secret}/{smiles}",
    params(
        ("secret" = String, Path, description = "API secret"),
        ("smiles" = String, Path, description = "SMILES to convert to an isotopic distribution"),
        IsotopeDistributionQuery,
    ),
    responses(
        (status = 200, description = "Isotopic distribution", body = IsotopeRecord),
        (status = 401, description = "Wrong API secret", body = ErrorResponse),
        (status = 404, description = "Conversion failed", body = ErrorResponse),
        (status = 422, description = "Invalid query parameter", body = ErrorResponse),
    ),
    tag = "smiles"
)]
pub async fn smiles_to_isotope_distribution(
    State(state): State<AppState>,
    Path((secret, smiles)): Path<(String, String)>,
    ValidQuery(query): ValidQuery<IsotopeDistributionQuery>,
) -> Result<Response, ApiError> {
    state
        .convert(
            &secret,
            ConversionRequest::IsotopeDistribution {
                smiles,
                probability: query.probability,
            },
        )
        .await
}

/// Plot the isotopic distribution of a molecule from SMILES
///
/// For a 640 x 480 pixel image use width 6.4, height 4.8 and dpi 100.
#[utoipa::path(
    get,
    path = "/smiles-to-isoplot/{secret}/{smiles}",
    params(
        ("secret" = String, Path, description = "API secret"),
        ("smiles" = String, Path, description = "SMILES to plot"),
        IsotopePlotQuery,
    ),
    responses(
        (status = 200, description = "PNG stem plot", body = BinaryImage, content_type = "image/png"),
        (status = 401, description = "Wrong API secret", body = ErrorResponse),
        (status = 404, description = "Conversion failed", body = ErrorResponse),
        (status = 422, description = "Invalid query parameter", body = ErrorResponse),
    ),
    tag = "smiles"
)]
pub async fn smiles_to_isotope_plot(
    State(state): State<AppState>,
    Path((secret, smiles)): Path<(String, String)>,
    ValidQuery(query): ValidQuery<IsotopePlotQuery>,
) -> Result<Response, ApiError> {
    state
        .convert(
            &secret,
            ConversionRequest::IsotopePlot {
                smiles,
                probability: query.probability,
                plot: query.plot_spec(),
            },
        )
        .await
}

/// Get an SVG or PNG depiction from SMILES
#[utoipa::path(
    get,
    path = "/smiles-to-image/{secret}/{smiles}",
    params(
        ("secret" = String, Path, description = "API secret"),
        ("smiles" = String, Path, description = "SMILES to depict"),
        ImageQuery,
    ),
    responses(
        (status = 200, description = "Depiction", body = BinaryImage, content_type = ["image/png", "image/svg+xml"]),
        (status = 401, description = "Wrong API secret", body = ErrorResponse),
        (status = 404, description = "Conversion failed", body = ErrorResponse),
        (status = 422, description = "Invalid query parameter", body = ErrorResponse),
    ),
    tag = "smiles"
)]
pub async fn smiles_to_image(
    State(state): State<AppState>,
    Path((secret, smiles)): Path<(String, String)>,
    ValidQuery(query): ValidQuery<ImageQuery>,
) -> Result<Response, ApiError> {
    let (width, height) = query.dimensions();
    state
        .convert(
            &secret,
            ConversionRequest::Image {
                smiles,
                width,
                height,
                format: query.format.unwrap_or_default(),
            },
        )
        .await
}

/// Get an SVG depiction from SMILES
#[utoipa::path(
    get,
    path = "/svg/{secret}/{width}/{height}/{smiles}",
    params(
        ("secret" = String, Path, description = "API secret"),
        ("width" = u32, Path, description = "Width of the image"),
        ("height" = u32, Path, description = "Height of the image"),
        ("smiles" = String, Path, description = "SMILES to depict"),
    ),
    responses(
        (status = 200, description = "SVG depiction", body = String, content_type = "image/svg+xml"),
        (status = 401, description = "Wrong API secret", body = ErrorResponse),
        (status = 404, description = "Conversion failed", body = ErrorResponse),
        (status = 422, description = "Invalid dimension", body = ErrorResponse),
    ),
    tag = "smiles"
)]
pub async fn smiles_to_svg(
    State(state): State<AppState>,
    Path(params): Path<(String, String, String, String)>,
) -> Result<Response, ApiError> {
    depict_with_path_dimensions(state, params, ImageFormat::Svg).await
}

/// Get a PNG depiction from SMILES
#[utoipa::path(
    get,
    path = "/png/{secret}/{width}/{height}/{smiles}",
    params(
        ("secret" = String, Path, description = "API secret"),
        ("width" = u32, Path, description = "Width of the image"),
        ("height" = u32, Path, description = "Height of the image"),
        ("smiles" = String, Path, description = "SMILES to depict"),
    ),
    responses(
        (status = 200, description = "PNG depiction", body = BinaryImage, content_type = "image/png"),
        (status = 401, description = "Wrong API secret", body = ErrorResponse),
        (status = 404, description = "Conversion failed", body = ErrorResponse),
        (status = 422, description = "Invalid dimension", body = ErrorResponse),
    ),
    tag = "smiles"
)]
pub async fn smiles_to_png(
    State(state): State<AppState>,
    Path(params): Path<(String, String, String, String)>,
) -> Result<Response, ApiError> {
    depict_with_path_dimensions(state, params, ImageFormat::Png).await
}

async fn depict_with_path_dimensions(
    state: AppState,
    (secret, width, height, smiles): (String, String, String, String),
    format: ImageFormat,
) -> Result<Response, ApiError> {
    let width = parse_side("width", &width)?;
    let height = parse_side("height", &height)?;
    state
        .convert(
            &secret,
            ConversionRequest::Image {
                smiles,
                width,
                height,
                format,
            },
        )
        .await
}

fn parse_side(name: &str, raw: &str) -> Result<u32, ApiError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("{} must be an integer, got '{}'", name, raw)))?;
    check_side(name, value).map_err(ApiError::BadRequest)
}
