//! The request-validation-and-conversion pipeline.
//!
//! A [`Converter`] takes one [`ConversionRequest`], calls the toolkit, and
//! shapes the answer into a [`ConversionResult`]. Known toolkit failures
//! (parse, encode, render, solve) become [`ConvertError::Failed`] or, for
//! the plain-text conversions, the literal text [`PLAIN_FAILURE`]. Anything
//! else escapes as [`ConvertError::Toolkit`].

mod isotope;
mod svg;
mod types;

pub use isotope::{FULL_COVERAGE, PLOT_COVERAGE, coverage, sorted_peaks};
pub use svg::normalize_svg;
pub use types::*;

use crate::toolkit::{ChemToolkit, Depiction, ImageFormat, ToolkitError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Body returned by plain-text conversions that fail.
pub const PLAIN_FAILURE: &str = "Failed";

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    #[error("Empty structure string")]
    EmptyInput,

    #[error("{}: {input}", .operation.failure_message())]
    Failed { operation: Operation, input: String },

    #[error(transparent)]
    Toolkit(ToolkitError),
}

#[derive(Clone)]
pub struct Converter {
    toolkit: Arc<dyn ChemToolkit>,
}

impl Converter {
    pub fn new(toolkit: Arc<dyn ChemToolkit>) -> Self {
        Self { toolkit }
    }

    pub async fn run(&self, request: ConversionRequest) -> Result<ConversionResult, ConvertError> {
        let operation = request.operation();
        let input = request.input().trim().to_string();
        if input.is_empty() {
            return Err(ConvertError::EmptyInput);
        }

        let fail = |e: ToolkitError| failure(operation, &input, e);

        match request {
            ConversionRequest::SmilesToInchi { .. } => {
                let ids = self.toolkit.smiles_to_inchi(&input).await.map_err(fail)?;
                Ok(ConversionResult::Record(Record::Inchi(InchiRecord {
                    smiles: input.clone(),
                    inchi: ids.inchi,
                    inchi_key: ids.inchi_key,
                })))
            }
            ConversionRequest::SmilesToInchiPlain { .. } => plain(
                operation,
                &input,
                self.toolkit.smiles_to_inchi(&input).await.map(|ids| ids.inchi),
            ),
            ConversionRequest::SmilesToInchiKeyPlain { .. } => plain(
                operation,
                &input,
                self.toolkit
                    .smiles_to_inchi(&input)
                    .await
                    .map(|ids| ids.inchi_key),
            ),
            ConversionRequest::InchiToStructure { .. } => {
                let ids = self.toolkit.inchi_to_structure(&input).await.map_err(fail)?;
                Ok(ConversionResult::Record(Record::Structure(StructureRecord {
                    inchi: input.clone(),
                    inchi_key: ids.inchi_key,
                    smiles: ids.smiles,
                })))
            }
            ConversionRequest::InchiToInchiKeyPlain { .. } => plain(
                operation,
                &input,
                self.toolkit
                    .inchi_to_structure(&input)
                    .await
                    .map(|ids| ids.inchi_key),
            ),
            ConversionRequest::IsotopeDistribution { probability, .. } => {
                let prob_to_cover = coverage(probability, FULL_COVERAGE);
                let envelope = self
                    .toolkit
                    .isotope_distribution(&input, prob_to_cover)
                    .await
                    .map_err(fail)?;
                let (masses, probs) =
                    sorted_peaks(envelope.masses, envelope.probs).map_err(fail)?;
                Ok(ConversionResult::Record(Record::Isotope(IsotopeRecord {
                    smiles: input.clone(),
                    formula: envelope.formula,
                    average_mol_weight: envelope.average_mol_weight,
                    exact_mol_weight: envelope.exact_mol_weight,
                    heavy_atom_mol_weight: envelope.heavy_atom_mol_weight,
                    prob_to_cover,
                    masses,
                    probs,
                })))
            }
            ConversionRequest::IsotopePlot {
                probability, plot, ..
            } => {
                let prob_to_cover = coverage(probability, PLOT_COVERAGE);
                let envelope = self
                    .toolkit
                    .isotope_distribution(&input, prob_to_cover)
                    .await
                    .map_err(fail)?;
                let (masses, probs) =
                    sorted_peaks(envelope.masses, envelope.probs).map_err(fail)?;
                let bytes = self
                    .toolkit
                    .stem_plot(&masses, &probs, &plot)
                    .await
                    .and_then(ensure_png)
                    .map_err(fail)?;
                Ok(ConversionResult::Image(Image {
                    format: ImageFormat::Png,
                    bytes,
                }))
            }
            ConversionRequest::Image {
                width,
                height,
                format,
                ..
            } => {
                let depiction = self
                    .toolkit
                    .depict(&input, width, height, format)
                    .await
                    .map_err(fail)?;
                let image = match depiction {
                    Depiction::Svg(svg) => Image {
                        format: ImageFormat::Svg,
                        bytes: normalize_svg(&svg).into_bytes(),
                    },
                    Depiction::Png(bytes) => Image {
                        format: ImageFormat::Png,
                        bytes: ensure_png(bytes).map_err(fail)?,
                    },
                };
                if image.format != format {
                    return Err(ConvertError::Toolkit(ToolkitError::Protocol(format!(
                        "asked for {} but the toolkit rendered {}",
                        format, image.format
                    ))));
                }
                Ok(ConversionResult::Image(image))
            }
        }
    }
}

fn failure(operation: Operation, input: &str, error: ToolkitError) -> ConvertError {
    if error.is_conversion_failure() {
        debug!("{} for {:?}: {}", operation.failure_message(), input, error);
        ConvertError::Failed {
            operation,
            input: input.to_string(),
        }
    } else {
        warn!("Toolkit failure during {:?}: {}", operation, error);
        ConvertError::Toolkit(error)
    }
}

fn plain(
    operation: Operation,
    input: &str,
    outcome: Result<String, ToolkitError>,
) -> Result<ConversionResult, ConvertError> {
    match outcome {
        Ok(text) => Ok(ConversionResult::Text(text)),
        Err(e) => match failure(operation, input, e) {
            ConvertError::Failed { .. } => Ok(ConversionResult::Text(PLAIN_FAILURE.to_string())),
            other => Err(other),
        },
    }
}

fn ensure_png(bytes: Vec<u8>) -> Result<Vec<u8>, ToolkitError> {
    if bytes.starts_with(&PNG_SIGNATURE) {
        Ok(bytes)
    } else {
        Err(ToolkitError::Protocol(
            "toolkit returned an image without PNG signature".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_detail_echoes_input() {
        let err = ConvertError::Failed {
            operation: Operation::SmilesToInchi,
            input: "not_a_smiles".into(),
        };
        assert_eq!(
            err.to_string(),
            "Conversion of SMILES to InChi failed: not_a_smiles"
        );
    }

    #[test]
    fn only_known_failures_become_conversion_failures() {
        assert!(matches!(
            failure(Operation::SmilesToImage, "C", ToolkitError::Render("x".into())),
            ConvertError::Failed { .. }
        ));
        assert!(matches!(
            failure(Operation::SmilesToImage, "C", ToolkitError::Unavailable("x".into())),
            ConvertError::Toolkit(_)
        ));
    }

    #[test]
    fn plain_failure_becomes_sentinel_text() {
        let result = plain(
            Operation::SmilesToInchi,
            "xx",
            Err(ToolkitError::Parse("bad".into())),
        );
        assert_eq!(result, Ok(ConversionResult::Text("Failed".into())));

        let result = plain(
            Operation::SmilesToInchi,
            "xx",
            Err(ToolkitError::Timeout(std::time::Duration::from_secs(1))),
        );
        assert!(result.is_err());
    }

    #[test]
    fn png_signature_is_checked() {
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend_from_slice(b"IHDR");
        assert!(ensure_png(png).is_ok());
        assert!(ensure_png(b"GIF89a".to_vec()).is_err());
        assert!(ensure_png(Vec::new()).is_err());
    }
}
