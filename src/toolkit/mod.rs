//! Seam to the cheminformatics and isotope libraries.
//!
//! Everything chemical (parsing, canonical identifiers, layout, rendering,
//! isotope envelopes) happens behind [`ChemToolkit`]. The production
//! implementation drives RDKit and IsoSpecPy in Python worker processes.

mod python;
mod types;

pub use python::PythonToolkit;
pub use types::*;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolkitError {
    #[error("could not parse structure: {0}")]
    Parse(String),

    #[error("could not encode structure: {0}")]
    Encode(String),

    #[error("could not render image: {0}")]
    Render(String),

    #[error("isotope solver failed: {0}")]
    Solve(String),

    #[error("toolkit unavailable: {0}")]
    Unavailable(String),

    #[error("toolkit protocol error: {0}")]
    Protocol(String),

    #[error("toolkit did not answer within {0:?}")]
    Timeout(Duration),
}

impl ToolkitError {
    /// True for failures caused by the input itself rather than by the
    /// toolkit machinery.
    pub fn is_conversion_failure(&self) -> bool {
        matches!(
            self,
            Self::Parse(_) | Self::Encode(_) | Self::Render(_) | Self::Solve(_)
        )
    }
}

#[async_trait]
pub trait ChemToolkit: Send + Sync {
    async fn smiles_to_inchi(&self, smiles: &str) -> Result<InchiIdentifiers, ToolkitError>;

    async fn inchi_to_structure(&self, inchi: &str)
    -> Result<StructureIdentifiers, ToolkitError>;

    async fn isotope_distribution(
        &self,
        smiles: &str,
        prob_to_cover: f64,
    ) -> Result<IsotopeEnvelope, ToolkitError>;

    /// Renders peaks as a stem plot labelled with their masses. Returns PNG bytes.
    async fn stem_plot(
        &self,
        masses: &[f64],
        probs: &[f64],
        spec: &PlotSpec,
    ) -> Result<Vec<u8>, ToolkitError>;

    async fn depict(
        &self,
        smiles: &str,
        width: u32,
        height: u32,
        format: ImageFormat,
    ) -> Result<Depiction, ToolkitError>;
}
