use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// InChI and InChI key computed from a SMILES string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InchiIdentifiers {
    pub inchi: String,
    pub inchi_key: String,
}

/// Identifiers recovered from an InChI string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StructureIdentifiers {
    pub inchi_key: String,
    pub smiles: String,
}

/// Molecular properties and the isotope envelope of one molecule.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IsotopeEnvelope {
    pub formula: String,
    pub average_mol_weight: f64,
    pub exact_mol_weight: f64,
    pub heavy_atom_mol_weight: f64,
    pub masses: Vec<f64>,
    pub probs: Vec<f64>,
}

/// Figure geometry of an isotope stem plot. Width and height are in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotSpec {
    pub width: f64,
    pub height: f64,
    pub dpi: f64,
    pub digits: u32,
}

impl Default for PlotSpec {
    fn default() -> Self {
        Self {
            width: 3.2,
            height: 2.4,
            dpi: 100.0,
            digits: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Svg,
    #[default]
    Png,
}

impl ImageFormat {
    pub fn media_type(self) -> &'static str {
        match self {
            Self::Svg => "image/svg+xml; charset=utf-8",
            Self::Png => "image/png",
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Svg => f.write_str("svg"),
            Self::Png => f.write_str("png"),
        }
    }
}

/// A rendered 2D depiction as produced by the toolkit.
#[derive(Debug, Clone, PartialEq)]
pub enum Depiction {
    Svg(String),
    Png(Vec<u8>),
}
