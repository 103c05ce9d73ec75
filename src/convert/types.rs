use crate::toolkit::{ImageFormat, PlotSpec};
use serde::Serialize;
use utoipa::ToSchema;

/// The logical conversions the API offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SmilesToInchi,
    SmilesToInchiKey,
    InchiToInchiKey,
    SmilesToIsotopeDistribution,
    SmilesToIsotopePlot,
    SmilesToImage,
}

impl Operation {
    /// Prefix of the detail message reported when the conversion fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::SmilesToInchi => "Conversion of SMILES to InChi failed",
            Self::SmilesToInchiKey => "Conversion of SMILES to InChi key failed",
            Self::InchiToInchiKey => "Conversion of InChi failed",
            Self::SmilesToIsotopeDistribution => {
                "Conversion of SMILES to isotopic distribution failed"
            }
            Self::SmilesToIsotopePlot => "Conversion of SMILES to isotopic distribution plot failed",
            Self::SmilesToImage => "Conversion of SMILES failed",
        }
    }
}

/// One validated conversion, carrying its raw structure string and options.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionRequest {
    SmilesToInchi {
        smiles: String,
    },
    SmilesToInchiPlain {
        smiles: String,
    },
    SmilesToInchiKeyPlain {
        smiles: String,
    },
    InchiToStructure {
        inchi: String,
    },
    InchiToInchiKeyPlain {
        inchi: String,
    },
    IsotopeDistribution {
        smiles: String,
        probability: Option<f64>,
    },
    IsotopePlot {
        smiles: String,
        probability: Option<f64>,
        plot: PlotSpec,
    },
    Image {
        smiles: String,
        width: u32,
        height: u32,
        format: ImageFormat,
    },
}

impl ConversionRequest {
    pub fn operation(&self) -> Operation {
        match self {
            Self::SmilesToInchi { .. } | Self::SmilesToInchiPlain { .. } => {
                Operation::SmilesToInchi
            }
            Self::SmilesToInchiKeyPlain { .. } => Operation::SmilesToInchiKey,
            Self::InchiToStructure { .. } | Self::InchiToInchiKeyPlain { .. } => {
                Operation::InchiToInchiKey
            }
            Self::IsotopeDistribution { .. } => Operation::SmilesToIsotopeDistribution,
            Self::IsotopePlot { .. } => Operation::SmilesToIsotopePlot,
            Self::Image { .. } => Operation::SmilesToImage,
        }
    }

    /// The structure string as supplied, before trimming.
    pub fn input(&self) -> &str {
        match self {
            Self::SmilesToInchi { smiles }
            | Self::SmilesToInchiPlain { smiles }
            | Self::SmilesToInchiKeyPlain { smiles }
            | Self::IsotopeDistribution { smiles, .. }
            | Self::IsotopePlot { smiles, .. }
            | Self::Image { smiles, .. } => smiles,
            Self::InchiToStructure { inchi } | Self::InchiToInchiKeyPlain { inchi } => inchi,
        }
    }
}

/// SMILES with its InChI and InChI key.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct InchiRecord {
    pub smiles: String,
    #[serde(rename = "InChi")]
    pub inchi: String,
    #[serde(rename = "InChiKey")]
    pub inchi_key: String,
}

/// InChI with its key and a SMILES recovered from it.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StructureRecord {
    #[serde(rename = "InChi")]
    pub inchi: String,
    #[serde(rename = "InChiKey")]
    pub inchi_key: String,
    pub smiles: String,
}

/// Isotopic distribution of a molecule covering `prob_to_cover` of the
/// total probability. Peaks are ordered by ascending mass.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct IsotopeRecord {
    pub smiles: String,
    pub formula: String,
    pub average_mol_weight: f64,
    pub exact_mol_weight: f64,
    pub heavy_atom_mol_weight: f64,
    pub prob_to_cover: f64,
    pub masses: Vec<f64>,
    pub probs: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Inchi(InchiRecord),
    Structure(StructureRecord),
    Isotope(IsotopeRecord),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl Image {
    pub fn media_type(&self) -> &'static str {
        self.format.media_type()
    }
}

/// Outcome of a conversion; exactly one shape per request.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionResult {
    Record(Record),
    Text(String),
    Image(Image),
}
