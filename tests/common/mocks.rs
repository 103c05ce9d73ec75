use async_trait::async_trait;
use chem_translator::toolkit::{
    ChemToolkit, Depiction, ImageFormat, InchiIdentifiers, IsotopeEnvelope, PlotSpec,
    StructureIdentifiers, ToolkitError,
};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// A molecule the mock toolkit knows about.
#[derive(Debug, Clone)]
pub struct KnownMolecule {
    pub smiles: &'static str,
    pub inchi: &'static str,
    pub inchi_key: &'static str,
    pub formula: &'static str,
    /// Peaks deliberately out of mass order, as a solver may return them.
    pub peaks: &'static [(f64, f64)],
}

pub const ETHANOL: KnownMolecule = KnownMolecule {
    smiles: "CCO",
    inchi: "InChI=1S/C2H6O/c1-2-3/h3H,2H2,1H3",
    inchi_key: "LFQSCWFLJHTTHZ-UHFFFAOYSA-N",
    formula: "C2H6O",
    peaks: &[(47.0454, 0.0224), (46.0419, 0.9757), (48.0461, 0.0019)],
};

pub const CROTYL_BENZONITRILE: KnownMolecule = KnownMolecule {
    smiles: r"N#Cc1ccccc1C/C=C\C",
    inchi: "InChI=1S/C11H11N/c1-2-3-6-10-7-4-5-8-11(10)9-12/h2-5,7-8H,6H2,1H3/b3-2-",
    inchi_key: "IVOJPQZCVBYKKF-IHWYPQMZSA-N",
    formula: "C11H11N",
    peaks: &[(158.0938, 0.1206), (157.0891, 0.8721), (159.0971, 0.0073)],
};

pub const KNOWN: [KnownMolecule; 2] = [ETHANOL, CROTYL_BENZONITRILE];

/// SVG as RDKit's drawer emits it, with namespace prefixes and a declaration.
pub const RAW_SVG: &str = "<?xml version='1.0' encoding='iso-8859-1'?>\n\
<svg:svg version='1.1' baseProfile='full'\n              xmlns:svg='http://www.w3.org/2000/svg'\n\
              xml:space='preserve'\n\
width='200px' height='200px' viewBox='0 0 200 200'>\n\
<svg:rect style='opacity:1.0;fill:#FFFFFF' width='200' height='200' x='0' y='0'> </svg:rect>\n\
<svg:path class='bond-0' d='M 10,10 L 20,20' style='fill:none' />\n\
</svg:svg>\n";

/// Mock chemistry toolkit for testing
#[derive(Debug, Default)]
pub struct MockToolkit {
    calls: AtomicUsize,
    failure: Option<ToolkitError>,
    last_prob_to_cover: Mutex<Option<f64>>,
    last_plot: Mutex<Option<PlotSpec>>,
    last_depiction: Mutex<Option<(u32, u32, ImageFormat)>>,
}

impl MockToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with `error`.
    pub fn with_failure(mut self, error: ToolkitError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prob_to_cover(&self) -> Option<f64> {
        *self.last_prob_to_cover.lock().unwrap()
    }

    pub fn last_plot(&self) -> Option<PlotSpec> {
        *self.last_plot.lock().unwrap()
    }

    pub fn last_depiction(&self) -> Option<(u32, u32, ImageFormat)> {
        *self.last_depiction.lock().unwrap()
    }

    fn enter(&self) -> Result<(), ToolkitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn by_smiles(smiles: &str) -> Result<&'static KnownMolecule, ToolkitError> {
        KNOWN
            .iter()
            .find(|m| m.smiles == smiles)
            .ok_or_else(|| ToolkitError::Parse(format!("invalid SMILES: {}", smiles)))
    }
}

fn png_bytes() -> Vec<u8> {
    let mut bytes = PNG_SIGNATURE.to_vec();
    bytes.extend_from_slice(b"\0\0\0\rIHDR mock image");
    bytes
}

#[async_trait]
impl ChemToolkit for MockToolkit {
    async fn smiles_to_inchi(&self, smiles: &str) -> Result<InchiIdentifiers, ToolkitError> {
        self.enter()?;
        let molecule = Self::by_smiles(smiles)?;
        Ok(InchiIdentifiers {
            inchi: molecule.inchi.to_string(),
            inchi_key: molecule.inchi_key.to_string(),
        })
    }

    async fn inchi_to_structure(
        &self,
        inchi: &str,
    ) -> Result<StructureIdentifiers, ToolkitError> {
        self.enter()?;
        let molecule = KNOWN
            .iter()
            .find(|m| m.inchi == inchi)
            .ok_or_else(|| ToolkitError::Parse(format!("invalid InChI: {}", inchi)))?;
        Ok(StructureIdentifiers {
            inchi_key: molecule.inchi_key.to_string(),
            smiles: molecule.smiles.to_string(),
        })
    }

    async fn isotope_distribution(
        &self,
        smiles: &str,
        prob_to_cover: f64,
    ) -> Result<IsotopeEnvelope, ToolkitError> {
        self.enter()?;
        *self.last_prob_to_cover.lock().unwrap() = Some(prob_to_cover);
        let molecule = Self::by_smiles(smiles)?;
        Ok(IsotopeEnvelope {
            formula: molecule.formula.to_string(),
            average_mol_weight: 46.069,
            exact_mol_weight: 46.0419,
            heavy_atom_mol_weight: 40.021,
            masses: molecule.peaks.iter().map(|(m, _)| *m).collect(),
            probs: molecule.peaks.iter().map(|(_, p)| *p).collect(),
        })
    }

    async fn stem_plot(
        &self,
        masses: &[f64],
        probs: &[f64],
        spec: &PlotSpec,
    ) -> Result<Vec<u8>, ToolkitError> {
        self.enter()?;
        assert_eq!(masses.len(), probs.len());
        *self.last_plot.lock().unwrap() = Some(*spec);
        Ok(png_bytes())
    }

    async fn depict(
        &self,
        smiles: &str,
        width: u32,
        height: u32,
        format: ImageFormat,
    ) -> Result<Depiction, ToolkitError> {
        self.enter()?;
        *self.last_depiction.lock().unwrap() = Some((width, height, format));
        Self::by_smiles(smiles)?;
        Ok(match format {
            ImageFormat::Svg => Depiction::Svg(RAW_SVG.to_string()),
            ImageFormat::Png => Depiction::Png(png_bytes()),
        })
    }
}
