//! Notebook generation for the stemlab detector-data analysis platform
//!
//! This crate translates a declarative analysis configuration — a data
//! connection, a dataset descriptor, and an ordered list of analyses — into
//! an executable notebook document. Running the generated document connects
//! to a compute context, loads the dataset, runs each analysis, and
//! (optionally) saves every output channel to disk as a `.npy` array whose
//! contents match calling the platform API directly.
//!
//! # Overview
//!
//! Generation is a fixed pipeline:
//!
//! 1. **Normalization** ([`normalize`]) resolves the connection and dataset
//!    descriptors against the closed loader set and validates every
//!    parameter.
//! 2. **Registry resolution** ([`registry`]) maps each analysis onto its
//!    constructor, translating UI parameter names to API argument names
//!    (`r` → `mask_radius`) from per-type tables.
//! 3. **Assembly** ([`codegen`]) builds a typed statement program — connect,
//!    load, one construct/run pair per analysis, optional plot and save
//!    statements — with explicit binding tracking.
//! 4. **Packaging** renders the program into an nbformat 4 document and
//!    serializes it.
//!
//! The pipeline is stateless, synchronous, and deterministic: the same
//! request always produces a byte-identical buffer, and every failure is
//! raised before any document exists.
//!
//! # Quick Start
//!
//! ```ignore
//! use nbgen::{generate_notebook, AnalysisSpec, ConnectionSpec, DatasetSpec};
//!
//! let conn = ConnectionSpec::local();
//! let dataset = DatasetSpec::from_str(r#"{
//!     "type": "HDF5",
//!     "params": {"path": "scan.h5", "ds_path": "data"}
//! }"#)?;
//! let analyses = vec![AnalysisSpec::from_str(r#"{
//!     "analysisType": "CENTER_OF_MASS",
//!     "parameters": {"shape": "com", "cx": 0, "cy": 0, "r": 8}
//! }"#)?];
//!
//! let buffer = generate_notebook(&conn, &dataset, &analyses, true)?;
//! std::fs::write("analysis.ipynb", buffer)?;
//! ```
//!
//! # Error Handling
//!
//! All entry points return `Result<_, GenerateError>`. Errors are
//! non-retriable: generation is deterministic, so a retry with the same
//! input reproduces the same failure.

pub mod codegen;
pub mod errors;
pub mod normalize;
pub mod registry;
pub mod spec;
pub mod types;

pub use codegen::{Generator, Notebook, NotebookOptions};
pub use errors::GenerateError;
pub use normalize::{normalize_dataset, resolve_connection, NormalizedDataset};
pub use registry::{resolve_analysis, AnalysisCall};
pub use spec::{AnalysisSpec, ConnectionSpec, DatasetSpec, NotebookRequest};
pub use types::{AnalysisType, ConnectionType, LoaderType};

/// Generate a notebook buffer with default plotting and the given save mode
pub fn generate_notebook(
    connection: &ConnectionSpec,
    dataset: &DatasetSpec,
    analyses: &[AnalysisSpec],
    save: bool,
) -> Result<String, GenerateError> {
    let options = NotebookOptions {
        save,
        ..NotebookOptions::default()
    };
    generate_with_options(connection, dataset, analyses, options)
}

/// Generate a notebook buffer with explicit options
pub fn generate_with_options(
    connection: &ConnectionSpec,
    dataset: &DatasetSpec,
    analyses: &[AnalysisSpec],
    options: NotebookOptions,
) -> Result<String, GenerateError> {
    Generator::new(connection, dataset, analyses)
        .with_options(options)
        .generate()
}

/// Generate a notebook buffer from the web client's JSON payload
pub fn generate_from_json(request_json: &str) -> Result<String, GenerateError> {
    let request = NotebookRequest::from_str(request_json)?;
    generate_notebook(
        request.connection(),
        &request.dataset,
        &request.analyses,
        request.save,
    )
}
