//! Code generation from validated specs to a notebook document
//!
//! This module turns resolved inputs into a typed statement program and
//! packages it as a serialized notebook buffer. Generation is synchronous,
//! deterministic, and free of side effects; every failure is reported
//! before any document exists.

mod notebook;
mod save;
mod statement;

pub use notebook::{package, Cell, Notebook, NotebookMetadata};
pub use save::save_statements;
pub use statement::{assemble, Block, BlockKind, Program, Statement};

use crate::errors::GenerateError;
use crate::normalize::{normalize_dataset, resolve_connection};
use crate::registry::resolve_analysis;
use crate::spec::{AnalysisSpec, ConnectionSpec, DatasetSpec};

/// Options controlling which optional cells are emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotebookOptions {
    /// Append per-channel save statements after each analysis
    pub save: bool,
    /// Emit a plot cell per analysis
    pub plot: bool,
}

impl Default for NotebookOptions {
    fn default() -> Self {
        Self {
            save: false,
            plot: true,
        }
    }
}

/// Notebook generator for one request
pub struct Generator<'a> {
    connection: &'a ConnectionSpec,
    dataset: &'a DatasetSpec,
    analyses: &'a [AnalysisSpec],
    options: NotebookOptions,
}

impl<'a> Generator<'a> {
    /// Create a generator with default options
    pub fn new(
        connection: &'a ConnectionSpec,
        dataset: &'a DatasetSpec,
        analyses: &'a [AnalysisSpec],
    ) -> Self {
        Self {
            connection,
            dataset,
            analyses,
            options: NotebookOptions::default(),
        }
    }

    /// Override the generation options
    pub fn with_options(mut self, options: NotebookOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve the inputs and assemble the statement program
    ///
    /// All registry and normalization failures surface here; a returned
    /// program is guaranteed to satisfy the binding invariants.
    pub fn assemble_program(&self) -> Result<Program, GenerateError> {
        let connection = resolve_connection(self.connection)?;
        let dataset = normalize_dataset(self.dataset)?;
        let calls = self
            .analyses
            .iter()
            .map(resolve_analysis)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            loader = dataset.loader.tag(),
            analyses = calls.len(),
            save = self.options.save,
            "assembling notebook program"
        );

        Ok(assemble(&connection, &dataset, &calls, &self.options))
    }

    /// Generate the serialized notebook buffer
    pub fn generate(&self) -> Result<String, GenerateError> {
        let program = self.assemble_program()?;
        package(&program).to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local() -> ConnectionSpec {
        ConnectionSpec::local()
    }

    fn hdf5() -> DatasetSpec {
        DatasetSpec::from_str(
            r#"{"type": "HDF5", "params": {"path": "scan.h5", "ds_path": "data"}}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_generate_empty_analysis_list() {
        let conn = local();
        let ds = hdf5();
        let buffer = Generator::new(&conn, &ds, &[]).generate().unwrap();

        let notebook = Notebook::from_str(&buffer).unwrap();
        let code: Vec<String> = notebook
            .cells
            .iter()
            .filter(|c| c.is_code())
            .map(|c| c.source_text())
            .collect();

        assert_eq!(code.len(), 3);
        assert!(code[1].contains("ctx = Context()"));
        assert!(code[2].contains("ctx.load"));
    }

    #[test]
    fn test_generation_fails_before_any_document() {
        let conn = local();
        let ds = hdf5();
        let analyses = vec![AnalysisSpec::from_str(
            r#"{"analysisType": "UNKNOWN_THING", "parameters": {}}"#,
        )
        .unwrap()];

        let result = Generator::new(&conn, &ds, &analyses).generate();
        assert!(matches!(
            result,
            Err(GenerateError::UnknownAnalysisType(t)) if t == "UNKNOWN_THING"
        ));
    }

    #[test]
    fn test_assembled_program_verifies() {
        let conn = local();
        let ds = hdf5();
        let analyses = vec![
            AnalysisSpec::from_str(
                r#"{"analysisType": "APPLY_RING_MASK",
                    "parameters": {"cx": 8, "cy": 8, "ri": 2.0, "ro": 5.0}}"#,
            )
            .unwrap(),
            AnalysisSpec::from_str(r#"{"analysisType": "SUM_FRAMES"}"#).unwrap(),
        ];

        let program = Generator::new(&conn, &ds, &analyses)
            .with_options(NotebookOptions {
                save: true,
                plot: true,
            })
            .assemble_program()
            .unwrap();

        program.verify_bindings().unwrap();
    }
}
