//! The notebook document model and packager
//!
//! The document structure follows nbformat 4: an ordered list of cells plus
//! document metadata. All fields are fixed-order struct fields and the
//! metadata carries no timestamps or generated ids, so serializing the same
//! program twice yields byte-identical buffers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codegen::statement::Program;
use crate::errors::GenerateError;

/// An executable or markdown cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
pub enum Cell {
    Code {
        execution_count: Option<u32>,
        metadata: CellMetadata,
        outputs: Vec<Value>,
        source: Vec<String>,
    },
    Markdown {
        metadata: CellMetadata,
        source: Vec<String>,
    },
}

impl Cell {
    /// A code cell with no recorded outputs
    pub fn code(source: &str) -> Self {
        Self::Code {
            execution_count: None,
            metadata: CellMetadata::default(),
            outputs: Vec::new(),
            source: source_lines(source),
        }
    }

    /// A markdown cell
    pub fn markdown(source: &str) -> Self {
        Self::Markdown {
            metadata: CellMetadata::default(),
            source: source_lines(source),
        }
    }

    /// The cell's source joined back into one string
    pub fn source_text(&self) -> String {
        match self {
            Self::Code { source, .. } | Self::Markdown { source, .. } => source.concat(),
        }
    }

    /// Whether this is a code cell
    pub fn is_code(&self) -> bool {
        matches!(self, Self::Code { .. })
    }
}

/// Per-cell metadata (empty, present for format compliance)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CellMetadata {}

/// Document metadata identifying the execution kernel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotebookMetadata {
    pub kernelspec: KernelSpec,
    pub language_info: LanguageInfo,
}

impl Default for NotebookMetadata {
    fn default() -> Self {
        Self {
            kernelspec: KernelSpec {
                display_name: "Python 3".to_string(),
                language: "python".to_string(),
                name: "python3".to_string(),
            },
            language_info: LanguageInfo {
                name: "python".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelSpec {
    pub display_name: String,
    pub language: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub name: String,
}

/// A complete notebook document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,
    pub metadata: NotebookMetadata,
    pub nbformat: u32,
    pub nbformat_minor: u32,
}

impl Notebook {
    /// Serialize to the document buffer handed back to the caller
    pub fn to_json(&self) -> Result<String, GenerateError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a serialized document (used by tests and round-tripping)
    pub fn from_str(json: &str) -> Result<Self, GenerateError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Package an assembled program into a notebook document
///
/// One code cell per statement block, in block order; analysis blocks are
/// preceded by their markdown heading. Pure function of the program.
pub fn package(program: &Program) -> Notebook {
    let mut cells = Vec::with_capacity(program.blocks.len() + 2);
    cells.push(Cell::markdown(
        "# stemlab analysis\n\nGenerated from a saved analysis configuration.",
    ));

    for block in &program.blocks {
        if let Some(heading) = &block.heading {
            cells.push(Cell::markdown(heading));
        }
        cells.push(Cell::code(&block.source()));
    }

    Notebook {
        cells,
        metadata: NotebookMetadata::default(),
        nbformat: 4,
        nbformat_minor: 4,
    }
}

/// Split source into nbformat line format: every line keeps its trailing
/// newline except the last.
fn source_lines(source: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let parts: Vec<&str> = source.split('\n').collect();
    for (i, part) in parts.iter().enumerate() {
        if i + 1 < parts.len() {
            lines.push(format!("{}\n", part));
        } else if !part.is_empty() {
            lines.push(part.to_string());
        }
    }
    lines
}
