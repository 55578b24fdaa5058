//! Typed statement representation and the statement assembler
//!
//! The assembler produces an ordered sequence of statement blocks with
//! explicit binding information. Correctness of the plan (ordering, no
//! forward references, unique bindings) is separated from correctness of
//! the rendered text: statements carry their reads and writes, and the
//! program can be checked before it is packaged into a document.

use std::collections::HashSet;

use crate::codegen::save::save_statements;
use crate::codegen::NotebookOptions;
use crate::normalize::{NormalizedDataset, ResolvedConnection};
use crate::registry::AnalysisCall;
use crate::types::{py_literal, py_str};

/// One generated statement with its binding information
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// The rendered source line(s)
    pub source: String,
    /// Bindings this statement references
    pub reads: Vec<String>,
    /// The binding this statement produces, if any
    pub writes: Option<String>,
}

impl Statement {
    /// A statement that neither reads nor writes a binding
    pub fn bare(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            reads: Vec::new(),
            writes: None,
        }
    }

    fn binding(
        source: impl Into<String>,
        reads: &[&str],
        writes: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            reads: reads.iter().map(|r| r.to_string()).collect(),
            writes: Some(writes.into()),
        }
    }
}

/// The logical group a block of statements belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Imports,
    Connect,
    LoadDataset,
    Analysis { index: usize },
    Plot { index: usize },
    Save { index: usize },
}

/// A group of statements rendered into one code cell
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    /// Markdown heading placed before the cell, if any
    pub heading: Option<String>,
    pub statements: Vec<Statement>,
}

impl Block {
    fn new(kind: BlockKind, statements: Vec<Statement>) -> Self {
        Self {
            kind,
            heading: None,
            statements,
        }
    }

    /// The block's statements joined into one source string
    pub fn source(&self) -> String {
        let lines: Vec<&str> = self.statements.iter().map(|s| s.source.as_str()).collect();
        lines.join("\n")
    }
}

/// An assembled program: ordered blocks of statements
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub blocks: Vec<Block>,
}

impl Program {
    /// Check the binding invariants: every read refers to an earlier write,
    /// and no binding is written twice.
    ///
    /// The assembler constructs programs that satisfy this by design; the
    /// check exists so tests (and callers holding a hand-built program) can
    /// verify it.
    pub fn verify_bindings(&self) -> Result<(), String> {
        let mut defined: HashSet<&str> = HashSet::new();
        for block in &self.blocks {
            for statement in &block.statements {
                for read in &statement.reads {
                    if !defined.contains(read.as_str()) {
                        return Err(format!(
                            "statement '{}' reads undefined binding '{}'",
                            statement.source, read
                        ));
                    }
                }
                if let Some(write) = &statement.writes {
                    if !defined.insert(write) {
                        return Err(format!(
                            "statement '{}' rebinds '{}'",
                            statement.source, write
                        ));
                    }
                }
            }
        }
        Ok(())
    }

}

/// Assemble the program for one generation request
pub fn assemble(
    connection: &ResolvedConnection,
    dataset: &NormalizedDataset,
    calls: &[AnalysisCall],
    options: &NotebookOptions,
) -> Program {
    let mut blocks = Vec::new();

    blocks.push(Block::new(BlockKind::Imports, import_statements(connection, options)));
    blocks.push(Block::new(BlockKind::Connect, vec![connect_statement(connection)]));
    blocks.push(Block::new(BlockKind::LoadDataset, vec![load_statement(dataset)]));

    let mut used_labels: HashSet<&'static str> = HashSet::new();
    for (index, call) in calls.iter().enumerate() {
        let label = call.analysis.label();
        // The first analysis of a type keeps the bare label; later ones of
        // the same type get the per-invocation index appended, so bindings
        // and save files never collide.
        let suffix = if used_labels.insert(label) {
            String::new()
        } else {
            format!("_{}", index)
        };
        let analysis_var = format!("{}_analysis{}", label, suffix);
        let result_var = format!("{}_result{}", label, suffix);

        let construct = Statement::binding(
            format!("{} = {}", analysis_var, call.call_expression("ds")),
            &["ctx", "ds"],
            analysis_var.clone(),
        );
        let run = Statement::binding(
            format!("{} = ctx.run({}, progress=True)", result_var, analysis_var),
            &["ctx", analysis_var.as_str()],
            result_var.clone(),
        );

        let mut block = Block::new(BlockKind::Analysis { index }, vec![construct, run]);
        block.heading = Some(format!("## {}", call.analysis.display_name()));
        blocks.push(block);

        if options.plot {
            blocks.push(Block::new(
                BlockKind::Plot { index },
                plot_statements(&result_var, call.analysis.display_channel()),
            ));
        }

        if options.save {
            blocks.push(Block::new(
                BlockKind::Save { index },
                save_statements(&result_var, call.channels()),
            ));
        }
    }

    Program { blocks }
}

fn import_statements(connection: &ResolvedConnection, options: &NotebookOptions) -> Vec<Statement> {
    let mut statements = vec![Statement::bare("import numpy as np")];
    if options.plot {
        statements.push(Statement::bare("import matplotlib.pyplot as plt"));
    }
    statements.push(Statement::bare("from stemlab.api import Context"));
    if matches!(connection, ResolvedConnection::Tcp { .. }) {
        statements.push(Statement::bare(
            "from stemlab.executor.dask import DaskJobExecutor",
        ));
    }
    statements
}

fn connect_statement(connection: &ResolvedConnection) -> Statement {
    match connection {
        ResolvedConnection::Local => Statement::binding("ctx = Context()", &[], "ctx"),
        ResolvedConnection::Tcp { address } => Statement::binding(
            format!(
                "ctx = Context(executor=DaskJobExecutor.connect({}))",
                py_str(address)
            ),
            &[],
            "ctx",
        ),
    }
}

fn load_statement(dataset: &NormalizedDataset) -> Statement {
    let mut parts = vec![py_str(dataset.loader.tag())];
    for (name, value) in &dataset.args {
        parts.push(format!("{}={}", name, py_literal(value)));
    }
    Statement::binding(
        format!("ds = ctx.load({})", parts.join(", ")),
        &["ctx"],
        "ds",
    )
}

fn plot_statements(result_binding: &str, channel: &str) -> Vec<Statement> {
    vec![
        Statement::bare("plt.figure()"),
        Statement {
            source: format!(
                "plt.imshow({}[{}].raw_data)",
                result_binding,
                py_str(channel)
            ),
            reads: vec![result_binding.to_string()],
            writes: None,
        },
        Statement::bare("plt.colorbar()"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::resolve_analysis;
    use crate::spec::AnalysisSpec;
    use crate::types::LoaderType;
    use serde_json::json;

    fn hdf5() -> NormalizedDataset {
        NormalizedDataset {
            loader: LoaderType::Hdf5,
            args: vec![("path", json!("scan.h5")), ("ds_path", json!("data"))],
        }
    }

    fn com_call() -> AnalysisCall {
        resolve_analysis(
            &AnalysisSpec::from_str(
                r#"{"analysisType": "CENTER_OF_MASS",
                    "parameters": {"shape": "com", "cx": 0, "cy": 0, "r": 8}}"#,
            )
            .unwrap(),
        )
        .unwrap()
    }

    fn quiet() -> NotebookOptions {
        NotebookOptions {
            save: false,
            plot: false,
        }
    }

    #[test]
    fn test_assemble_empty_analysis_list() {
        let program = assemble(&ResolvedConnection::Local, &hdf5(), &[], &quiet());

        let kinds: Vec<_> = program.blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![BlockKind::Imports, BlockKind::Connect, BlockKind::LoadDataset]
        );
        program.verify_bindings().unwrap();
    }

    #[test]
    fn test_assemble_connect_and_load() {
        let program = assemble(&ResolvedConnection::Local, &hdf5(), &[], &quiet());

        assert_eq!(program.blocks[1].source(), "ctx = Context()");
        assert_eq!(
            program.blocks[2].source(),
            "ds = ctx.load(\"HDF5\", path=\"scan.h5\", ds_path=\"data\")"
        );
    }

    #[test]
    fn test_assemble_tcp_connect() {
        let conn = ResolvedConnection::Tcp {
            address: "tcp://scheduler:8786".to_string(),
        };
        let program = assemble(&conn, &hdf5(), &[], &quiet());

        assert!(program.blocks[0]
            .source()
            .contains("from stemlab.executor.dask import DaskJobExecutor"));
        assert_eq!(
            program.blocks[1].source(),
            "ctx = Context(executor=DaskJobExecutor.connect(\"tcp://scheduler:8786\"))"
        );
    }

    #[test]
    fn test_assemble_analysis_block() {
        let program = assemble(&ResolvedConnection::Local, &hdf5(), &[com_call()], &quiet());

        let block = &program.blocks[3];
        assert_eq!(block.kind, BlockKind::Analysis { index: 0 });
        assert_eq!(
            block.source(),
            "com_analysis = ctx.create_com_analysis(dataset=ds, cx=0, cy=0, mask_radius=8)\n\
             com_result = ctx.run(com_analysis, progress=True)"
        );
        program.verify_bindings().unwrap();
    }

    #[test]
    fn test_duplicate_analyses_get_distinct_bindings() {
        let calls = vec![com_call(), com_call()];
        let program = assemble(&ResolvedConnection::Local, &hdf5(), &calls, &quiet());

        assert!(program.blocks[3].source().contains("com_result ="));
        assert!(program.blocks[4].source().contains("com_result_1 ="));
        program.verify_bindings().unwrap();
    }

    #[test]
    fn test_save_blocks_follow_their_analysis() {
        let options = NotebookOptions {
            save: true,
            plot: false,
        };
        let program = assemble(&ResolvedConnection::Local, &hdf5(), &[com_call()], &options);

        let kinds: Vec<_> = program.blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Imports,
                BlockKind::Connect,
                BlockKind::LoadDataset,
                BlockKind::Analysis { index: 0 },
                BlockKind::Save { index: 0 },
            ]
        );
        program.verify_bindings().unwrap();
    }

    #[test]
    fn test_verify_bindings_rejects_forward_reference() {
        let program = Program {
            blocks: vec![Block::new(
                BlockKind::Connect,
                vec![Statement {
                    source: "ctx.run(missing)".to_string(),
                    reads: vec!["missing".to_string()],
                    writes: None,
                }],
            )],
        };
        assert!(program.verify_bindings().is_err());
    }

    #[test]
    fn test_verify_bindings_rejects_rebinding() {
        let program = Program {
            blocks: vec![Block::new(
                BlockKind::Connect,
                vec![
                    Statement::binding("ctx = Context()", &[], "ctx"),
                    Statement::binding("ctx = Context()", &[], "ctx"),
                ],
            )],
        };
        assert!(program.verify_bindings().is_err());
    }
}
