//! Normalization of connection and dataset descriptors
//!
//! Raw descriptors carry UI-facing tags and untyped parameter maps. The
//! normalizer resolves the tags against the closed type enums and checks
//! every parameter against the loader's declarative table before anything
//! is generated. Unknown keys are rejected loudly rather than dropped, and
//! required fields are never defaulted.

use serde_json::Value;

use crate::errors::GenerateError;
use crate::spec::{ConnectionSpec, DatasetSpec};
use crate::types::{ConnectionType, LoaderType};

/// A validated connection descriptor
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedConnection {
    /// In-process context
    Local,
    /// Remote Dask scheduler
    Tcp { address: String },
}

/// Resolve and validate a connection spec
pub fn resolve_connection(spec: &ConnectionSpec) -> Result<ResolvedConnection, GenerateError> {
    match ConnectionType::from_tag(&spec.conn_type)? {
        ConnectionType::Local => Ok(ResolvedConnection::Local),
        ConnectionType::Tcp => {
            let address = spec
                .address
                .as_deref()
                .filter(|a| !a.trim().is_empty())
                .ok_or_else(|| GenerateError::missing("address", "tcp connection"))?;
            Ok(ResolvedConnection::Tcp {
                address: address.to_string(),
            })
        }
    }
}

/// A dataset descriptor validated against its loader's parameter table
///
/// `args` preserves the table's argument order, so the rendered load call
/// is deterministic regardless of the order keys appeared in the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDataset {
    pub loader: LoaderType,
    pub args: Vec<(&'static str, Value)>,
}

/// Validate a dataset spec against the target loader's constructor
pub fn normalize_dataset(spec: &DatasetSpec) -> Result<NormalizedDataset, GenerateError> {
    let loader = LoaderType::from_tag(&spec.loader_type)?;
    let table = loader.params();
    let context = format!("loader {}", loader.tag());

    // Reject keys the table does not know about. Silently dropping a field
    // the loader could use would change the loaded dataset.
    for key in spec.params.keys() {
        if !table.iter().any(|p| p.ui_name == key.as_str()) {
            return Err(GenerateError::InvalidParameter {
                name: key.clone(),
                context: context.clone(),
                message: "not a recognized parameter for this loader".to_string(),
            });
        }
    }

    let mut args = Vec::with_capacity(table.len());
    for param in table {
        match spec.params.get(param.ui_name) {
            Some(value) => {
                if !param.kind.matches(value) {
                    return Err(GenerateError::wrong_type(
                        param.ui_name,
                        context.as_str(),
                        param.kind.describe(),
                    ));
                }
                args.push((param.api_name, value.clone()));
            }
            None if param.required => {
                return Err(GenerateError::missing(param.ui_name, context.as_str()));
            }
            None => {}
        }
    }

    Ok(NormalizedDataset { loader, args })
}
