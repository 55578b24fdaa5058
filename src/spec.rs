//! Input payload types
//!
//! These are the plain structured inputs submitted by the UI or read back
//! from a saved configuration: a connection description, a dataset
//! description, and an ordered list of analyses. All of them are immutable
//! once parsed; generation never mutates a spec.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::GenerateError;

/// Description of the compute context to connect to
///
/// # Example
///
/// ```ignore
/// use nbgen::ConnectionSpec;
///
/// let conn = ConnectionSpec::from_str(r#"{"type": "tcp", "address": "tcp://scheduler:8786"}"#)?;
/// assert_eq!(conn.conn_type, "tcp");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSpec {
    /// Connection type tag (`local` or `tcp`, case-insensitive)
    #[serde(rename = "type")]
    pub conn_type: String,

    /// Scheduler URL for `tcp` connections
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ConnectionSpec {
    /// A local, in-process connection
    pub fn local() -> Self {
        Self {
            conn_type: "local".to_string(),
            address: None,
        }
    }

    /// A TCP connection to a remote scheduler
    pub fn tcp(address: impl Into<String>) -> Self {
        Self {
            conn_type: "tcp".to_string(),
            address: Some(address.into()),
        }
    }

    /// Parse from a JSON string
    pub fn from_str(json: &str) -> Result<Self, GenerateError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Description of the dataset to load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSpec {
    /// Loader tag (`HDF5`, `RAW`, ...)
    #[serde(rename = "type")]
    pub loader_type: String,

    /// Loader-specific parameters
    pub params: Map<String, Value>,
}

impl DatasetSpec {
    /// Parse from a JSON string
    pub fn from_str(json: &str) -> Result<Self, GenerateError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse from a JSON value
    pub fn from_value(value: Value) -> Result<Self, GenerateError> {
        Ok(serde_json::from_value(value)?)
    }
}

/// One analysis to run against the dataset
///
/// The order of `AnalysisSpec` entries in a request defines both the order
/// of the generated statements and the numbering used to keep duplicate
/// analyses apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSpec {
    /// Analysis tag (`CENTER_OF_MASS`, `APPLY_RING_MASK`, ...)
    #[serde(rename = "analysisType")]
    pub analysis_type: String,

    /// UI-schema parameters, translated by the registry
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl AnalysisSpec {
    /// Parse from a JSON string
    pub fn from_str(json: &str) -> Result<Self, GenerateError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// The full notebook-generation payload as submitted by the web client
///
/// The connection description arrives wrapped in an extra `connection`
/// object, mirroring the client's connect request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotebookRequest {
    pub connection: ConnectionWrapper,
    pub dataset: DatasetSpec,
    #[serde(rename = "analysis")]
    pub analyses: Vec<AnalysisSpec>,
    #[serde(default)]
    pub save: bool,
}

/// The client-side nesting of the connection description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionWrapper {
    pub connection: ConnectionSpec,
}

impl NotebookRequest {
    /// Parse from a JSON string
    pub fn from_str(json: &str) -> Result<Self, GenerateError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse from a JSON value
    pub fn from_value(value: Value) -> Result<Self, GenerateError> {
        Ok(serde_json::from_value(value)?)
    }

    /// The unwrapped connection spec
    pub fn connection(&self) -> &ConnectionSpec {
        &self.connection.connection
    }
}
