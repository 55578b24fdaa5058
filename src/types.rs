//! Closed type enums and the declarative parameter tables
//!
//! Analysis and loader dispatch is a closed set of variants, each carrying
//! its own static parameter table. Adding an analysis or loader type is a
//! data change: a new variant plus its table rows.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::GenerateError;

// ═══════════════════════════════════════════════════════════════════════════════
// Connection Type
// ═══════════════════════════════════════════════════════════════════════════════

/// The type of compute context the generated code connects to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    /// In-process context on the local machine
    Local,
    /// Remote Dask scheduler reached over TCP
    Tcp,
}

impl ConnectionType {
    /// Resolve a UI-supplied tag. The web client sends upper-case tags,
    /// saved configurations lower-case ones.
    pub fn from_tag(tag: &str) -> Result<Self, GenerateError> {
        match tag.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "tcp" => Ok(Self::Tcp),
            _ => Err(GenerateError::UnsupportedConnectionType(tag.to_string())),
        }
    }
}

impl std::fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Tcp => write!(f, "tcp"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Parameter Tables
// ═══════════════════════════════════════════════════════════════════════════════

/// The semantic type a parameter value must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Any JSON number
    Number,
    /// A JSON integer
    Integer,
    /// A JSON string
    String,
    /// A JSON boolean
    Bool,
    /// A JSON array of non-negative integers, rendered as a Python tuple
    Shape,
}

impl ParamKind {
    /// Human-readable name used in error messages
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Number => "a number",
            Self::Integer => "an integer",
            Self::String => "a string",
            Self::Bool => "a boolean",
            Self::Shape => "an array of integers",
        }
    }

    /// Check that a JSON value matches this kind
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::String => value.is_string(),
            Self::Bool => value.is_boolean(),
            Self::Shape => value
                .as_array()
                .is_some_and(|items| items.iter().all(|v| v.is_u64())),
        }
    }
}

/// One row of a parameter translation table: how a UI-supplied key maps onto
/// the underlying API's argument name
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    /// Key as supplied by the UI payload
    pub ui_name: &'static str,
    /// Argument name expected by the platform constructor
    pub api_name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
}

impl ParamSpec {
    const fn required(ui_name: &'static str, api_name: &'static str, kind: ParamKind) -> Self {
        Self {
            ui_name,
            api_name,
            kind,
            required: true,
        }
    }

    const fn optional(ui_name: &'static str, api_name: &'static str, kind: ParamKind) -> Self {
        Self {
            ui_name,
            api_name,
            kind,
            required: false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Loader Types
// ═══════════════════════════════════════════════════════════════════════════════

/// Built-in dataset loaders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoaderType {
    Hdf5,
    Raw,
    Npy,
    Mib,
    Blo,
    Seq,
    Empad,
}

impl LoaderType {
    /// Resolve a UI-supplied loader tag
    pub fn from_tag(tag: &str) -> Result<Self, GenerateError> {
        match tag.to_ascii_uppercase().as_str() {
            "HDF5" => Ok(Self::Hdf5),
            "RAW" => Ok(Self::Raw),
            "NPY" => Ok(Self::Npy),
            "MIB" => Ok(Self::Mib),
            "BLO" => Ok(Self::Blo),
            "SEQ" => Ok(Self::Seq),
            "EMPAD" => Ok(Self::Empad),
            _ => Err(GenerateError::UnknownLoaderType(tag.to_string())),
        }
    }

    /// Canonical tag passed to `ctx.load(...)`
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Hdf5 => "HDF5",
            Self::Raw => "RAW",
            Self::Npy => "NPY",
            Self::Mib => "MIB",
            Self::Blo => "BLO",
            Self::Seq => "SEQ",
            Self::Empad => "EMPAD",
        }
    }

    /// The loader's parameter table, in constructor argument order
    pub fn params(&self) -> &'static [ParamSpec] {
        use ParamKind::*;
        const HDF5: &[ParamSpec] = &[
            ParamSpec::required("path", "path", String),
            ParamSpec::required("ds_path", "ds_path", String),
            ParamSpec::optional("tileshape", "tileshape", Shape),
            ParamSpec::optional("nav_shape", "nav_shape", Shape),
            ParamSpec::optional("sig_shape", "sig_shape", Shape),
        ];
        const RAW: &[ParamSpec] = &[
            ParamSpec::required("path", "path", String),
            ParamSpec::required("dtype", "dtype", String),
            ParamSpec::required("nav_shape", "nav_shape", Shape),
            ParamSpec::required("sig_shape", "sig_shape", Shape),
        ];
        const NPY: &[ParamSpec] = &[ParamSpec::required("path", "path", String)];
        const MIB: &[ParamSpec] = &[
            ParamSpec::required("path", "path", String),
            ParamSpec::optional("nav_shape", "nav_shape", Shape),
        ];
        const BLO: &[ParamSpec] = &[ParamSpec::required("path", "path", String)];
        const SEQ: &[ParamSpec] = &[
            ParamSpec::required("path", "path", String),
            ParamSpec::optional("nav_shape", "nav_shape", Shape),
        ];
        const EMPAD: &[ParamSpec] = &[
            ParamSpec::required("path", "path", String),
            ParamSpec::optional("nav_shape", "nav_shape", Shape),
        ];
        match self {
            Self::Hdf5 => HDF5,
            Self::Raw => RAW,
            Self::Npy => NPY,
            Self::Mib => MIB,
            Self::Blo => BLO,
            Self::Seq => SEQ,
            Self::Empad => EMPAD,
        }
    }
}

impl std::fmt::Display for LoaderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Analysis Types
// ═══════════════════════════════════════════════════════════════════════════════

/// Built-in analysis types
///
/// Tags follow the UI payload convention (`CENTER_OF_MASS` etc.). Each
/// variant carries its constructor name, a short label used for bindings and
/// file names, a parameter translation table, an explicit ignore list, and
/// its fixed channel set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisType {
    CenterOfMass,
    ApplyRingMask,
    ApplyDiskMask,
    ApplyPointSelector,
    SumFrames,
    SdFrames,
    PickFrame,
}

impl AnalysisType {
    /// Resolve a UI-supplied analysis tag
    pub fn from_tag(tag: &str) -> Result<Self, GenerateError> {
        match tag {
            "CENTER_OF_MASS" => Ok(Self::CenterOfMass),
            "APPLY_RING_MASK" => Ok(Self::ApplyRingMask),
            "APPLY_DISK_MASK" => Ok(Self::ApplyDiskMask),
            "APPLY_POINT_SELECTOR" => Ok(Self::ApplyPointSelector),
            "SUM_FRAMES" => Ok(Self::SumFrames),
            "SD_FRAMES" => Ok(Self::SdFrames),
            "PICK_FRAME" => Ok(Self::PickFrame),
            _ => Err(GenerateError::UnknownAnalysisType(tag.to_string())),
        }
    }

    /// The UI tag for this variant
    pub fn tag(&self) -> &'static str {
        match self {
            Self::CenterOfMass => "CENTER_OF_MASS",
            Self::ApplyRingMask => "APPLY_RING_MASK",
            Self::ApplyDiskMask => "APPLY_DISK_MASK",
            Self::ApplyPointSelector => "APPLY_POINT_SELECTOR",
            Self::SumFrames => "SUM_FRAMES",
            Self::SdFrames => "SD_FRAMES",
            Self::PickFrame => "PICK_FRAME",
        }
    }

    /// Name of the platform constructor invoked on the context
    pub fn constructor(&self) -> &'static str {
        match self {
            Self::CenterOfMass => "create_com_analysis",
            Self::ApplyRingMask => "create_ring_analysis",
            Self::ApplyDiskMask => "create_disk_analysis",
            Self::ApplyPointSelector => "create_point_analysis",
            Self::SumFrames => "create_sum_analysis",
            Self::SdFrames => "create_std_analysis",
            Self::PickFrame => "create_pick_analysis",
        }
    }

    /// Short label used for variable bindings and save-file prefixes
    pub fn label(&self) -> &'static str {
        match self {
            Self::CenterOfMass => "com",
            Self::ApplyRingMask => "ring",
            Self::ApplyDiskMask => "disk",
            Self::ApplyPointSelector => "point",
            Self::SumFrames => "sum",
            Self::SdFrames => "stddev",
            Self::PickFrame => "pick",
        }
    }

    /// Parameter translation table, in constructor argument order
    pub fn params(&self) -> &'static [ParamSpec] {
        use ParamKind::*;
        const CENTER_OF_MASS: &[ParamSpec] = &[
            ParamSpec::required("cx", "cx", Number),
            ParamSpec::required("cy", "cy", Number),
            ParamSpec::optional("r", "mask_radius", Number),
            ParamSpec::optional("ri", "mask_radius_inner", Number),
            ParamSpec::optional("flip_y", "flip_y", Bool),
            ParamSpec::optional("scan_rotation", "scan_rotation", Number),
        ];
        const APPLY_RING_MASK: &[ParamSpec] = &[
            ParamSpec::required("cx", "cx", Number),
            ParamSpec::required("cy", "cy", Number),
            ParamSpec::required("ri", "ri", Number),
            ParamSpec::required("ro", "ro", Number),
        ];
        const APPLY_DISK_MASK: &[ParamSpec] = &[
            ParamSpec::required("cx", "cx", Number),
            ParamSpec::required("cy", "cy", Number),
            ParamSpec::required("r", "r", Number),
        ];
        const APPLY_POINT_SELECTOR: &[ParamSpec] = &[
            ParamSpec::required("cx", "x", Number),
            ParamSpec::required("cy", "y", Number),
        ];
        const PICK_FRAME: &[ParamSpec] = &[
            ParamSpec::required("x", "x", Integer),
            ParamSpec::required("y", "y", Integer),
        ];
        match self {
            Self::CenterOfMass => CENTER_OF_MASS,
            Self::ApplyRingMask => APPLY_RING_MASK,
            Self::ApplyDiskMask => APPLY_DISK_MASK,
            Self::ApplyPointSelector => APPLY_POINT_SELECTOR,
            Self::SumFrames | Self::SdFrames => &[],
            Self::PickFrame => PICK_FRAME,
        }
    }

    /// UI keys that are accepted but deliberately not forwarded
    ///
    /// `shape` is the UI's sub-type discriminator for the mask family; `roi`
    /// selections are not reproducible from a saved configuration.
    pub fn ignored_params(&self) -> &'static [&'static str] {
        match self {
            Self::CenterOfMass
            | Self::ApplyRingMask
            | Self::ApplyDiskMask
            | Self::ApplyPointSelector => &["shape"],
            Self::SumFrames | Self::SdFrames => &["roi"],
            Self::PickFrame => &[],
        }
    }

    /// The fixed, ordered set of output channels this analysis produces
    pub fn channels(&self) -> &'static [&'static str] {
        match self {
            Self::CenterOfMass => &["field", "magnitude", "divergence", "curl", "x", "y"],
            Self::ApplyRingMask
            | Self::ApplyDiskMask
            | Self::ApplyPointSelector
            | Self::SumFrames
            | Self::SdFrames
            | Self::PickFrame => &["intensity"],
        }
    }

    /// The channel shown in the generated plot cell
    pub fn display_channel(&self) -> &'static str {
        match self {
            Self::CenterOfMass => "magnitude",
            _ => "intensity",
        }
    }

    /// Human-readable name used for notebook headings
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::CenterOfMass => "Center of mass",
            Self::ApplyRingMask => "Ring mask",
            Self::ApplyDiskMask => "Disk mask",
            Self::ApplyPointSelector => "Point selector",
            Self::SumFrames => "Sum of frames",
            Self::SdFrames => "Standard deviation of frames",
            Self::PickFrame => "Pick frame",
        }
    }
}

impl std::fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Python Literal Rendering
// ═══════════════════════════════════════════════════════════════════════════════

/// Render a validated JSON value as a Python literal
///
/// Values reaching this point have already been checked against a
/// `ParamKind`, so every JSON shape that can occur here has a rendering.
pub fn py_literal(value: &Value) -> String {
    match value {
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                if f.fract() == 0.0 && f.is_finite() {
                    format!("{:.1}", f)
                } else {
                    format!("{}", f)
                }
            }
        }
        Value::String(s) => py_str(s),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(py_literal).collect();
            if parts.len() == 1 {
                format!("({},)", parts[0])
            } else {
                format!("({})", parts.join(", "))
            }
        }
        Value::Null => "None".to_string(),
        Value::Object(_) => "None".to_string(),
    }
}

/// Render a string as a double-quoted Python literal
pub fn py_str(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_connection_tag_case_insensitive() {
        assert_eq!(ConnectionType::from_tag("local").unwrap(), ConnectionType::Local);
        assert_eq!(ConnectionType::from_tag("LOCAL").unwrap(), ConnectionType::Local);
        assert_eq!(ConnectionType::from_tag("TCP").unwrap(), ConnectionType::Tcp);
        assert!(matches!(
            ConnectionType::from_tag("k8s"),
            Err(GenerateError::UnsupportedConnectionType(t)) if t == "k8s"
        ));
    }

    #[test]
    fn test_loader_tag_roundtrip() {
        for tag in ["HDF5", "RAW", "NPY", "MIB", "BLO", "SEQ", "EMPAD"] {
            assert_eq!(LoaderType::from_tag(tag).unwrap().tag(), tag);
        }
        assert!(matches!(
            LoaderType::from_tag("DM4"),
            Err(GenerateError::UnknownLoaderType(_))
        ));
    }

    #[test]
    fn test_analysis_tag_roundtrip() {
        for tag in [
            "CENTER_OF_MASS",
            "APPLY_RING_MASK",
            "APPLY_DISK_MASK",
            "APPLY_POINT_SELECTOR",
            "SUM_FRAMES",
            "SD_FRAMES",
            "PICK_FRAME",
        ] {
            assert_eq!(AnalysisType::from_tag(tag).unwrap().tag(), tag);
        }
    }

    #[test]
    fn test_com_channel_set_order() {
        assert_eq!(
            AnalysisType::CenterOfMass.channels(),
            &["field", "magnitude", "divergence", "curl", "x", "y"]
        );
    }

    #[test]
    fn test_param_kind_matches() {
        assert!(ParamKind::Number.matches(&json!(0)));
        assert!(ParamKind::Number.matches(&json!(2.5)));
        assert!(!ParamKind::Number.matches(&json!("8")));
        assert!(ParamKind::Integer.matches(&json!(8)));
        assert!(!ParamKind::Integer.matches(&json!(8.5)));
        assert!(ParamKind::Shape.matches(&json!([32, 32])));
        assert!(!ParamKind::Shape.matches(&json!([32, "x"])));
    }

    #[test]
    fn test_py_literal_rendering() {
        assert_eq!(py_literal(&json!(0)), "0");
        assert_eq!(py_literal(&json!(8)), "8");
        assert_eq!(py_literal(&json!(2.5)), "2.5");
        assert_eq!(py_literal(&json!(2.0)), "2.0");
        assert_eq!(py_literal(&json!(true)), "True");
        assert_eq!(py_literal(&json!([16, 16, 128, 128])), "(16, 16, 128, 128)");
        assert_eq!(py_literal(&json!([128])), "(128,)");
        assert_eq!(py_literal(&json!("data/scan.h5")), "\"data/scan.h5\"");
    }

    #[test]
    fn test_py_str_escaping() {
        assert_eq!(py_str(r#"C:\data\scan "A""#), r#""C:\\data\\scan \"A\"""#);
    }
}
