//! The analysis registry
//!
//! Resolves a UI-supplied analysis spec against the closed set of analysis
//! variants and translates its parameter map into the argument list the
//! platform constructor expects. Parameter-name translation (`r` →
//! `mask_radius`) is data in the per-variant tables, not control flow.

use serde_json::Value;

use crate::errors::GenerateError;
use crate::spec::AnalysisSpec;
use crate::types::{py_literal, AnalysisType};

/// A resolved analysis invocation, ready for statement assembly
///
/// `args` holds constructor arguments in table order with their validated
/// values; rendering to text happens only when the call expression is
/// requested.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisCall {
    pub analysis: AnalysisType,
    pub args: Vec<(&'static str, Value)>,
}

impl AnalysisCall {
    /// The analysis type's fixed output channels
    pub fn channels(&self) -> &'static [&'static str] {
        self.analysis.channels()
    }

    /// Render the constructor call expression against a dataset binding
    pub fn call_expression(&self, dataset_binding: &str) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(format!("dataset={}", dataset_binding));
        for (name, value) in &self.args {
            parts.push(format!("{}={}", name, py_literal(value)));
        }
        format!(
            "ctx.{}({})",
            self.analysis.constructor(),
            parts.join(", ")
        )
    }
}

/// Resolve an analysis spec against the registry
///
/// Fails with `UnknownAnalysisType` for unregistered tags,
/// `UnrecognizedParameter` for keys that are neither consumed nor on the
/// variant's ignore list, and `InvalidParameter` for missing or ill-typed
/// values.
pub fn resolve_analysis(spec: &AnalysisSpec) -> Result<AnalysisCall, GenerateError> {
    let analysis = AnalysisType::from_tag(&spec.analysis_type)?;
    let table = analysis.params();
    let context = format!("analysis {}", analysis.tag());

    for key in spec.parameters.keys() {
        if table.iter().any(|p| p.ui_name == key.as_str()) {
            continue;
        }
        if analysis.ignored_params().contains(&key.as_str()) {
            tracing::debug!(analysis = analysis.tag(), parameter = %key, "skipping ignored parameter");
            continue;
        }
        return Err(GenerateError::unrecognized(key.as_str(), analysis.tag()));
    }

    let mut args = Vec::with_capacity(table.len());
    for param in table {
        match spec.parameters.get(param.ui_name) {
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

    Ok(AnalysisCall { analysis, args })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn com_spec() -> AnalysisSpec {
        AnalysisSpec::from_str(
            r#"{
                "analysisType": "CENTER_OF_MASS",
                "parameters": {"shape": "com", "cx": 0, "cy": 0, "r": 8}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_com_translates_names() {
        let call = resolve_analysis(&com_spec()).unwrap();

        assert_eq!(call.analysis, AnalysisType::CenterOfMass);
        assert_eq!(
            call.call_expression("ds"),
            "ctx.create_com_analysis(dataset=ds, cx=0, cy=0, mask_radius=8)"
        );
    }

    #[test]
    fn test_resolve_com_drops_shape() {
        // `shape` is on the ignore list and must not reach the constructor
        let call = resolve_analysis(&com_spec()).unwrap();
        assert!(!call.call_expression("ds").contains("shape"));
    }

    #[test]
    fn test_resolve_point_renames_center() {
        let spec = AnalysisSpec::from_str(
            r#"{"analysisType": "APPLY_POINT_SELECTOR", "parameters": {"cx": 4, "cy": 7}}"#,
        )
        .unwrap();

        let call = resolve_analysis(&spec).unwrap();
        assert_eq!(
            call.call_expression("ds"),
            "ctx.create_point_analysis(dataset=ds, x=4, y=7)"
        );
    }

    #[test]
    fn test_resolve_sum_without_parameters() {
        let spec = AnalysisSpec::from_str(r#"{"analysisType": "SUM_FRAMES"}"#).unwrap();
        let call = resolve_analysis(&spec).unwrap();
        assert_eq!(call.call_expression("ds"), "ctx.create_sum_analysis(dataset=ds)");
        assert_eq!(call.channels(), &["intensity"]);
    }

    #[test]
    fn test_reject_unknown_analysis_type() {
        let spec = AnalysisSpec::from_str(r#"{"analysisType": "FFT_MASK"}"#).unwrap();
        assert!(matches!(
            resolve_analysis(&spec),
            Err(GenerateError::UnknownAnalysisType(t)) if t == "FFT_MASK"
        ));
    }

    #[test]
    fn test_reject_unrecognized_parameter() {
        let spec = AnalysisSpec::from_str(
            r#"{"analysisType": "CENTER_OF_MASS", "parameters": {"cx": 0, "cy": 0, "sigma": 2}}"#,
        )
        .unwrap();
        assert!(matches!(
            resolve_analysis(&spec),
            Err(GenerateError::UnrecognizedParameter { name, analysis })
                if name == "sigma" && analysis == "CENTER_OF_MASS"
        ));
    }

    #[test]
    fn test_reject_missing_required_parameter() {
        let spec = AnalysisSpec::from_str(
            r#"{"analysisType": "APPLY_RING_MASK", "parameters": {"cx": 8, "cy": 8, "ri": 2}}"#,
        )
        .unwrap();
        assert!(matches!(
            resolve_analysis(&spec),
            Err(GenerateError::InvalidParameter { name, .. }) if name == "ro"
        ));
    }

    #[test]
    fn test_reject_ill_typed_parameter() {
        let spec = AnalysisSpec::from_str(
            r#"{"analysisType": "PICK_FRAME", "parameters": {"x": 1.5, "y": 2}}"#,
        )
        .unwrap();
        assert!(matches!(
            resolve_analysis(&spec),
            Err(GenerateError::InvalidParameter { name, message, .. })
                if name == "x" && message.contains("integer")
        ));
    }

    #[test]
    fn test_optional_parameters_forwarded() {
        let spec = AnalysisSpec::from_str(
            r#"{
                "analysisType": "CENTER_OF_MASS",
                "parameters": {"cx": 32, "cy": 32, "flip_y": true, "scan_rotation": 88.7}
            }"#,
        )
        .unwrap();

        let call = resolve_analysis(&spec).unwrap();
        assert_eq!(
            call.call_expression("ds"),
            "ctx.create_com_analysis(dataset=ds, cx=32, cy=32, flip_y=True, scan_rotation=88.7)"
        );
    }
}
