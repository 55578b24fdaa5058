//! Emission of save-to-disk statements

use crate::codegen::statement::Statement;
use crate::types::py_str;

/// Emit one `np.save` statement per channel, in channel-set order
///
/// File names are prefixed with the result binding, which already carries
/// the per-invocation index for duplicate analyses, so results from
/// distinct analyses of the same type never overwrite each other.
pub fn save_statements(result_binding: &str, channels: &[&str]) -> Vec<Statement> {
    channels
        .iter()
        .map(|channel| Statement {
            source: format!(
                "np.save({}, {}[{}].raw_data)",
                py_str(&format!("{}_{}.npy", result_binding, channel)),
                result_binding,
                py_str(channel),
            ),
            reads: vec![result_binding.to_string()],
            writes: None,
        })
        .collect()
}
