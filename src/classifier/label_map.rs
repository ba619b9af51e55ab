// Output-index mapping table
// Declares how raw model output indices fold onto the semantic label set,
// validated once at load time instead of patched per prediction.

use thiserror::Error;

use crate::classifier::types::PoseClass;

#[derive(Debug, Error)]
pub enum LabelMapError {
    #[error("mapping table covers {table} indices but the model produces {model}")]
    ArityMismatch { table: usize, model: usize },

    #[error("mapping table is empty")]
    Empty,
}

/// Mapping from raw model output index to semantic label.
///
/// The first three entries always follow the artifact's fixed label order.
/// Models with a wider output space declare an explicit fold for each extra
/// index; an argmax beyond the table (only possible on a malformed output)
/// clamps to the final entry rather than surfacing an out-of-range id.
#[derive(Debug, Clone)]
pub struct LabelMap {
    targets: Vec<PoseClass>,
}

impl LabelMap {
    /// Identity table for the standard three-label artifact
    pub fn standard() -> Self {
        LabelMap {
            targets: PoseClass::LABELS.to_vec(),
        }
    }

    /// Standard table extended with folds for extra model output indices.
    /// `folds[i]` is the label for raw index `3 + i`.
    pub fn with_folds(folds: &[PoseClass]) -> Self {
        let mut targets = PoseClass::LABELS.to_vec();
        targets.extend_from_slice(folds);
        LabelMap { targets }
    }

    /// Number of raw indices the table covers
    pub fn arity(&self) -> usize {
        self.targets.len()
    }

    /// Check the table against the model's declared output arity.
    /// Called once when the adapter is constructed.
    pub fn validate(&self, model_arity: usize) -> Result<(), LabelMapError> {
        if self.targets.is_empty() {
            return Err(LabelMapError::Empty);
        }
        if self.targets.len() != model_arity {
            return Err(LabelMapError::ArityMismatch {
                table: self.targets.len(),
                model: model_arity,
            });
        }
        Ok(())
    }

    /// Resolve a raw output index to its semantic label
    pub fn resolve(&self, raw_index: usize) -> PoseClass {
        self.targets
            .get(raw_index)
            .or_else(|| self.targets.last())
            .copied()
            .unwrap_or(PoseClass::Relax)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_is_identity() {
        let map = LabelMap::standard();
        assert_eq!(map.arity(), 3);
        assert_eq!(map.resolve(0), PoseClass::Relax);
        assert_eq!(map.resolve(1), PoseClass::Move);
        assert_eq!(map.resolve(2), PoseClass::Curl);
    }

    #[test]
    fn test_folds_extend_the_table() {
        // A model with five outputs folds the two extras onto Move and Curl
        let map = LabelMap::with_folds(&[PoseClass::Move, PoseClass::Curl]);
        assert_eq!(map.arity(), 5);
        assert_eq!(map.resolve(3), PoseClass::Move);
        assert_eq!(map.resolve(4), PoseClass::Curl);
    }

    #[test]
    fn test_out_of_range_clamps_to_last_entry() {
        let map = LabelMap::standard();
        assert_eq!(map.resolve(7), PoseClass::Curl);
    }

    #[test]
    fn test_validate_rejects_arity_mismatch() {
        let map = LabelMap::standard();
        assert!(map.validate(3).is_ok());
        assert!(matches!(
            map.validate(4),
            Err(LabelMapError::ArityMismatch { table: 3, model: 4 })
        ));
    }
}
