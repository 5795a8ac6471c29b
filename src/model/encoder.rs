//! Categorical label encoding

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maps the labels of one categorical feature to integer codes and back.
///
/// Codes come from the category configuration and are contiguous `0..n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    field: String,
    codes: BTreeMap<String, u32>,
    labels: Vec<String>,
}

impl LabelEncoder {
    /// Build an encoder for `field` from a label → code table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the table is empty or its codes are not
    /// exactly `0..n`.
    pub fn from_table(field: impl Into<String>, table: &BTreeMap<String, u32>) -> Result<Self> {
        let field = field.into();
        if table.is_empty() {
            return Err(Error::Config(format!("{field}: no categories defined")));
        }
        let mut labels = vec![None; table.len()];
        for (label, &code) in table {
            let slot = labels.get_mut(code as usize).ok_or_else(|| {
                Error::Config(format!("{field}: code {code} for '{label}' is out of range"))
            })?;
            if slot.replace(label.clone()).is_some() {
                return Err(Error::Config(format!("{field}: duplicate code {code}")));
            }
        }
        let labels = labels.into_iter().flatten().collect();
        Ok(Self {
            field,
            codes: table.clone(),
            labels,
        })
    }

    /// Feature name this encoder belongs to
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Number of known labels
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether no labels are known
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Known labels in code order
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.labels
    }

    /// Whether `label` is known (exact or case-insensitive match)
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.lookup(label).is_some()
    }

    /// Code for `label`.
    ///
    /// Exact matches win; otherwise a case-insensitive match is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCategory`] listing the known labels.
    pub fn transform(&self, label: &str) -> Result<u32> {
        self.lookup(label).ok_or_else(|| Error::UnknownCategory {
            field: self.field.clone(),
            label: label.to_string(),
            known: self.labels.join(", "),
        })
    }

    /// Label for `code`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Prediction`] if the code was never assigned.
    pub fn inverse_transform(&self, code: u32) -> Result<&str> {
        self.labels
            .get(code as usize)
            .map(String::as_str)
            .ok_or_else(|| {
                Error::Prediction(format!("{}: no category with code {code}", self.field))
            })
    }

    fn lookup(&self, label: &str) -> Option<u32> {
        let label = label.trim();
        self.codes.get(label).copied().or_else(|| {
            self.codes
                .iter()
                .find(|(known, _)| known.eq_ignore_ascii_case(label))
                .map(|(_, &code)| code)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> LabelEncoder {
        let table: BTreeMap<String, u32> = [("Epoxy", 0), ("Phenolic", 1), ("Polyester", 2)]
            .into_iter()
            .map(|(l, c)| (l.to_string(), c))
            .collect();
        LabelEncoder::from_table("Polymer_Matrix", &table).unwrap()
    }

    #[test]
    fn test_transform_and_inverse() {
        let enc = encoder();
        assert_eq!(enc.transform("Phenolic").unwrap(), 1);
        assert_eq!(enc.inverse_transform(1).unwrap(), "Phenolic");
        assert_eq!(enc.classes(), ["Epoxy", "Phenolic", "Polyester"]);
    }

    #[test]
    fn test_case_insensitive_fallback() {
        assert_eq!(encoder().transform(" epoxy ").unwrap(), 0);
    }

    #[test]
    fn test_unknown_label() {
        let err = encoder().transform("Polystyrene").unwrap_err();
        match err {
            Error::UnknownCategory { field, label, known } => {
                assert_eq!(field, "Polymer_Matrix");
                assert_eq!(label, "Polystyrene");
                assert_eq!(known, "Epoxy, Phenolic, Polyester");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unassigned_code() {
        assert!(encoder().inverse_transform(3).is_err());
    }

    #[test]
    fn test_rejects_gapped_codes() {
        let table: BTreeMap<String, u32> = [("A".to_string(), 0), ("B".to_string(), 2)].into();
        assert!(matches!(
            LabelEncoder::from_table("Filler_Type", &table),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_codes() {
        let table: BTreeMap<String, u32> = [("A".to_string(), 0), ("B".to_string(), 0)].into();
        assert!(LabelEncoder::from_table("Filler_Type", &table).is_err());
    }
}
