use thiserror::Error;

use crate::entities::patient::PatientRecord;

/// Feature frame construction errors
#[derive(Debug, Error, PartialEq)]
pub enum FrameError {
    /// The classifier asked for a column the patient record does not carry
    #[error("Unknown feature column '{0}'")]
    UnknownColumn(String),

    /// A column was requested twice
    #[error("Duplicate feature column '{0}'")]
    DuplicateColumn(String),
}

/// Single-row labeled table of patient features
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    columns: Vec<String>,
    values: Vec<f64>,
}

impl FeatureFrame {
    /// Build a row from a patient record in exactly the given column order
    pub fn build(record: &PatientRecord, columns: &[String]) -> Result<Self, FrameError> {
        let mut values = Vec::with_capacity(columns.len());
        for (idx, column) in columns.iter().enumerate() {
            if columns[..idx].contains(column) {
                return Err(FrameError::DuplicateColumn(column.clone()));
            }
            let value = record
                .field_value(column)
                .ok_or_else(|| FrameError::UnknownColumn(column.clone()))?;
            values.push(value);
        }

        Ok(Self {
            columns: columns.to_vec(),
            values,
        })
    }

    /// Column labels, in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row values, aligned with [`columns`](Self::columns)
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::patient::MODEL_FEATURE_COLUMNS;
    use crate::testing::sample_patient;

    fn model_columns() -> Vec<String> {
        MODEL_FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_frame_follows_requested_order() {
        let frame = FeatureFrame::build(&sample_patient(), &model_columns()).unwrap();

        assert_eq!(frame.columns(), model_columns().as_slice());
        assert_eq!(
            frame.values(),
            &[55.0, 1.0, 140.0, 90.0, 2.0, 1.0, 1.0, 0.0, 0.0, 28.0]
        );
        assert!(!frame.columns().iter().any(|c| c == "relatives"));
    }

    #[test]
    fn test_frame_with_reordered_columns() {
        let columns = vec!["bmi".to_string(), "age".to_string()];
        let frame = FeatureFrame::build(&sample_patient(), &columns).unwrap();
        assert_eq!(frame.values(), &[28.0, 55.0]);
    }

    #[test]
    fn test_unknown_and_duplicate_columns() {
        let err = FeatureFrame::build(&sample_patient(), &["height".to_string()]).unwrap_err();
        assert_eq!(err, FrameError::UnknownColumn("height".to_string()));

        let err = FeatureFrame::build(&sample_patient(), &["age".to_string(), "age".to_string()]).unwrap_err();
        assert_eq!(err, FrameError::DuplicateColumn("age".to_string()));
    }
}
