//! Label-to-code tables and the fixed-order feature vector.
//!
//! The encoding tables are immutable static data. They are part of the model
//! contract: the artifact's weights were fitted against exactly these codes,
//! so the tables travel with the code rather than with configuration. Lookup
//! is exact and case-sensitive; an unknown label is an error, never a default
//! code.
//!
//! # Example
//!
//! ```
//! use pronosticar::encoding::{encode, FEATURE_COUNT};
//! use pronosticar::features::FeatureRecord;
//!
//! let vector = encode(&FeatureRecord::default()).unwrap();
//! assert_eq!(vector.as_slice().len(), FEATURE_COUNT);
//! assert_eq!(
//!     vector.to_array(),
//!     [100.0, 12.85, 1.0, 0.0575, 8.0, 150.0, 5.0, 1998.0, 1.0, 1.0, 1.0]
//! );
//! ```

use crate::error::{Error, Result};
use crate::features::FeatureRecord;

/// Number of columns in the encoded layout.
pub const FEATURE_COUNT: usize = 11;

/// A named, immutable label-to-code table.
///
/// Tables are declared as `static` items below; nothing constructs one at
/// runtime.
#[derive(Debug)]
pub struct CodeTable {
    field: &'static str,
    entries: &'static [(&'static str, f32)],
}

impl CodeTable {
    /// Numeric code for `label`.
    ///
    /// Matching is exact: whole string, case-sensitive, no trimming.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLabel`] listing the accepted labels when
    /// `label` is not in the table.
    pub fn code(&self, label: &str) -> Result<f32> {
        for (name, code) in self.entries {
            if *name == label {
                return Ok(*code);
            }
        }
        Err(Error::InvalidLabel {
            field: self.field,
            label: label.to_string(),
            expected: self.expected_list(),
        })
    }

    /// Accepted labels in table order.
    #[must_use]
    pub fn labels(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(name, _)| *name).collect()
    }

    /// Field these codes belong to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        self.field
    }

    fn expected_list(&self) -> String {
        let quoted: Vec<String> = self
            .entries
            .iter()
            .map(|(name, _)| format!("{name:?}"))
            .collect();
        quoted.join(", ")
    }
}

/// Fat content labels and their model codes.
pub static ITEM_FAT_CONTENT: CodeTable = CodeTable {
    field: "Item_Fat_Content",
    entries: &[
        ("Low Fat", 0.0), // code 0
        ("Regular", 1.0), // code 1
        ("High", 2.0),    // code 2
    ],
};

/// Outlet size labels and their model codes.
pub static OUTLET_SIZE: CodeTable = CodeTable {
    field: "Outlet_Size",
    entries: &[
        ("Small", 0.0),  // code 0
        ("Medium", 1.0), // code 1
        ("High", 2.0),   // code 2
        ("Other", 3.0),  // code 3
    ],
};

/// Location tier labels and their model codes.
pub static OUTLET_LOCATION_TYPE: CodeTable = CodeTable {
    field: "Outlet_Location_Type",
    entries: &[
        ("Tier 1", 0.0), // code 0
        ("Tier 2", 1.0), // code 1
        ("Tier 3", 2.0), // code 2
    ],
};

/// Encoded feature row in the model's column order.
///
/// Only [`encode`] and [`FeatureVector::from_array`] construct one, so a
/// value of this type always has exactly [`FEATURE_COUNT`] columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f32; FEATURE_COUNT]);

impl FeatureVector {
    /// Wraps an already-ordered row. Intended for tests and benchmarks;
    /// production paths go through [`encode`].
    #[must_use]
    pub fn from_array(values: [f32; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    /// Columns as a slice, in model order.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Columns as an owned array, in model order.
    #[must_use]
    pub fn to_array(&self) -> [f32; FEATURE_COUNT] {
        self.0
    }
}

impl std::ops::Index<usize> for FeatureVector {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a FeatureVector {
    type Item = &'a f32;
    type IntoIter = std::slice::Iter<'a, f32>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Encodes a record into the model's numeric layout.
///
/// Pure and deterministic: the same record always yields the same vector.
/// Numeric fields pass through unchanged (integers become `f32` exactly at
/// these magnitudes); categorical labels go through their tables. Output
/// order is fixed:
///
/// ```text
/// [item_identifier, item_weight, fat_code, item_visibility, item_type,
///  item_mrp, outlet_identifier, outlet_establishment_year, size_code,
///  location_code, outlet_type]
/// ```
///
/// # Errors
///
/// Range violations surface first, in column order, as
/// [`Error::OutOfRange`]; then label lookups run in column order and an
/// unknown label surfaces as [`Error::InvalidLabel`].
pub fn encode(record: &FeatureRecord) -> Result<FeatureVector> {
    record.validate()?;
    let fat = ITEM_FAT_CONTENT.code(&record.item_fat_content)?;
    let size = OUTLET_SIZE.code(&record.outlet_size)?;
    let tier = OUTLET_LOCATION_TYPE.code(&record.outlet_location_type)?;
    Ok(FeatureVector([
        record.item_identifier as f32,
        record.item_weight,
        fat,
        record.item_visibility,
        record.item_type as f32,
        record.item_mrp,
        record.outlet_identifier as f32,
        record.outlet_establishment_year as f32,
        size,
        tier,
        record.outlet_type as f32,
    ]))
}

impl FeatureRecord {
    /// Method form of [`encode`].
    ///
    /// # Errors
    ///
    /// Same failure modes as [`encode`].
    pub fn encode(&self) -> Result<FeatureVector> {
        encode(self)
    }
}
