//! Typed input record for one product/outlet observation.
//!
//! [`FeatureRecord`] carries the raw form values exactly as captured:
//! categorical fields keep their human-readable labels, numeric fields keep
//! their native types. Encoding to the model's numeric layout happens in
//! [`crate::encoding`]; nothing here touches I/O or process state.

use crate::error::{Error, Result};

/// Name of the predicted column.
pub const TARGET_COLUMN: &str = "Item_Outlet_Sales";

/// Canonical column names, in the exact order the model consumes them.
pub const FEATURE_COLUMNS: [&str; 11] = [
    "Item_Identifier",
    "Item_Weight",
    "Item_Fat_Content",
    "Item_Visibility",
    "Item_Type",
    "Item_MRP",
    "Outlet_Identifier",
    "Outlet_Establishment_Year",
    "Outlet_Size",
    "Outlet_Location_Type",
    "Outlet_Type",
];

/// Inclusive bounds for `item_weight` (kilograms).
pub const ITEM_WEIGHT_BOUNDS: (f32, f32) = (1.0, 50.0);
/// Inclusive bounds for `item_visibility` (display-area fraction).
pub const ITEM_VISIBILITY_BOUNDS: (f32, f32) = (0.0, 1.0);
/// Inclusive bounds for the `item_type` category code.
pub const ITEM_TYPE_BOUNDS: (u32, u32) = (0, 50);
/// Inclusive bounds for `item_mrp` (maximum retail price).
pub const ITEM_MRP_BOUNDS: (f32, f32) = (1.0, 5000.0);
/// Inclusive bounds for `outlet_establishment_year`.
pub const OUTLET_YEAR_BOUNDS: (u32, u32) = (1900, 2025);
/// Inclusive bounds for the `outlet_type` category code.
pub const OUTLET_TYPE_BOUNDS: (u32, u32) = (0, 10);

/// One product/outlet observation, as captured from an input form.
///
/// Categorical fields (`item_fat_content`, `outlet_size`,
/// `outlet_location_type`) hold labels from the encoding tables in
/// [`crate::encoding`]; `item_type` and `outlet_type` arrive pre-coded as
/// small integers. The record is a transient value type: build one per
/// request, encode it, drop it.
///
/// # Example
///
/// ```
/// use pronosticar::features::FeatureRecord;
///
/// let record = FeatureRecord {
///     item_mrp: 249.81,
///     outlet_size: "Small".to_string(),
///     ..FeatureRecord::default()
/// };
/// assert!(record.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    /// Numeric product identifier.
    pub item_identifier: u32,
    /// Product weight in kilograms.
    pub item_weight: f32,
    /// Fat content label ("Low Fat", "Regular", "High").
    pub item_fat_content: String,
    /// Fraction of display area allocated to the product.
    pub item_visibility: f32,
    /// Product category code.
    pub item_type: u32,
    /// Maximum retail price.
    pub item_mrp: f32,
    /// Numeric outlet identifier.
    pub outlet_identifier: u32,
    /// Year the outlet opened.
    pub outlet_establishment_year: u32,
    /// Outlet size label ("Small", "Medium", "High", "Other").
    pub outlet_size: String,
    /// Location tier label ("Tier 1", "Tier 2", "Tier 3").
    pub outlet_location_type: String,
    /// Outlet kind code (grocery, supermarket types).
    pub outlet_type: u32,
}

impl Default for FeatureRecord {
    /// The stock form values: a 12.85 kg regular-fat item at MRP 150.0 in a
    /// medium, Tier 2 outlet established in 1998.
    fn default() -> Self {
        Self {
            item_identifier: 100,
            item_weight: 12.85,
            item_fat_content: "Regular".to_string(),
            item_visibility: 0.0575,
            item_type: 8,
            item_mrp: 150.0,
            outlet_identifier: 5,
            outlet_establishment_year: 1998,
            outlet_size: "Medium".to_string(),
            outlet_location_type: "Tier 2".to_string(),
            outlet_type: 1,
        }
    }
}

impl FeatureRecord {
    /// Checks every numeric field against its permitted interval.
    ///
    /// Fields are checked in column order and the first violation wins.
    /// Values are never clamped or coerced; an out-of-range input is the
    /// caller's to correct.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] naming the field, the offending value,
    /// and the permitted interval.
    pub fn validate(&self) -> Result<()> {
        check_f32("Item_Weight", self.item_weight, ITEM_WEIGHT_BOUNDS)?;
        check_f32("Item_Visibility", self.item_visibility, ITEM_VISIBILITY_BOUNDS)?;
        check_u32("Item_Type", self.item_type, ITEM_TYPE_BOUNDS)?;
        check_f32("Item_MRP", self.item_mrp, ITEM_MRP_BOUNDS)?;
        check_u32(
            "Outlet_Establishment_Year",
            self.outlet_establishment_year,
            OUTLET_YEAR_BOUNDS,
        )?;
        check_u32("Outlet_Type", self.outlet_type, OUTLET_TYPE_BOUNDS)?;
        Ok(())
    }
}

fn check_f32(field: &'static str, value: f32, (min, max): (f32, f32)) -> Result<()> {
    if value.is_nan() || value < min || value > max {
        return Err(Error::OutOfRange {
            field,
            value: f64::from(value),
            min: f64::from(min),
            max: f64::from(max),
        });
    }
    Ok(())
}

fn check_u32(field: &'static str, value: u32, (min, max): (u32, u32)) -> Result<()> {
    if value < min || value > max {
        return Err(Error::OutOfRange {
            field,
            value: f64::from(value),
            min: f64::from(min),
            max: f64::from(max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_matches_stock_form() {
        let r = FeatureRecord::default();
        assert_eq!(r.item_identifier, 100);
        assert_eq!(r.item_weight, 12.85);
        assert_eq!(r.item_fat_content, "Regular");
        assert_eq!(r.item_visibility, 0.0575);
        assert_eq!(r.item_type, 8);
        assert_eq!(r.item_mrp, 150.0);
        assert_eq!(r.outlet_identifier, 5);
        assert_eq!(r.outlet_establishment_year, 1998);
        assert_eq!(r.outlet_size, "Medium");
        assert_eq!(r.outlet_location_type, "Tier 2");
        assert_eq!(r.outlet_type, 1);
    }

    #[test]
    fn test_default_record_validates() {
        assert!(FeatureRecord::default().validate().is_ok());
    }

    #[test]
    fn test_weight_below_range_rejected() {
        let r = FeatureRecord {
            item_weight: 0.5,
            ..FeatureRecord::default()
        };
        match r.validate() {
            Err(Error::OutOfRange { field, value, .. }) => {
                assert_eq!(field, "Item_Weight");
                assert!((value - 0.5).abs() < 1e-9);
            }
            other => panic!("expected OutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_weight_bounds_inclusive() {
        let low = FeatureRecord {
            item_weight: 1.0,
            ..FeatureRecord::default()
        };
        let high = FeatureRecord {
            item_weight: 50.0,
            ..FeatureRecord::default()
        };
        assert!(low.validate().is_ok());
        assert!(high.validate().is_ok());
    }

    #[test]
    fn test_visibility_above_one_rejected() {
        let r = FeatureRecord {
            item_visibility: 1.01,
            ..FeatureRecord::default()
        };
        match r.validate() {
            Err(Error::OutOfRange { field, .. }) => assert_eq!(field, "Item_Visibility"),
            other => panic!("expected OutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_visibility_zero_accepted() {
        let r = FeatureRecord {
            item_visibility: 0.0,
            ..FeatureRecord::default()
        };
        assert!(r.validate().is_ok());
    }

    #[test]
    fn test_item_type_above_range_rejected() {
        let r = FeatureRecord {
            item_type: 51,
            ..FeatureRecord::default()
        };
        match r.validate() {
            Err(Error::OutOfRange { field, min, max, .. }) => {
                assert_eq!(field, "Item_Type");
                assert_eq!(min, 0.0);
                assert_eq!(max, 50.0);
            }
            other => panic!("expected OutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_mrp_above_range_rejected() {
        let r = FeatureRecord {
            item_mrp: 5000.5,
            ..FeatureRecord::default()
        };
        match r.validate() {
            Err(Error::OutOfRange { field, .. }) => assert_eq!(field, "Item_MRP"),
            other => panic!("expected OutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_year_bounds_inclusive() {
        let oldest = FeatureRecord {
            outlet_establishment_year: 1900,
            ..FeatureRecord::default()
        };
        let newest = FeatureRecord {
            outlet_establishment_year: 2025,
            ..FeatureRecord::default()
        };
        assert!(oldest.validate().is_ok());
        assert!(newest.validate().is_ok());
        let stale = FeatureRecord {
            outlet_establishment_year: 1899,
            ..FeatureRecord::default()
        };
        assert!(stale.validate().is_err());
    }

    #[test]
    fn test_outlet_type_above_range_rejected() {
        let r = FeatureRecord {
            outlet_type: 11,
            ..FeatureRecord::default()
        };
        match r.validate() {
            Err(Error::OutOfRange { field, .. }) => assert_eq!(field, "Outlet_Type"),
            other => panic!("expected OutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_nan_weight_rejected() {
        let r = FeatureRecord {
            item_weight: f32::NAN,
            ..FeatureRecord::default()
        };
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_first_violation_wins_in_column_order() {
        // Both weight and outlet_type are bad; weight is earlier in the layout.
        let r = FeatureRecord {
            item_weight: 0.0,
            outlet_type: 99,
            ..FeatureRecord::default()
        };
        match r.validate() {
            Err(Error::OutOfRange { field, .. }) => assert_eq!(field, "Item_Weight"),
            other => panic!("expected OutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_feature_columns_order() {
        assert_eq!(FEATURE_COLUMNS.len(), 11);
        assert_eq!(FEATURE_COLUMNS[0], "Item_Identifier");
        assert_eq!(FEATURE_COLUMNS[2], "Item_Fat_Content");
        assert_eq!(FEATURE_COLUMNS[10], "Outlet_Type");
    }
}
