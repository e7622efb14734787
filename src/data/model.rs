use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CellValue – a single raw cell as read from a source file
// ---------------------------------------------------------------------------

/// A dynamically-typed cell, before it is bound to a [`Listing`] field.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Null,
}

impl CellValue {
    /// Guess the type of a textual cell (CSV has no types of its own).
    pub fn guess(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        CellValue::Text(s.to_string())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Text(s) => s.trim().parse().ok(),
            CellValue::Null => None,
        }
    }

    /// Integers only; a float is accepted when it has no fractional part
    /// (Pandas writes integer columns with NaNs as floats).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            CellValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Any non-null cell rendered as text.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Text(s) if s.trim().is_empty() => None,
            CellValue::Text(s) => Some(s.trim().to_string()),
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Column vocabulary
// ---------------------------------------------------------------------------

/// Numeric attributes of a listing, eligible for means and correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericColumn {
    Year,
    EngineSize,
    Mileage,
    Price,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 4] = [
        NumericColumn::Year,
        NumericColumn::EngineSize,
        NumericColumn::Mileage,
        NumericColumn::Price,
    ];

    /// Canonical column name.
    pub fn name(self) -> &'static str {
        match self {
            NumericColumn::Year => "year",
            NumericColumn::EngineSize => "engine_size",
            NumericColumn::Mileage => "mileage",
            NumericColumn::Price => "price",
        }
    }
}

impl fmt::Display for NumericColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Categorical attributes of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryColumn {
    Brand,
    Model,
    FuelType,
    Transmission,
    Condition,
}

impl CategoryColumn {
    pub const ALL: [CategoryColumn; 5] = [
        CategoryColumn::Brand,
        CategoryColumn::Model,
        CategoryColumn::FuelType,
        CategoryColumn::Transmission,
        CategoryColumn::Condition,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CategoryColumn::Brand => "brand",
            CategoryColumn::Model => "model",
            CategoryColumn::FuelType => "fuel_type",
            CategoryColumn::Transmission => "transmission",
            CategoryColumn::Condition => "condition",
        }
    }
}

impl fmt::Display for CategoryColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Listing – one row of the source table
// ---------------------------------------------------------------------------

/// A single vehicle listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub brand: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub year: i32,
    /// Liters.
    pub engine_size: f64,
    pub fuel_type: String,
    pub transmission: String,
    pub mileage: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    pub price: f64,
}

impl Listing {
    pub fn numeric(&self, column: NumericColumn) -> f64 {
        match column {
            NumericColumn::Year => self.year as f64,
            NumericColumn::EngineSize => self.engine_size,
            NumericColumn::Mileage => self.mileage as f64,
            NumericColumn::Price => self.price,
        }
    }

    /// `None` when an optional column is absent for this row.
    pub fn category(&self, column: CategoryColumn) -> Option<&str> {
        match column {
            CategoryColumn::Brand => Some(&self.brand),
            CategoryColumn::Model => self.model.as_deref(),
            CategoryColumn::FuelType => Some(&self.fuel_type),
            CategoryColumn::Transmission => Some(&self.transmission),
            CategoryColumn::Condition => self.condition.as_deref(),
        }
    }

    fn hash_into<H: Hasher>(&self, state: &mut H) {
        self.brand.hash(state);
        self.model.hash(state);
        self.year.hash(state);
        self.engine_size.to_bits().hash(state);
        self.fuel_type.hash(state);
        self.transmission.hash(state);
        self.mileage.hash(state);
        self.condition.hash(state);
        self.price.to_bits().hash(state);
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed column indices.
///
/// Immutable once built; share it behind an `Arc` between recomputations.
#[derive(Debug, Clone)]
pub struct Dataset {
    listings: Vec<Listing>,
    /// For each categorical column the sorted set of distinct values.
    unique_values: BTreeMap<CategoryColumn, BTreeSet<String>>,
    fingerprint: u64,
}

impl Dataset {
    /// Build column indices from in-memory listings; the fingerprint is
    /// derived from the listings themselves.
    pub fn from_listings(listings: Vec<Listing>) -> Self {
        let mut hasher = DefaultHasher::new();
        listings.len().hash(&mut hasher);
        for listing in &listings {
            listing.hash_into(&mut hasher);
        }
        let fingerprint = hasher.finish();
        Self::with_fingerprint(listings, fingerprint)
    }

    /// Build column indices, tagging the dataset with the identity of the
    /// source it was read from.
    pub fn with_fingerprint(listings: Vec<Listing>, fingerprint: u64) -> Self {
        let mut unique_values: BTreeMap<CategoryColumn, BTreeSet<String>> = BTreeMap::new();
        for listing in &listings {
            for column in CategoryColumn::ALL {
                if let Some(value) = listing.category(column) {
                    unique_values
                        .entry(column)
                        .or_default()
                        .insert(value.to_string());
                }
            }
        }
        Dataset {
            listings,
            unique_values,
            fingerprint,
        }
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    /// Number of listings.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Content identity of the source this dataset was built from.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Sorted distinct values of a categorical column (empty if the
    /// column never appears).
    pub fn distinct(&self, column: CategoryColumn) -> BTreeSet<String> {
        self.unique_values.get(&column).cloned().unwrap_or_default()
    }

    pub fn contains_value(&self, column: CategoryColumn, value: &str) -> bool {
        self.unique_values
            .get(&column)
            .is_some_and(|vals| vals.contains(value))
    }

    /// Smallest and largest model year, `None` for an empty dataset.
    pub fn year_extent(&self) -> Option<(i32, i32)> {
        let min = self.listings.iter().map(|l| l.year).min()?;
        let max = self.listings.iter().map(|l| l.year).max()?;
        Some((min, max))
    }
}

/// Content identity of raw source bytes.
pub fn fingerprint_bytes(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}
