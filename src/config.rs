use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::data::filter::{Bounds, FilterCriteria, Selection};
use crate::data::model::{CategoryColumn, Dataset};
use crate::error::{Error, Result};

/// Path of an optional JSON configuration file.
pub const CONFIG_ENV: &str = "CAR_INSIGHTS_CONFIG";
/// Overrides [`Config::data_path`].
pub const DATA_ENV: &str = "CAR_INSIGHTS_DATA";

/// Startup settings: where the listings live and what the dashboard shows
/// before the user touches any filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_path: PathBuf,
    /// How many brands (alphabetically first) are preselected; 0 selects all.
    pub default_brand_count: usize,
    /// Initial inclusive year range; `null` leaves years unconstrained.
    pub year_range: Option<[i32; 2]>,
    pub show_raw_table: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("car_price_prediction_.csv"),
            default_brand_count: 3,
            year_range: Some([2010, 2023]),
            show_raw_table: false,
        }
    }
}

impl Config {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults, then the file named by [`CONFIG_ENV`], then [`DATA_ENV`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_ENV) {
            Some(path) => {
                info!("reading configuration from {path}");
                Self::from_json_file(Path::new(&path))?
            }
            None => Self::default(),
        };
        if let Some(data) = lookup(DATA_ENV) {
            config.data_path = PathBuf::from(data);
        }
        Ok(config)
    }

    /// The criteria the dashboard opens with.
    pub fn initial_criteria(&self, dataset: &Dataset) -> FilterCriteria {
        let brands = if self.default_brand_count == 0 {
            Selection::All
        } else {
            Selection::from_multiselect(
                dataset
                    .distinct(CategoryColumn::Brand)
                    .into_iter()
                    .take(self.default_brand_count),
            )
        };
        // Like a slider, the configured range cannot leave the data's years.
        let years = match (self.year_range, dataset.year_extent()) {
            (Some([min, max]), Some((first, last))) => {
                let (min, max) = (min.min(max), min.max(max));
                Bounds::new(min.clamp(first, last), max.clamp(first, last))
            }
            (Some([min, max]), None) => Bounds::new(min, max),
            (None, _) => Bounds::unbounded(),
        };
        FilterCriteria {
            brands,
            years,
            ..FilterCriteria::default()
        }
    }
}
