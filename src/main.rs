use anyhow::{bail, Context, Result};
use log::error;

use car_insights::{Config, DatasetCache, LoadError, Session};

fn main() -> Result<()> {
    env_logger::init();

    let mut config = Config::from_env().context("reading configuration")?;
    if let Some(path) = std::env::args_os().nth(1) {
        config.data_path = path.into();
    }

    let mut cache = DatasetCache::new();
    let dataset = match cache.get_or_load(&config.data_path) {
        Ok(dataset) => dataset,
        Err(LoadError::NotFound { path }) => {
            error!("data file {} is missing", path.display());
            bail!(
                "Data file '{}' not found. Place it next to the application or set CAR_INSIGHTS_DATA.",
                path.display()
            );
        }
        Err(e) => {
            return Err(e).with_context(|| format!("loading {}", config.data_path.display()));
        }
    };

    let criteria = config.initial_criteria(&dataset);
    let mut session = Session::with_criteria(dataset, criteria);
    session.set_show_raw_table(config.show_raw_table);

    let report = session.report();
    println!("{}", report.to_json_pretty().context("serialising report")?);
    Ok(())
}
