use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use car_insights::Listing;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_u64() % (hi - lo + 1) as u64) as i64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// (brand, models, new-car base price)
const CATALOG: &[(&str, &[&str], f64)] = &[
    ("Audi", &["A3", "A4", "Q5", "Q7"], 42_000.0),
    ("BMW", &["3 Series", "5 Series", "X3", "X5"], 45_000.0),
    ("Ford", &["Fiesta", "Focus", "Mustang", "Explorer"], 28_000.0),
    ("Honda", &["Civic", "Accord", "CR-V", "Fit"], 26_000.0),
    ("Mercedes", &["C-Class", "E-Class", "GLA", "GLC"], 48_000.0),
    ("Tesla", &["Model 3", "Model S", "Model X", "Model Y"], 55_000.0),
    ("Toyota", &["Corolla", "Camry", "RAV4", "Prius"], 27_000.0),
];

const FUELS: &[&str] = &["Petrol", "Diesel", "Hybrid", "Electric"];
const TRANSMISSIONS: &[&str] = &["Manual", "Automatic"];
const CONDITIONS: &[&str] = &["New", "Like New", "Used"];
const CURRENT_YEAR: i64 = 2024;

fn generate_listing(rng: &mut SimpleRng) -> Listing {
    let (brand, models, base) = CATALOG[(rng.next_u64() % CATALOG.len() as u64) as usize];
    let year = rng.range(2000, CURRENT_YEAR);
    let age = (CURRENT_YEAR - year) as f64;
    let condition = if age < 1.0 { "New" } else { rng.pick(CONDITIONS) };
    let mileage = if condition == "New" {
        rng.range(0, 500)
    } else {
        ((age * 12_000.0 + rng.gauss(0.0, 8_000.0)).max(1_000.0)) as i64
    };
    let fuel = if brand == "Tesla" { "Electric" } else { rng.pick(FUELS) };
    let engine_size = if fuel == "Electric" {
        0.0
    } else {
        (rng.range(10, 50) as f64) / 10.0
    };

    let depreciation = 0.9f64.powf(age);
    let price = (base * depreciation - mileage as f64 * 0.05 + rng.gauss(0.0, 2_000.0))
        .max(1_500.0);

    Listing {
        brand: brand.to_string(),
        model: Some(rng.pick(models).to_string()),
        year: year as i32,
        engine_size,
        fuel_type: fuel.to_string(),
        transmission: rng.pick(TRANSMISSIONS).to_string(),
        mileage,
        condition: Some(condition.to_string()),
        price: (price * 100.0).round() / 100.0,
    }
}

fn write_csv(path: &str, listings: &[Listing]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record([
        "Car ID",
        "Brand",
        "Year",
        "Engine Size",
        "Fuel Type",
        "Transmission",
        "Mileage",
        "Condition",
        "Price",
        "Model",
    ])?;
    for (id, l) in listings.iter().enumerate() {
        writer.write_record([
            (id + 1).to_string(),
            l.brand.clone(),
            l.year.to_string(),
            l.engine_size.to_string(),
            l.fuel_type.clone(),
            l.transmission.clone(),
            l.mileage.to_string(),
            l.condition.clone().unwrap_or_default(),
            l.price.to_string(),
            l.model.clone().unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, listings: &[Listing]) -> Result<()> {
    let text = |f: fn(&Listing) -> &str| {
        StringArray::from(listings.iter().map(f).collect::<Vec<_>>())
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("brand", DataType::Utf8, false),
        Field::new("model", DataType::Utf8, true),
        Field::new("year", DataType::Int64, false),
        Field::new("engine_size", DataType::Float64, false),
        Field::new("fuel_type", DataType::Utf8, false),
        Field::new("transmission", DataType::Utf8, false),
        Field::new("mileage", DataType::Int64, false),
        Field::new("condition", DataType::Utf8, true),
        Field::new("price", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(text(|l| l.brand.as_str())),
            Arc::new(StringArray::from(
                listings.iter().map(|l| l.model.as_deref()).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                listings.iter().map(|l| l.year as i64).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                listings.iter().map(|l| l.engine_size).collect::<Vec<_>>(),
            )),
            Arc::new(text(|l| l.fuel_type.as_str())),
            Arc::new(text(|l| l.transmission.as_str())),
            Arc::new(Int64Array::from(
                listings.iter().map(|l| l.mileage).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                listings.iter().map(|l| l.condition.as_deref()).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                listings.iter().map(|l| l.price).collect::<Vec<_>>(),
            )),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let listings: Vec<Listing> = (0..2_500).map(|_| generate_listing(&mut rng)).collect();

    write_csv("sample_listings.csv", &listings)?;
    write_parquet("sample_listings.parquet", &listings)?;

    println!(
        "Wrote {} listings to sample_listings.csv and sample_listings.parquet",
        listings.len()
    );
    Ok(())
}
