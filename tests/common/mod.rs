//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::io::Write;

use car_insights::{Dataset, Listing};
use tempfile::NamedTempFile;

pub const BRANDS: [&str; 3] = ["Toyota", "Ford", "BMW"];
pub const FUELS: [&str; 4] = ["Petrol", "Diesel", "Hybrid", "Electric"];
pub const TRANSMISSIONS: [&str; 2] = ["Manual", "Automatic"];

/// Deterministic listing `i` of the 100-row fixture.
pub fn listing(i: usize) -> Listing {
    Listing {
        brand: BRANDS[i % 3].to_string(),
        model: Some(format!("M{}", i % 5)),
        year: 2008 + ((i * 7) % 16) as i32,
        engine_size: 1.0 + (i % 4) as f64 * 0.5,
        fuel_type: FUELS[i % 4].to_string(),
        transmission: TRANSMISSIONS[(i / 3) % 2].to_string(),
        mileage: 5_000 + ((i * 3_911) % 150_000) as i64,
        condition: Some(if i % 7 == 0 { "New" } else { "Used" }.to_string()),
        price: 5_000.0 + ((i * 137) % 40) as f64 * 500.0,
    }
}

/// 100 listings over Toyota, Ford and BMW.
pub fn hundred_listings() -> Dataset {
    Dataset::from_listings((0..100).map(listing).collect())
}

/// A `.csv` temp file with English, space-separated headers.
pub fn csv_fixture(listings: &[Listing]) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(
        file,
        "Car ID,Brand,Year,Engine Size,Fuel Type,Transmission,Mileage,Condition,Price,Model"
    )
    .unwrap();
    for (id, l) in listings.iter().enumerate() {
        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{},{}",
            id + 1,
            l.brand,
            l.year,
            l.engine_size,
            l.fuel_type,
            l.transmission,
            l.mileage,
            l.condition.as_deref().unwrap_or(""),
            l.price,
            l.model.as_deref().unwrap_or(""),
        )
        .unwrap();
    }
    file.flush().unwrap();
    file
}
