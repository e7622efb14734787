use std::io::ErrorKind;
use std::path::Path;

use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use bytes::Bytes;
use log::{debug, info};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{fingerprint_bytes, CellValue, Dataset, Listing};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// On-disk layouts the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Json,
    Parquet,
}

impl SourceFormat {
    /// Dispatch by extension; anything unrecognised is read as CSV.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => SourceFormat::Json,
            "parquet" | "pq" => SourceFormat::Parquet,
            _ => SourceFormat::Csv,
        }
    }
}

/// Load a listings dataset from a file.
///
/// Supported formats:
/// * `.csv`     – header row plus one listing per line (default)
/// * `.json`    – `[{ "Brand": "...", "Year": 2019, ... }, ...]`
/// * `.parquet` – one flat column per attribute
///
/// Column headers are canonicalised, so `Brand`, `brand` and `Marca` all
/// bind to the brand attribute.
pub fn load(path: &Path) -> Result<Dataset, LoadError> {
    let bytes = read_source(path)?;
    load_bytes(path, &bytes)
}

/// Read the raw bytes of a source, mapping a missing file to
/// [`LoadError::NotFound`].
pub fn read_source(path: &Path) -> Result<Vec<u8>, LoadError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(LoadError::NotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(LoadError::Io(e)),
    }
}

/// Parse already-read source bytes. `path` only selects the format, so the
/// dataset always describes the bytes it was fingerprinted from.
pub fn load_bytes(path: &Path, bytes: &[u8]) -> Result<Dataset, LoadError> {
    let format = SourceFormat::from_path(path);
    let listings = match format {
        SourceFormat::Csv => parse_csv(bytes)?,
        SourceFormat::Json => parse_json(bytes)?,
        SourceFormat::Parquet => parse_parquet(bytes)?,
    };
    info!(
        "loaded {} listings from {} ({format:?})",
        listings.len(),
        path.display()
    );
    Ok(Dataset::with_fingerprint(listings, fingerprint_bytes(bytes)))
}

// ---------------------------------------------------------------------------
// Column canonicalisation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Brand,
    Model,
    Year,
    EngineSize,
    FuelType,
    Transmission,
    Mileage,
    Condition,
    Price,
}

/// Map a source header onto the canonical vocabulary. Headers are compared
/// lowercased with everything but letters and digits stripped.
fn canonical_field(header: &str) -> Option<Field> {
    let key: String = header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    let field = match key.as_str() {
        "brand" | "make" | "marca" => Field::Brand,
        "model" | "modelo" => Field::Model,
        "year" | "año" | "anio" | "ano" => Field::Year,
        "enginesize" | "enginesizel" | "engine" | "motor" | "motorl" => Field::EngineSize,
        "fueltype" | "fuel" | "combustible" => Field::FuelType,
        "transmission" | "transmisión" | "transmision" => Field::Transmission,
        "mileage" | "kilometraje" | "odometer" => Field::Mileage,
        "condition" | "condición" | "condicion" => Field::Condition,
        "price" | "precio" => Field::Price,
        _ => return None,
    };
    Some(field)
}

/// Positions of the canonical attributes within a source row.
#[derive(Debug, Clone, PartialEq)]
struct ColumnMap {
    brand: usize,
    model: Option<usize>,
    year: usize,
    engine_size: usize,
    fuel_type: usize,
    transmission: usize,
    mileage: usize,
    condition: Option<usize>,
    price: usize,
}

impl ColumnMap {
    fn from_headers<S: AsRef<str>>(headers: &[S]) -> Result<Self, LoadError> {
        let find = |field: Field| {
            headers
                .iter()
                .position(|h| canonical_field(h.as_ref()) == Some(field))
        };
        let require = |field: Field, name: &'static str| {
            find(field).ok_or(LoadError::MissingColumn(name))
        };

        for header in headers {
            if canonical_field(header.as_ref()).is_none() {
                debug!("ignoring column '{}'", header.as_ref());
            }
        }

        Ok(ColumnMap {
            brand: require(Field::Brand, "brand")?,
            model: find(Field::Model),
            year: require(Field::Year, "year")?,
            engine_size: require(Field::EngineSize, "engine_size")?,
            fuel_type: require(Field::FuelType, "fuel_type")?,
            transmission: require(Field::Transmission, "transmission")?,
            mileage: require(Field::Mileage, "mileage")?,
            condition: find(Field::Condition),
            price: require(Field::Price, "price")?,
        })
    }

    /// Bind one row of cells to a [`Listing`].
    fn listing(&self, row: usize, cells: &[CellValue]) -> Result<Listing, LoadError> {
        let year = int_cell(cells, self.year, row, "year")?;
        let year = i32::try_from(year).map_err(|_| invalid(cells, self.year, row, "year"))?;

        Ok(Listing {
            brand: text_cell(cells, self.brand, row, "brand")?,
            model: self.model.and_then(|i| cells.get(i)).and_then(CellValue::as_text),
            year,
            engine_size: float_cell(cells, self.engine_size, row, "engine_size")?,
            fuel_type: text_cell(cells, self.fuel_type, row, "fuel_type")?,
            transmission: text_cell(cells, self.transmission, row, "transmission")?,
            mileage: int_cell(cells, self.mileage, row, "mileage")?,
            condition: self
                .condition
                .and_then(|i| cells.get(i))
                .and_then(CellValue::as_text),
            price: float_cell(cells, self.price, row, "price")?,
        })
    }
}

fn invalid(cells: &[CellValue], idx: usize, row: usize, column: &'static str) -> LoadError {
    LoadError::InvalidValue {
        row,
        column,
        value: cells
            .get(idx)
            .map(|c| c.to_string())
            .unwrap_or_else(|| CellValue::Null.to_string()),
    }
}

fn text_cell(
    cells: &[CellValue],
    idx: usize,
    row: usize,
    column: &'static str,
) -> Result<String, LoadError> {
    cells
        .get(idx)
        .and_then(CellValue::as_text)
        .ok_or_else(|| invalid(cells, idx, row, column))
}

fn float_cell(
    cells: &[CellValue],
    idx: usize,
    row: usize,
    column: &'static str,
) -> Result<f64, LoadError> {
    cells
        .get(idx)
        .and_then(CellValue::as_f64)
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(cells, idx, row, column))
}

fn int_cell(
    cells: &[CellValue],
    idx: usize,
    row: usize,
    column: &'static str,
) -> Result<i64, LoadError> {
    cells
        .get(idx)
        .and_then(CellValue::as_i64)
        .ok_or_else(|| invalid(cells, idx, row, column))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn parse_csv(bytes: &[u8]) -> Result<Vec<Listing>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut listings = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let cells: Vec<CellValue> = record.iter().map(CellValue::guess).collect();
        listings.push(columns.listing(row_no, &cells)?);
    }
    Ok(listings)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records orientation, the default `df.to_json(orient='records')`.
fn parse_json(bytes: &[u8]) -> Result<Vec<Listing>, LoadError> {
    let root: JsonValue = serde_json::from_slice(bytes)?;
    let records = root
        .as_array()
        .ok_or_else(|| LoadError::Format("expected a top-level JSON array".to_string()))?;
    if records.is_empty() {
        return Ok(Vec::new());
    }

    // Union of keys, in order of first appearance.
    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::Format(format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }
    let columns = ColumnMap::from_headers(&headers)?;

    let mut listings = Vec::with_capacity(records.len());
    for (row_no, rec) in records.iter().enumerate() {
        // Checked above.
        let Some(obj) = rec.as_object() else {
            continue;
        };
        let cells: Vec<CellValue> = headers
            .iter()
            .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Null))
            .collect();
        listings.push(columns.listing(row_no, &cells)?);
    }
    Ok(listings)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Works with files written by both Pandas (`df.to_parquet()`) and Polars
/// (`df.write_parquet()`), including dictionary-encoded categoricals.
fn parse_parquet(bytes: &[u8]) -> Result<Vec<Listing>, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::copy_from_slice(bytes))?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let columns = ColumnMap::from_headers(&headers)?;
    let reader = builder.build()?;

    let mut listings = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let arrays = batch
            .columns()
            .iter()
            .map(normalize_column)
            .collect::<Result<Vec<_>, _>>()?;

        for row in 0..batch.num_rows() {
            let cells: Vec<CellValue> = arrays.iter().map(|col| extract_cell(col, row)).collect();
            listings.push(columns.listing(listings.len(), &cells)?);
        }
    }
    Ok(listings)
}

/// Cast every column to one of Int64, Float64 or Utf8 so extraction only
/// has three cases.
fn normalize_column(col: &ArrayRef) -> Result<ArrayRef, LoadError> {
    let target = match col.data_type() {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => DataType::Int64,
        DataType::Float16 | DataType::Float32 | DataType::Float64 => DataType::Float64,
        _ => DataType::Utf8,
    };
    if col.data_type() == &target {
        Ok(col.clone())
    } else {
        Ok(cast(col.as_ref(), &target)?)
    }
}

fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    if let Some(arr) = col.as_any().downcast_ref::<Int64Array>() {
        CellValue::Integer(arr.value(row))
    } else if let Some(arr) = col.as_any().downcast_ref::<Float64Array>() {
        CellValue::Float(arr.value(row))
    } else if let Some(arr) = col.as_any().downcast_ref::<StringArray>() {
        CellValue::Text(arr.value(row).to_string())
    } else {
        CellValue::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalises_english_and_spanish_headers() {
        assert_eq!(canonical_field("Brand"), Some(Field::Brand));
        assert_eq!(canonical_field("Engine Size"), Some(Field::EngineSize));
        assert_eq!(canonical_field("engine_size"), Some(Field::EngineSize));
        assert_eq!(canonical_field("Fuel Type"), Some(Field::FuelType));
        assert_eq!(canonical_field("Motor (L)"), Some(Field::EngineSize));
        assert_eq!(canonical_field("Año"), Some(Field::Year));
        assert_eq!(canonical_field("Transmisión"), Some(Field::Transmission));
        assert_eq!(canonical_field("Kilometraje"), Some(Field::Mileage));
        assert_eq!(canonical_field("Car ID"), None);
    }

    #[test]
    fn column_map_requires_core_attributes() {
        let headers = ["Brand", "Year", "Engine Size", "Fuel Type", "Transmission", "Mileage"];
        match ColumnMap::from_headers(&headers) {
            Err(LoadError::MissingColumn(name)) => assert_eq!(name, "price"),
            other => panic!("expected missing price, got {other:?}"),
        }
    }

    #[test]
    fn parses_csv_with_optional_columns_absent() {
        let csv = "Brand,Year,Engine Size,Fuel Type,Transmission,Mileage,Price\n\
                   Toyota,2018,1.8,Hybrid,Automatic,42000,18500.50\n\
                   Ford, 2012 ,2.0,Petrol,Manual,98000,7200\n";
        let listings = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].brand, "Toyota");
        assert_eq!(listings[0].model, None);
        assert_eq!(listings[1].year, 2012);
        assert_eq!(listings[1].price, 7200.0);
    }

    #[test]
    fn reports_row_and_column_of_bad_cell() {
        let csv = "Brand,Year,Engine Size,Fuel Type,Transmission,Mileage,Price\n\
                   Toyota,2018,1.8,Hybrid,Automatic,42000,18500\n\
                   Ford,soon,2.0,Petrol,Manual,98000,7200\n";
        match parse_csv(csv.as_bytes()) {
            Err(LoadError::InvalidValue { row, column, value }) => {
                assert_eq!(row, 1);
                assert_eq!(column, "year");
                assert_eq!(value, "soon");
            }
            other => panic!("expected invalid value, got {other:?}"),
        }
    }

    #[test]
    fn parses_json_records() {
        let json = r#"[
            {"Marca": "BMW", "Modelo": "X3", "Año": 2020, "Motor (L)": 3.0,
             "Combustible": "Diesel", "Transmisión": "Automatic",
             "Kilometraje": 15000, "Condición": "Like New", "Precio": 41000.0}
        ]"#;
        let listings = parse_json(json.as_bytes()).unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].model.as_deref(), Some("X3"));
        assert_eq!(listings[0].condition.as_deref(), Some("Like New"));
        assert_eq!(listings[0].mileage, 15000);
    }

    #[test]
    fn rejects_non_array_json() {
        assert!(matches!(
            parse_json(br#"{"Brand": "BMW"}"#),
            Err(LoadError::Format(_))
        ));
    }

    #[test]
    fn format_dispatch() {
        assert_eq!(SourceFormat::from_path(Path::new("a.CSV")), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_path(Path::new("a.json")), SourceFormat::Json);
        assert_eq!(SourceFormat::from_path(Path::new("a.pq")), SourceFormat::Parquet);
        assert_eq!(SourceFormat::from_path(Path::new("listings")), SourceFormat::Csv);
    }
}
