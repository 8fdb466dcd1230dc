//! CSV source and sink collaborators
//!
//! The engine itself never touches files; these helpers construct and
//! persist `Dataset` values at its boundary. Round-tripping through CSV is
//! lossy in one documented way: `Null` and blank text both serialize to an
//! empty field, and every empty field reads back as `Null`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::dataset::{Column, Dataset, Value};
use crate::error::{Error, Result};

/// Parse a CSV file into a Dataset
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let reader = BufReader::new(file);
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // Allow varying number of fields
        .from_reader(reader);

    let headers = csv_reader.headers().map_err(|e| Error::Csv {
        path: path.to_path_buf(),
        source: e,
    })?;

    let columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(name.to_string(), i))
        .collect();

    let mut dataset = Dataset {
        columns,
        rows: Vec::new(),
    };

    for (row_idx, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|e| Error::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;

        let values: Vec<Value> = record.iter().map(Value::parse).collect();

        if values.len() > dataset.columns.len() {
            eprintln!(
                "Warning: row {} in {} has more cells than columns, truncating",
                row_idx + 1,
                path.display()
            );
        }
        dataset.push_row(values);
    }

    Ok(dataset)
}

/// Parse CSV from a string (useful for testing)
pub fn read_csv_str(content: &str, source_name: &str) -> Result<Dataset> {
    let path = std::path::PathBuf::from(source_name);

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = csv_reader.headers().map_err(|e| Error::Csv {
        path: path.clone(),
        source: e,
    })?;

    let columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(name.to_string(), i))
        .collect();

    let mut dataset = Dataset {
        columns,
        rows: Vec::new(),
    };

    for result in csv_reader.records() {
        let record = result.map_err(|e| Error::Csv {
            path: path.clone(),
            source: e,
        })?;

        let values: Vec<Value> = record.iter().map(Value::parse).collect();
        dataset.push_row(values);
    }

    Ok(dataset)
}

/// Write a dataset to a CSV file
pub fn write_csv<P: AsRef<Path>>(dataset: &Dataset, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path).map_err(|e| Error::Csv {
        path: path.to_path_buf(),
        source: e,
    })?;

    write_records(dataset, &mut writer).map_err(|e| Error::Csv {
        path: path.to_path_buf(),
        source: e,
    })?;

    writer.flush()?;
    Ok(())
}

/// Render a dataset as a CSV string
pub fn write_csv_string(dataset: &Dataset) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    write_records(dataset, &mut writer).map_err(|e| Error::Csv {
        path: std::path::PathBuf::from("<string>"),
        source: e,
    })?;

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;
    String::from_utf8(bytes).map_err(|e| Error::Io(std::io::Error::other(e.to_string())))
}

fn write_records<W: std::io::Write>(
    dataset: &Dataset,
    writer: &mut csv::Writer<W>,
) -> std::result::Result<(), csv::Error> {
    writer.write_record(dataset.columns.iter().map(|c| c.name.as_str()))?;
    for row in &dataset.rows {
        writer.write_record(row.values.iter().map(|v| v.to_field_string()))?;
    }
    Ok(())
}
