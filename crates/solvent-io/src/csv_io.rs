use solvent_core::Matrix;
use std::error::Error;
use std::path::Path;

/// Read a numeric CSV file into a matrix. `has_headers` skips the first
/// record; every remaining field must parse as `f64`.
pub fn read_matrix_csv(path: impl AsRef<Path>, has_headers: bool) -> Result<Matrix, Box<dyn Error>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .from_path(path)?;

    let mut rows: Vec<Vec<f64>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = record
            .iter()
            .map(|field| field.trim().parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()?;
        rows.push(row);
    }
    Ok(Matrix::from_rows(&rows)?)
}

/// Write a matrix as CSV, one record per row.
pub fn write_matrix_csv(matrix: &Matrix, path: impl AsRef<Path>) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    for i in 0..matrix.rows() {
        let record: Vec<String> = matrix.row(i).iter().map(|v| v.to_string()).collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
