use csv::ReaderBuilder;

/// Parse an uploaded CSV into the submitted number list.
///
/// The first row is treated as a header; every following row contributes its
/// first column. Blank cells are skipped, duplicates are kept (the store
/// collapses them onto one status slot).
pub fn parse_batch_csv(data: &[u8]) -> Result<Vec<String>, UploadError> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(data);

    let mut numbers = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(cell) = record.get(0) {
            let number = cell.trim();
            if !number.is_empty() {
                numbers.push(number.to_string());
            }
        }
    }

    Ok(numbers)
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Failed to parse CSV upload: {0}")]
    Csv(#[from] csv::Error),
}
