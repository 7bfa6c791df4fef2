use crate::error::LoadError;
use crate::types::RawTable;
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

/// Read a headered CSV into an untyped table.
///
/// Rows may be ragged (`flexible`); a short row simply has missing trailing
/// cells. A file with headers but no data rows is reported as
/// [`LoadError::EmptyDataset`].
pub fn load_raw(path: &Path) -> Result<RawTable, LoadError> {
    let file = File::open(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(file);
    let headers = rdr.headers().map_err(csv_err)?.clone();

    let records = rdr
        .records()
        .collect::<Result<Vec<StringRecord>, _>>()
        .map_err(csv_err)?;

    if records.is_empty() {
        return Err(LoadError::EmptyDataset(path.to_path_buf()));
    }

    Ok(RawTable::new(headers, records))
}
