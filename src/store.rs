use std::fs;
use std::path::Path;
use crate::errors::StoreError;
use crate::models::observation::Observation;

/// File backed record store. One CSV file with a header row, fully
/// replaced on every successful save.
pub struct Store {
    store_path: String,
}

impl Store {
    /// Returns a Store for the given file path
    ///
    /// # Arguments
    ///
    /// * 'store_path' - path to the record store file
    pub fn new(store_path: &str) -> Store {
        Store { store_path: store_path.to_string() }
    }

    /// Persists the given records, completely replacing any prior content.
    /// The records are written to a temporary file which is then renamed
    /// over the destination, so a reader never observes a partial store.
    ///
    /// An empty record set is rejected, callers treat "no new data" as
    /// keeping the previous snapshot rather than erasing it.
    ///
    /// # Arguments
    ///
    /// * 'records' - the full record set to persist
    pub fn save(&self, records: &Vec<Observation>) -> Result<(), StoreError> {
        if records.is_empty() {
            return Err(StoreError::EmptyRecordSet);
        }

        let path = Path::new(&self.store_path);
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let tmp_path = format!("{}.tmp", self.store_path);
        {
            let mut writer = csv::Writer::from_path(&tmp_path)?;
            for record in records {
                writer.serialize(record)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp_path, path)?;

        Ok(())
    }

    /// Returns the full current snapshot, or an error if no snapshot
    /// has been written yet
    ///
    pub fn load(&self) -> Result<Vec<Observation>, StoreError> {
        let path = Path::new(&self.store_path);
        if !path.exists() {
            return Err(StoreError::NoSnapshot(self.store_path.clone()));
        }

        let mut reader = csv::Reader::from_path(path)?;
        let mut records: Vec<Observation> = Vec::new();
        for row in reader.deserialize() {
            records.push(row?);
        }

        Ok(records)
    }
}
