use std::{fs::File, path::Path, result};

use serde::{Deserialize, Serialize};

use crate::error::MerkleTreeError;

pub type Result<T> = result::Result<T, MerkleTreeError>;

/// Represents a single entry in a whitelist CSV
#[derive(Debug, Clone, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct CsvEntry {
    /// Address of the claimant, any letter case
    pub address: String,
    /// Entitlement in whole tokens (ui amount)
    pub amount: String,
}

impl CsvEntry {
    pub fn new_from_file(path: &Path) -> Result<Vec<Self>> {
        let file = File::open(path)?;
        let mut rdr = csv::Reader::from_reader(file);

        let mut entries = Vec::new();
        for result in rdr.deserialize() {
            let record: CsvEntry = result?;
            entries.push(record);
        }

        Ok(entries)
    }

    pub fn write_to_file(entries: &[Self], path: &Path) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)?;
        for entry in entries {
            wtr.serialize(entry)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_csv_parsing() {
        let path = PathBuf::from("./test_fixtures/test_csv.csv");
        let entries = CsvEntry::new_from_file(&path).expect("Failed to parse CSV");

        assert_eq!(entries.len(), 3);

        assert_eq!(
            entries[0].address,
            "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
        );
        assert_eq!(entries[0].amount, "100");
        assert_eq!(entries[2].amount, "300");
    }

    #[test]
    fn test_csv_write_then_read() {
        let path = std::env::temp_dir().join("airdrop_csv_entry_roundtrip.csv");
        let entries = vec![CsvEntry {
            address: "0x0000000000000000000000000000000000000001".to_string(),
            amount: "7".to_string(),
        }];
        CsvEntry::write_to_file(&entries, &path).unwrap();
        assert_eq!(CsvEntry::new_from_file(&path).unwrap(), entries);
    }
}
