// Naming conventions of the dataset directory.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Display;
use std::path::Path;

use crate::dash::*;

// "EL - ECU XLSX Report - Jan2024.xlsx", "OA-PER XLSX Report.xlsx", "PE - ALL XLSX Report ..."
// ASCII letters and spaces only.
static DATASET_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i-u)^([A-Z]{2})\s*-\s*([A-Z]{2,3}|ALL)\s+XLSX\s+Report").expect("dataset name pattern")
});

/// The logical identity of an export: a module and a country (or `ALL`).
/// Both codes are upper case.
#[derive(Eq, PartialEq, Debug, Clone, Hash, PartialOrd, Ord)]
pub struct DatasetKey {
    pub module: String,
    pub country: String,
}

impl DatasetKey {
    pub fn new(module: &str, country: &str) -> DatasetKey {
        DatasetKey {
            module: module.trim().to_uppercase(),
            country: country.trim().to_uppercase(),
        }
    }
}

impl Display for DatasetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.module, self.country)
    }
}

/// An export found in the dataset directory.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DatasetEntry {
    pub key: DatasetKey,
    pub filename: String,
}

/// Extracts the module and country from the name of an export, or `None` if
/// the name does not follow the convention.
pub fn classify_filename(filename: &str) -> Option<DatasetKey> {
    let caps = DATASET_NAME.captures(filename)?;
    Some(DatasetKey {
        module: caps.get(1)?.as_str().to_uppercase(),
        country: caps.get(2)?.as_str().to_uppercase(),
    })
}

/// A file name that `classify_filename` binds to the key, for error messages.
pub fn expected_filename(key: &DatasetKey, extension: &str) -> String {
    format!("{} - {} XLSX Report - ...{}", key.module, key.country, extension)
}

pub fn has_extension(filename: &str, extension: &str) -> bool {
    filename.to_lowercase().ends_with(&extension.to_lowercase())
}

/// Lists the exports of a directory, in directory order.
///
/// A missing or unreadable directory has no exports. Files with another
/// extension or a name outside the convention are ignored.
pub fn list_datasets(dir: &Path, extension: &str) -> Vec<DatasetEntry> {
    let entries = match fs::read_dir(dir) {
        Ok(x) => x,
        Err(e) => {
            debug!("list_datasets: cannot list {:?}: {}", dir, e);
            return vec![];
        }
    };

    let mut res: Vec<DatasetEntry> = Vec::new();
    for entry_r in entries {
        let entry = match entry_r {
            Ok(x) => x,
            Err(e) => {
                warn!("list_datasets: skipping unreadable entry in {:?}: {}", dir, e);
                continue;
            }
        };
        let filename = match entry.file_name().into_string() {
            Ok(s) => s,
            Err(name) => {
                warn!("list_datasets: skipping non UTF-8 file name {:?}", name);
                continue;
            }
        };
        if !has_extension(&filename, extension) {
            continue;
        }
        match classify_filename(&filename) {
            Some(key) => {
                debug!("list_datasets: {:?} -> {}", filename, key);
                res.push(DatasetEntry { key, filename });
            }
            None => debug!("list_datasets: ignoring {:?}", filename),
        }
    }
    res
}

/// The first export of the list bound to the key.
pub fn find_dataset<'a>(datasets: &'a [DatasetEntry], key: &DatasetKey) -> Option<&'a DatasetEntry> {
    datasets.iter().find(|d| d.key == *key)
}

pub fn simplify_file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
