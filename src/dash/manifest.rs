use std::collections::{BTreeMap, BTreeSet};

use crate::dash::*;

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ModuleEntry {
    pub key: String,
    pub label: String,
    /// Sorted, without duplicates.
    pub countries: Vec<String>,
}

/// The exports available in the dataset directory.
///
/// Modules are sorted by key. Datasets are in directory order.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Manifest {
    pub modules: Vec<ModuleEntry>,
    pub datasets: Vec<DatasetEntry>,
}

impl Manifest {
    pub fn module(&self, key: &str) -> Option<&ModuleEntry> {
        self.modules.iter().find(|m| m.key == key)
    }
}

/// Groups a list of exports by module.
pub fn build_manifest(datasets: Vec<DatasetEntry>, settings: &Settings) -> Manifest {
    let mut by_module: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for d in datasets.iter() {
        by_module
            .entry(d.key.module.clone())
            .or_default()
            .insert(d.key.country.clone());
    }
    let modules: Vec<ModuleEntry> = by_module
        .into_iter()
        .map(|(key, countries)| ModuleEntry {
            label: settings.module_label(&key),
            key,
            countries: countries.into_iter().collect(),
        })
        .collect();
    Manifest { modules, datasets }
}

/// Scans the dataset directory. Never fails: a missing directory gives an
/// empty manifest.
pub fn scan_manifest(settings: &Settings) -> Manifest {
    let datasets = list_datasets(&settings.data_dir, &settings.dataset_extension);
    info!(
        "scan_manifest: {} datasets in {:?}",
        datasets.len(),
        settings.data_dir
    );
    build_manifest(datasets, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn settings(dir: &Path) -> Settings {
        Settings::default().with_data_dir(dir)
    }

    #[test]
    fn grouping_and_ordering() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "OA - PER XLSX Report.xlsx",
            "EL - ECU XLSX Report - Jan2024.xlsx",
            "EL - BRA XLSX Report.xlsx",
            "EL - ECU XLSX Report - Feb2024.xlsx",
            "ZZ - ALL XLSX Report.xlsx",
            "README.md",
            "JSON file Education Landscape v2.json",
        ] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let m = scan_manifest(&settings(dir.path()));
        let keys: Vec<&str> = m.modules.iter().map(|x| x.key.as_str()).collect();
        assert_eq!(keys, vec!["EL", "OA", "ZZ"]);
        assert_eq!(m.module("EL").unwrap().countries, vec!["BRA", "ECU"]);
        assert_eq!(m.module("EL").unwrap().label, "Education Landscape");
        assert_eq!(m.module("ZZ").unwrap().label, "ZZ");
        assert_eq!(m.datasets.len(), 5);
    }

    #[test]
    fn dataset_order_is_preserved() {
        let datasets = vec![
            DatasetEntry {
                key: DatasetKey::new("OA", "PER"),
                filename: "OA - PER XLSX Report.xlsx".to_string(),
            },
            DatasetEntry {
                key: DatasetKey::new("EL", "ECU"),
                filename: "EL - ECU XLSX Report.xlsx".to_string(),
            },
        ];
        let m = build_manifest(datasets.clone(), &Settings::default());
        assert_eq!(m.datasets, datasets);
        assert_eq!(m.modules[0].key, "EL");
    }

    #[test]
    fn missing_directory() {
        let m = scan_manifest(&settings(Path::new("/nonexistent/surveydash")));
        assert!(m.modules.is_empty());
        assert!(m.datasets.is_empty());
    }
}
