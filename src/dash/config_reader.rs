use crate::dash::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use survey_tally::split::DelimiterHeuristic;
use survey_tally::IndexMode;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ColumnNames {
    #[serde(rename = "itemId")]
    pub item_id: String,
    #[serde(rename = "itemTitle")]
    pub item_title: String,
    #[serde(rename = "userInput")]
    pub user_input: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        ColumnNames {
            item_id: "Item ID".to_string(),
            item_title: "Item Title".to_string(),
            user_input: "User Input".to_string(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SubcategoryConfig {
    pub key: String,
    pub label: String,
    pub pages: Vec<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSchemaConfig {
    pub key: String,
    pub label: String,
    #[serde(rename = "schemaFile")]
    pub schema_file: String,
    #[serde(rename = "indexBy")]
    pub index_by: Option<String>,
    pub subcategories: Vec<SubcategoryConfig>,
}

/// The configuration file, as written by users. All the keys are optional.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashConfig {
    #[serde(rename = "dataDirectory")]
    pub data_directory: Option<String>,
    #[serde(rename = "datasetExtension")]
    pub dataset_extension: Option<String>,
    #[serde(rename = "answersSheet")]
    pub answers_sheet: Option<String>,
    pub columns: Option<ColumnNames>,
    #[serde(rename = "blankLabel")]
    pub blank_label: Option<String>,
    #[serde(rename = "minCommasForSplit")]
    pub min_commas_for_split: Option<usize>,
    #[serde(rename = "defaultModule")]
    pub default_module: Option<String>,
    #[serde(rename = "defaultCountry")]
    pub default_country: Option<String>,
    #[serde(rename = "moduleLabels")]
    pub module_labels: Option<BTreeMap<String, String>>,
    #[serde(rename = "localePreference")]
    pub locale_preference: Option<Vec<String>>,
    pub schemas: Option<Vec<ModuleSchemaConfig>>,
}

/// A module whose questions are grouped by a survey schema.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ModuleSchema {
    pub key: String,
    pub label: String,
    /// Relative to the data directory, unless absolute.
    pub schema_file: String,
    pub mode: IndexMode,
    pub subcategories: Vec<SubcategoryConfig>,
}

/// The validated configuration.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub dataset_extension: String,
    pub answers_sheet: String,
    pub columns: ColumnNames,
    pub blank_label: String,
    pub split: DelimiterHeuristic,
    pub default_module: Option<String>,
    pub default_country: Option<String>,
    pub module_labels: BTreeMap<String, String>,
    pub locale_preference: Vec<String>,
    pub schemas: Vec<ModuleSchema>,
}

fn subcategory(key: &str, label: &str, pages: &[&str]) -> SubcategoryConfig {
    SubcategoryConfig {
        key: key.to_string(),
        label: label.to_string(),
        pages: pages.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn default_module_labels() -> BTreeMap<String, String> {
    [
        ("EL", "Education Landscape"),
        ("OA", "Organisational Adoption"),
        ("PE", "Policy Environment"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

pub fn default_schemas() -> Vec<ModuleSchemaConfig> {
    vec![
        ModuleSchemaConfig {
            key: "EL".to_string(),
            label: "Education Landscape".to_string(),
            schema_file: "JSON file Education Landscape v2.json".to_string(),
            index_by: Some("title".to_string()),
            subcategories: vec![
                subcategory(
                    "EL_HEP",
                    "Higher education programmes",
                    &["Educational Units", "Learning Outcomes", "Educational Framework"],
                ),
                subcategory("EL_RES", "Research", &["Research"]),
                subcategory(
                    "EL_SC",
                    "Short courses & training",
                    &["Short Courses and BIM-related Training"],
                ),
                subcategory(
                    "EL_COLLAB",
                    "Collaboration",
                    &["Collaboration between academia, government and/or industry"],
                ),
            ],
        },
        ModuleSchemaConfig {
            key: "OA".to_string(),
            label: "Organisational Adoption".to_string(),
            schema_file: "JSON file Organisational Adoption Study.json".to_string(),
            index_by: Some("title".to_string()),
            subcategories: vec![
                subcategory("OA_ORG", "Organisation information", &["Organisation information"]),
                subcategory("OA_ADOPT", "Adoption", &["Adoption"]),
                subcategory("OA_TD", "Targeted deliverables", &["Targeted deliverables"]),
                subcategory("OA_INT", "Interoperability", &["Interoperability"]),
            ],
        },
    ]
}

fn parse_index_mode(module: &str, index_by: &Option<String>) -> DashResult<IndexMode> {
    match index_by.as_deref().map(|s| s.trim().to_lowercase()).as_deref() {
        None | Some("title") => Ok(IndexMode::Title),
        Some("id") => Ok(IndexMode::Id),
        Some(x) => InvalidConfigSnafu {
            message: format!(
                "module {}: unknown indexBy value {:?} (expected \"title\" or \"id\")",
                module, x
            ),
        }
        .fail(),
    }
}

impl Settings {
    /// Validates a configuration. Relative directories are resolved against
    /// `base_dir` (the directory of the configuration file) when provided.
    pub fn from_config(config: &DashConfig, base_dir: Option<&Path>) -> DashResult<Settings> {
        let data_dir = {
            let p = PathBuf::from(config.data_directory.as_deref().unwrap_or("data"));
            match base_dir {
                Some(base) if p.is_relative() => base.join(p),
                _ => p,
            }
        };

        let mut module_labels = default_module_labels();
        if let Some(labels) = &config.module_labels {
            for (k, v) in labels {
                module_labels.insert(k.trim().to_uppercase(), v.clone());
            }
        }

        let mut schemas: Vec<ModuleSchema> = Vec::new();
        for s in config.schemas.clone().unwrap_or_else(default_schemas) {
            let key = s.key.trim().to_uppercase();
            if schemas.iter().any(|x| x.key == key) {
                return InvalidConfigSnafu {
                    message: format!("module {} has more than one schema", key),
                }
                .fail();
            }
            let mode = parse_index_mode(&key, &s.index_by)?;
            module_labels.entry(key.clone()).or_insert_with(|| s.label.clone());
            schemas.push(ModuleSchema {
                key,
                label: s.label,
                schema_file: s.schema_file,
                mode,
                subcategories: s.subcategories,
            });
        }

        let extension = config
            .dataset_extension
            .clone()
            .unwrap_or_else(|| ".xlsx".to_string());
        ensure!(
            !extension.trim().is_empty(),
            InvalidConfigSnafu {
                message: "datasetExtension may not be empty".to_string()
            }
        );

        let settings = Settings {
            data_dir,
            dataset_extension: extension,
            answers_sheet: config
                .answers_sheet
                .clone()
                .unwrap_or_else(|| "Answers".to_string()),
            columns: config.columns.clone().unwrap_or_default(),
            blank_label: config
                .blank_label
                .clone()
                .unwrap_or_else(|| survey_tally::BLANK_LABEL.to_string()),
            split: DelimiterHeuristic {
                min_commas: config
                    .min_commas_for_split
                    .unwrap_or(DelimiterHeuristic::DEFAULT.min_commas),
            },
            default_module: config.default_module.as_ref().map(|s| s.trim().to_uppercase()),
            default_country: config.default_country.as_ref().map(|s| s.trim().to_uppercase()),
            module_labels,
            locale_preference: config.locale_preference.clone().unwrap_or_else(|| {
                ["default", "en", "es", "pt-br"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            }),
            schemas,
        };
        debug!("Settings::from_config: {:?}", settings);
        Ok(settings)
    }

    /// Overrides the data directory.
    pub fn with_data_dir(self, data_dir: &Path) -> Settings {
        Settings {
            data_dir: data_dir.to_path_buf(),
            ..self
        }
    }

    /// The display name of a module, or the code itself if it has none.
    pub fn module_label(&self, module: &str) -> String {
        self.module_labels
            .get(module)
            .cloned()
            .unwrap_or_else(|| module.to_string())
    }

    pub fn schema_for(&self, module: &str) -> Option<&ModuleSchema> {
        self.schemas.iter().find(|s| s.key == module)
    }

    pub fn schema_path(&self, schema: &ModuleSchema) -> PathBuf {
        self.data_dir.join(&schema.schema_file)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::from_config(&DashConfig::default(), None)
            .expect("the built-in configuration is valid")
    }
}

pub fn read_config(path: &str) -> DashResult<Settings> {
    let contents = fs::read_to_string(path).context(OpeningConfigSnafu { path })?;
    let config: DashConfig =
        serde_json::from_str(contents.as_str()).context(ParsingConfigSnafu { path })?;
    info!("read_config: {:?}", config);
    let base_dir = Path::new(path).parent();
    Settings::from_config(&config, base_dir)
}
