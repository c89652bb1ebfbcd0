use log::{debug, info, warn};

use snafu::prelude::*;

use std::fs;
use std::path::Path;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use survey_tally::builder::Builder;
use survey_tally::{group_by_section, reconcile, GroupedSummary, SummaryQuestion};

use crate::args::{Args, Command};

mod config_reader;
mod io_common;
mod io_xlsx;
mod manifest;
mod schema_reader;

pub use crate::dash::config_reader::*;
pub use crate::dash::io_common::*;
pub use crate::dash::io_xlsx::*;
pub use crate::dash::manifest::*;
pub use crate::dash::schema_reader::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DashError {
    #[snafu(display(
        "No dataset found for module={module}, country={country}. Put the XLSX in {directory} with name like '{pattern}'."
    ))]
    DatasetNotFound {
        module: String,
        country: String,
        pattern: String,
        directory: String,
    },
    #[snafu(display("Error opening dataset {path}: {source}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Dataset {path} cannot be read: {reason}"))]
    DatasetUnreadable { path: String, reason: String },
    #[snafu(display("Schema for module {module} is unavailable: expected a JSON document at {path} ({source})"))]
    OpeningSchema {
        source: std::io::Error,
        module: String,
        path: String,
    },
    #[snafu(display("Schema for module {module} at {path} is not a valid survey definition: {source}"))]
    ParsingSchema {
        source: serde_json::Error,
        module: String,
        path: String,
    },
    #[snafu(display("Error opening configuration file {path}: {source}"))]
    OpeningConfig {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing configuration file {path}: {source}"))]
    ParsingConfig {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Invalid configuration: {message}"))]
    InvalidConfig { message: String },
    #[snafu(display("Error reading reference file {path}: {source}"))]
    OpeningReference {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing reference file {path}: {source}"))]
    ParsingReference {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Difference detected between the output and the reference {path}"))]
    ReferenceMismatch { path: String },
    #[snafu(display("Error rendering the output: {source}"))]
    RenderingJson { source: serde_json::Error },
    #[snafu(display("Error writing the output to {path}: {source}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
}

pub type DashResult<T> = Result<T, DashError>;

/// The failure classes reported to the caller.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ErrorKind {
    DatasetNotFound,
    DatasetUnreadable,
    SchemaUnavailable,
    Configuration,
    Output,
}

impl DashError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DashError::DatasetNotFound { .. } => ErrorKind::DatasetNotFound,
            DashError::OpeningExcel { .. } | DashError::DatasetUnreadable { .. } => {
                ErrorKind::DatasetUnreadable
            }
            DashError::OpeningSchema { .. } | DashError::ParsingSchema { .. } => {
                ErrorKind::SchemaUnavailable
            }
            DashError::OpeningConfig { .. }
            | DashError::ParsingConfig { .. }
            | DashError::InvalidConfig { .. } => ErrorKind::Configuration,
            DashError::OpeningReference { .. }
            | DashError::ParsingReference { .. }
            | DashError::ReferenceMismatch { .. }
            | DashError::RenderingJson { .. }
            | DashError::WritingOutput { .. } => ErrorKind::Output,
        }
    }

    /// The HTTP-style status of the error.
    pub fn status(&self) -> u16 {
        match self.kind() {
            ErrorKind::DatasetNotFound | ErrorKind::SchemaUnavailable => 404,
            ErrorKind::DatasetUnreadable => 422,
            ErrorKind::Configuration | ErrorKind::Output => 500,
        }
    }
}

/// The inputs of a summary. Missing codes fall back to the configured
/// defaults, then to the first export found.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct SummaryRequest {
    pub module: Option<String>,
    pub country: Option<String>,
    pub section: Option<String>,
    pub search: Option<String>,
    pub grouped: bool,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Summary {
    pub key: DatasetKey,
    pub file: String,
    pub sheet_name: String,
    pub questions: Vec<SummaryQuestion>,
    pub grouped: Option<GroupedSummary>,
}

/// The schema sections of the requested modules.
#[derive(PartialEq, Debug, Clone)]
pub struct SchemaIndex {
    pub modules: Vec<ModuleIndex>,
}

pub fn get_manifest(settings: &Settings) -> Manifest {
    scan_manifest(settings)
}

/// Loads the section index of one module, or of all the configured modules.
///
/// A module without a configured schema has no sections. A configured
/// schema that cannot be read fails the whole request.
pub fn get_schema(settings: &Settings, module: Option<&str>) -> DashResult<SchemaIndex> {
    let wanted: Vec<&ModuleSchema> = match module {
        Some(m) => {
            let m = m.trim().to_uppercase();
            let found: Vec<&ModuleSchema> = settings.schema_for(&m).into_iter().collect();
            if found.is_empty() {
                info!("get_schema: no schema configured for module {}", m);
            }
            found
        }
        None => settings.schemas.iter().collect(),
    };
    let mut modules: Vec<ModuleIndex> = Vec::new();
    for schema in wanted {
        modules.push(load_module_index(settings, schema)?);
    }
    Ok(SchemaIndex { modules })
}

fn resolve_key(settings: &Settings, manifest: &Manifest, req: &SummaryRequest) -> DashResult<DatasetKey> {
    let upper = |s: &Option<String>| {
        s.as_ref()
            .map(|x| x.trim().to_uppercase())
            .filter(|x| !x.is_empty())
    };
    let module = upper(&req.module)
        .or_else(|| settings.default_module.clone())
        .or_else(|| manifest.modules.first().map(|m| m.key.clone()));
    let module = match module {
        Some(m) => m,
        None => {
            return DatasetNotFoundSnafu {
                module: "*",
                country: upper(&req.country).unwrap_or_else(|| "*".to_string()),
                pattern: expected_filename(&DatasetKey::new("XX", "YYY"), &settings.dataset_extension),
                directory: settings.data_dir.display().to_string(),
            }
            .fail()
        }
    };
    let available: Vec<String> = manifest
        .module(&module)
        .map(|m| m.countries.clone())
        .unwrap_or_default();
    let country = upper(&req.country)
        .or_else(|| {
            settings
                .default_country
                .clone()
                .filter(|c| available.contains(c))
        })
        .or_else(|| available.first().cloned())
        .unwrap_or_else(|| settings.default_country.clone().unwrap_or_else(|| "*".to_string()));
    Ok(DatasetKey::new(&module, &country))
}

// The schema index of the module, read once for both the section filter and
// the grouping. `None` when neither is requested or the module has no schema.
fn module_index_for(settings: &Settings, module: &str, req: &SummaryRequest) -> DashResult<Option<ModuleIndex>> {
    if req.section.is_none() && !req.grouped {
        return Ok(None);
    }
    match settings.schema_for(module) {
        Some(schema) => Ok(Some(load_module_index(settings, schema)?)),
        None => {
            warn!(
                "module_index_for: module {} has no schema, sections are not applied",
                module
            );
            Ok(None)
        }
    }
}

fn section_entries(index: Option<&ModuleIndex>, section: &str) -> Option<Vec<String>> {
    let index = index?;
    match index.section(section) {
        Some(s) => Some(s.entries.clone()),
        None => {
            warn!(
                "section_entries: module {} has no section {:?}, showing all questions",
                index.key, section
            );
            None
        }
    }
}

/// Aggregates the export of a module and country.
pub fn get_summary(settings: &Settings, req: &SummaryRequest) -> DashResult<Summary> {
    let manifest = scan_manifest(settings);
    let key = resolve_key(settings, &manifest, req)?;
    info!("get_summary: {} ({:?})", key, req);

    let entry = find_dataset(&manifest.datasets, &key).context(DatasetNotFoundSnafu {
        module: key.module.clone(),
        country: key.country.clone(),
        pattern: expected_filename(&key, &settings.dataset_extension),
        directory: settings.data_dir.display().to_string(),
    })?;

    let path = settings.data_dir.join(&entry.filename);
    let sheet = read_answer_sheet(&path, settings)?;

    let mut builder = Builder::with_policy(settings.split).blank_label(&settings.blank_label);
    builder.add_rows(sheet.rows.iter());
    info!(
        "get_summary: {}: {} rows, {} skipped",
        entry.filename,
        builder.rows_read(),
        builder.rows_skipped()
    );
    let all_questions = builder.finish();

    let index = module_index_for(settings, &key.module, req)?;
    let entries = req
        .section
        .as_deref()
        .and_then(|section| section_entries(index.as_ref(), section));
    let questions = reconcile(&all_questions, entries.as_deref(), req.search.as_deref());
    debug!(
        "get_summary: {} of {} questions after filtering",
        questions.len(),
        all_questions.len()
    );

    let grouped = if req.grouped {
        let sections = index.as_ref().map(|i| i.sections.as_slice()).unwrap_or(&[]);
        Some(group_by_section(&questions, sections))
    } else {
        None
    };

    Ok(Summary {
        key,
        file: entry.filename.clone(),
        sheet_name: sheet.sheet_name,
        questions,
        grouped,
    })
}

// ******** JSON rendering *********

pub fn manifest_to_json(m: &Manifest) -> JSValue {
    let modules: Vec<JSValue> = m
        .modules
        .iter()
        .map(|x| json!({"key": x.key, "label": x.label, "countries": x.countries}))
        .collect();
    let datasets: Vec<JSValue> = m
        .datasets
        .iter()
        .map(|d| json!({"module": d.key.module, "country": d.key.country, "filename": d.filename}))
        .collect();
    json!({ "modules": modules, "datasets": datasets })
}

pub fn schema_to_json(s: &SchemaIndex) -> JSValue {
    let modules: Vec<JSValue> = s
        .modules
        .iter()
        .map(|m| {
            let entries_key = match m.mode {
                survey_tally::IndexMode::Title => "titles",
                survey_tally::IndexMode::Id => "ids",
            };
            let subcategories: Vec<JSValue> = m
                .sections
                .iter()
                .map(|sc| {
                    json!({
                        "key": sc.key,
                        "label": sc.label,
                        "pages": sc.pages,
                        entries_key: sc.entries,
                    })
                })
                .collect();
            json!({
                "key": m.key,
                "label": m.label,
                "indexBy": m.mode.as_str(),
                "subcategories": subcategories,
            })
        })
        .collect();
    json!({ "modules": modules })
}

fn question_to_json(q: &SummaryQuestion) -> JSValue {
    let series: Vec<JSValue> = q
        .series
        .iter()
        .map(|p| json!({"name": p.name, "value": p.value}))
        .collect();
    json!({
        "key": q.key,
        "itemId": q.item_id,
        "title": q.title,
        "total": q.total,
        "series": series,
    })
}

pub fn summary_to_json(s: &Summary) -> JSValue {
    let questions: Vec<JSValue> = s.questions.iter().map(question_to_json).collect();
    let mut js = json!({
        "module": s.key.module,
        "country": s.key.country,
        "file": s.file,
        "sheetName": s.sheet_name,
        "questionCount": s.questions.len(),
        "questions": questions,
    });
    if let Some(g) = &s.grouped {
        let keys = |qs: &[SummaryQuestion]| -> Vec<String> { qs.iter().map(|q| q.key.clone()).collect() };
        let sections: Vec<JSValue> = g
            .sections
            .iter()
            .map(|sg| json!({"key": sg.key, "label": sg.label, "questions": keys(&sg.questions)}))
            .collect();
        js["sections"] = JSValue::Array(sections);
        js["unassigned"] = json!(keys(&g.unassigned));
    }
    js
}

pub fn error_to_json(e: &DashError) -> JSValue {
    json!({"error": e.to_string(), "status": e.status()})
}

// ******** Command line *********

pub fn load_settings(args: &Args) -> DashResult<Settings> {
    let settings = match &args.config {
        Some(p) => read_config(p)?,
        None => Settings::from_config(&DashConfig::default(), None)?,
    };
    Ok(match &args.data_dir {
        Some(d) => settings.with_data_dir(Path::new(d)),
        None => settings,
    })
}

/// Runs one command and returns its JSON output.
pub fn execute(settings: &Settings, command: &Command) -> DashResult<JSValue> {
    match command {
        Command::Manifest => Ok(manifest_to_json(&get_manifest(settings))),
        Command::Schema { module } => Ok(schema_to_json(&get_schema(settings, module.as_deref())?)),
        Command::Summary {
            module,
            country,
            section,
            search,
            grouped,
        } => {
            let req = SummaryRequest {
                module: module.clone(),
                country: country.clone(),
                section: section.clone(),
                search: search.clone(),
                grouped: *grouped,
            };
            Ok(summary_to_json(&get_summary(settings, &req)?))
        }
    }
}

fn check_reference(reference_path: &str, pretty_js: &str) -> DashResult<()> {
    let contents = fs::read_to_string(reference_path).context(OpeningReferenceSnafu {
        path: reference_path,
    })?;
    let reference: JSValue = serde_json::from_str(contents.as_str()).context(ParsingReferenceSnafu {
        path: reference_path,
    })?;
    let pretty_reference = serde_json::to_string_pretty(&reference).context(RenderingJsonSnafu {})?;
    if pretty_reference != pretty_js {
        warn!("Found differences with the reference {:?}", reference_path);
        print_diff(pretty_reference.as_str(), pretty_js, "\n");
        return ReferenceMismatchSnafu {
            path: reference_path,
        }
        .fail();
    }
    info!("The output matches the reference {:?}", reference_path);
    Ok(())
}

fn write_output(out: &Option<String>, pretty_js: &str) -> DashResult<()> {
    match out.as_deref() {
        None | Some("") | Some("stdout") => {
            println!("{}", pretty_js);
            Ok(())
        }
        Some(path) => {
            info!("Writing output to {:?}", path);
            fs::write(path, pretty_js).context(WritingOutputSnafu { path })
        }
    }
}

pub fn run_command(args: &Args) -> DashResult<()> {
    let settings = load_settings(args)?;
    let js = execute(&settings, &args.command)?;
    let pretty_js = serde_json::to_string_pretty(&js).context(RenderingJsonSnafu {})?;
    write_output(&args.out, &pretty_js)?;
    if let Some(reference_path) = &args.reference {
        check_reference(reference_path, &pretty_js)?;
    }
    Ok(())
}
