// Survey definitions (JSON) and the section index built from them.

use crate::dash::*;

use serde::{Deserialize, Serialize};
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use std::path::Path;

use survey_tally::{IndexMode, SchemaSection};

/// A title: either a plain string or one string per locale.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    Localized(JSMap<String, JSValue>),
    Other(JSValue),
}

impl LocalizedText {
    /// The text in the first preferred locale that has one, or an empty
    /// string.
    pub fn resolve(&self, preference: &[String]) -> String {
        match self {
            LocalizedText::Plain(s) => s.trim().to_string(),
            LocalizedText::Localized(m) => preference
                .iter()
                .filter_map(|locale| m.get(locale).and_then(|v| v.as_str()))
                .map(|s| s.trim())
                .find(|s| !s.is_empty())
                .unwrap_or("")
                .to_string(),
            LocalizedText::Other(_) => "".to_string(),
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SurveyElement {
    pub name: Option<JSValue>,
    #[serde(rename = "questionId")]
    pub question_id: Option<JSValue>,
    pub title: Option<LocalizedText>,
    // Panels nest their questions.
    pub elements: Option<Vec<SurveyElement>>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SurveyPage {
    pub name: Option<JSValue>,
    pub title: Option<LocalizedText>,
    // Absent and null both mean no elements.
    pub elements: Option<Vec<SurveyElement>>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SurveyDocument {
    pub pages: Option<Vec<SurveyPage>>,
}

/// The sections of one module, with their questions.
#[derive(PartialEq, Debug, Clone)]
pub struct ModuleIndex {
    pub key: String,
    pub label: String,
    pub mode: IndexMode,
    pub sections: Vec<SchemaSection>,
}

impl ModuleIndex {
    /// The section with this key, ignoring case.
    pub fn section(&self, key: &str) -> Option<&SchemaSection> {
        let key = key.trim();
        self.sections.iter().find(|s| s.key.eq_ignore_ascii_case(key))
    }
}

fn js_to_string(v: &Option<JSValue>) -> String {
    match v {
        Some(JSValue::String(s)) => s.trim().to_string(),
        Some(JSValue::Number(n)) => n.to_string(),
        _ => "".to_string(),
    }
}

impl SurveyElement {
    fn entry(&self, mode: IndexMode, preference: &[String]) -> String {
        match mode {
            IndexMode::Title => self
                .title
                .as_ref()
                .map(|t| t.resolve(preference))
                .unwrap_or_default(),
            IndexMode::Id => {
                let id = js_to_string(&self.question_id);
                if id.is_empty() {
                    js_to_string(&self.name)
                } else {
                    id
                }
            }
        }
    }

    fn collect_entries(&self, mode: IndexMode, preference: &[String], res: &mut Vec<String>) {
        match &self.elements {
            Some(children) => {
                for c in children {
                    c.collect_entries(mode, preference, res);
                }
            }
            None => {
                let e = self.entry(mode, preference);
                if !e.is_empty() {
                    res.push(e);
                }
            }
        }
    }
}

impl SurveyPage {
    fn matches(&self, page_title: &str, preference: &[String]) -> bool {
        let wanted = page_title.trim();
        let title = self
            .title
            .as_ref()
            .map(|t| t.resolve(preference))
            .unwrap_or_default();
        if !title.is_empty() {
            title == wanted
        } else {
            js_to_string(&self.name) == wanted
        }
    }
}

impl SurveyDocument {
    /// The titles or identifiers of the questions of the page(s) with this
    /// title, in document order.
    pub fn page_entries(&self, page_title: &str, mode: IndexMode, preference: &[String]) -> Vec<String> {
        let mut res: Vec<String> = Vec::new();
        let pages = self.pages.iter().flatten();
        for page in pages.filter(|p| p.matches(page_title, preference)) {
            for elt in page.elements.iter().flatten() {
                elt.collect_entries(mode, preference, &mut res);
            }
        }
        res
    }
}

pub fn read_survey(module: &str, path: &Path) -> DashResult<SurveyDocument> {
    let display_path = path.display().to_string();
    info!("Attempting to read schema {:?} for module {}", display_path, module);
    let contents = fs::read_to_string(path).context(OpeningSchemaSnafu {
        module,
        path: display_path.clone(),
    })?;
    let doc: SurveyDocument = serde_json::from_str(contents.as_str()).context(ParsingSchemaSnafu {
        module,
        path: display_path,
    })?;
    debug!(
        "read_survey: {} pages",
        doc.pages.as_ref().map_or(0, |p| p.len())
    );
    Ok(doc)
}

/// Builds the sections of a module from its survey document.
///
/// Each section lists the questions of its pages, without duplicates, in the
/// order they are first seen. Configured pages that the document does not
/// have contribute nothing.
pub fn index_module(schema: &ModuleSchema, doc: &SurveyDocument, preference: &[String]) -> ModuleIndex {
    let mut sections: Vec<SchemaSection> = Vec::new();
    for sc in schema.subcategories.iter() {
        let mut entries: Vec<String> = Vec::new();
        for page_title in sc.pages.iter() {
            let page_entries = doc.page_entries(page_title, schema.mode, preference);
            if page_entries.is_empty() {
                warn!(
                    "index_module: module {}: page {:?} has no questions in the schema",
                    schema.key, page_title
                );
            }
            for e in page_entries {
                if !entries.contains(&e) {
                    entries.push(e);
                }
            }
        }
        debug!(
            "index_module: {} / {}: {} entries",
            schema.key,
            sc.key,
            entries.len()
        );
        sections.push(SchemaSection {
            key: sc.key.clone(),
            label: sc.label.clone(),
            mode: schema.mode,
            pages: sc.pages.clone(),
            entries,
        });
    }
    ModuleIndex {
        key: schema.key.clone(),
        label: schema.label.clone(),
        mode: schema.mode,
        sections,
    }
}

/// Reads the survey document of a module and builds its sections.
pub fn load_module_index(settings: &Settings, schema: &ModuleSchema) -> DashResult<ModuleIndex> {
    let doc = read_survey(&schema.key, &settings.schema_path(schema))?;
    Ok(index_module(schema, &doc, &settings.locale_preference))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs() -> Vec<String> {
        Settings::default().locale_preference
    }

    fn doc() -> SurveyDocument {
        serde_json::from_str(
            r#"{
              "pages": [
                {
                  "name": "page1",
                  "title": "Research",
                  "elements": [
                    {"name": "q1", "questionId": "EL-1", "title": "Which research topics are covered?"},
                    {"name": "q2", "title": {"default": "", "en": "Is research funded?", "es": "¿Se financia?"}},
                    {"name": "p1", "type": "panel", "elements": [
                      {"name": "q3", "questionId": 3, "title": {"es": "¿Quién investiga?"}}
                    ]},
                    {"type": "html", "html": "<p>intro</p>"}
                  ]
                },
                {
                  "name": "page2",
                  "title": {"pt-br": "Pesquisa", "default": "Research"},
                  "elements": [
                    {"name": "q1", "questionId": "EL-1", "title": "Which research topics are covered?"},
                    {"name": "q4", "title": "Do you publish?"}
                  ]
                },
                {
                  "name": "Collaboration",
                  "elements": [{"name": "q5", "title": 12}]
                }
              ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn locale_resolution() {
        let p = prefs();
        let t: LocalizedText = serde_json::from_str(r#"{"es": "Hola", "pt-br": "Olá"}"#).unwrap();
        assert_eq!(t.resolve(&p), "Hola");
        let t: LocalizedText = serde_json::from_str(r#"{"fr": "Bonjour"}"#).unwrap();
        assert_eq!(t.resolve(&p), "");
        let t: LocalizedText = serde_json::from_str(r#"" Hello ""#).unwrap();
        assert_eq!(t.resolve(&p), "Hello");
        let t: LocalizedText = serde_json::from_str("42").unwrap();
        assert_eq!(t.resolve(&p), "");
    }

    #[test]
    fn page_entries_by_title() {
        let d = doc();
        assert_eq!(
            d.page_entries("Research", IndexMode::Title, &prefs()),
            vec![
                "Which research topics are covered?",
                "Is research funded?",
                "¿Quién investiga?",
                "Which research topics are covered?",
                "Do you publish?",
            ]
        );
    }

    #[test]
    fn page_entries_by_id() {
        let d = doc();
        assert_eq!(
            d.page_entries("Research", IndexMode::Id, &prefs()),
            vec!["EL-1", "q2", "3", "EL-1", "q4"]
        );
        // Matched by name when the page has no title.
        assert_eq!(d.page_entries("Collaboration", IndexMode::Id, &prefs()), vec!["q5"]);
        assert!(d.page_entries("Collaboration", IndexMode::Title, &prefs()).is_empty());
        assert!(d.page_entries("Missing", IndexMode::Title, &prefs()).is_empty());
    }

    #[test]
    fn sections_deduplicate() {
        let schema = ModuleSchema {
            key: "EL".to_string(),
            label: "Education Landscape".to_string(),
            schema_file: "unused.json".to_string(),
            mode: IndexMode::Title,
            subcategories: vec![
                SubcategoryConfig {
                    key: "EL_RES".to_string(),
                    label: "Research".to_string(),
                    pages: vec!["Research".to_string(), "Missing".to_string()],
                },
                SubcategoryConfig {
                    key: "EL_COLLAB".to_string(),
                    label: "Collaboration".to_string(),
                    pages: vec!["Collaboration".to_string()],
                },
            ],
        };
        let idx = index_module(&schema, &doc(), &prefs());
        assert_eq!(idx.sections.len(), 2);
        assert_eq!(
            idx.sections[0].entries,
            vec![
                "Which research topics are covered?",
                "Is research funded?",
                "¿Quién investiga?",
                "Do you publish?",
            ]
        );
        assert!(idx.sections[1].entries.is_empty());
        assert_eq!(idx.section("el_res").unwrap().key, "EL_RES");
        assert!(idx.section("EL_XX").is_none());
    }

    #[test]
    fn null_pages_and_elements() {
        let d: SurveyDocument = serde_json::from_str(
            r#"{"pages": [
                {"name": "p1", "title": "Research", "elements": null},
                {"name": "p2", "title": "Adoption", "elements": [{"name": "q", "title": "Q?"}]},
                {"name": 3, "elements": [{"name": "r", "title": "R?"}]},
                {"title": "Interoperability"}
            ]}"#,
        )
        .unwrap();
        assert!(d.page_entries("Research", IndexMode::Title, &prefs()).is_empty());
        assert_eq!(d.page_entries("Adoption", IndexMode::Title, &prefs()), vec!["Q?"]);
        // Numeric page names match by their text.
        assert_eq!(d.page_entries("3", IndexMode::Id, &prefs()), vec!["r"]);
        assert!(d.page_entries("Interoperability", IndexMode::Title, &prefs()).is_empty());

        let empty: SurveyDocument = serde_json::from_str(r#"{"pages": null}"#).unwrap();
        assert!(empty.page_entries("Adoption", IndexMode::Title, &prefs()).is_empty());
        let empty: SurveyDocument = serde_json::from_str("{}").unwrap();
        assert!(empty.page_entries("Adoption", IndexMode::Title, &prefs()).is_empty());
    }

    #[test]
    fn missing_schema_file() {
        let err = read_survey("EL", Path::new("/nonexistent/schema.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaUnavailable);
        assert_eq!(err.status(), 404);
        assert!(err.to_string().contains("/nonexistent/schema.json"));
    }

    #[test]
    fn malformed_schema_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{\"pages\": [").unwrap();
        let err = read_survey("OA", &path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaUnavailable);
    }
}
