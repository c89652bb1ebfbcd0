// ********* Input data structures ***********

/// The label used for an answer cell that was left empty.
pub const BLANK_LABEL: &str = "(blank)";

/// One respondent's answer to one question, as read from an export.
///
/// The strings are expected to be trimmed already. A row with neither an
/// identifier nor a title cannot be attributed to a question and is skipped
/// by the aggregator.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct AnswerRow {
    pub item_id: String,
    pub item_title: String,
    pub raw_input: String,
}

impl AnswerRow {
    pub fn new(item_id: &str, item_title: &str, raw_input: &str) -> AnswerRow {
        AnswerRow {
            item_id: item_id.trim().to_string(),
            item_title: item_title.trim().to_string(),
            raw_input: raw_input.trim().to_string(),
        }
    }

    /// The key that groups rows into one question: the identifier when
    /// present, the title otherwise.
    pub fn question_key(&self) -> Option<&str> {
        if !self.item_id.is_empty() {
            Some(self.item_id.as_str())
        } else if !self.item_title.is_empty() {
            Some(self.item_title.as_str())
        } else {
            None
        }
    }
}

// ******** Output data structures *********

/// The number of occurrences of one distinct answer.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SeriesPoint {
    pub name: String,
    pub value: u64,
}

/// The finalized frequency table of one question.
///
/// Invariant: `total` is the sum of the values in `series`, and `series` is
/// sorted by decreasing value (ties keep the order in which the labels were
/// first seen).
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SummaryQuestion {
    pub key: String,
    pub item_id: String,
    pub title: String,
    pub total: u64,
    pub series: Vec<SeriesPoint>,
}

// ********* Schema **********

/// How the questions of a module are identified in its schema.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum IndexMode {
    /// The export only carries the question text reliably.
    Title,
    /// The export and the schema share a stable question identifier.
    Id,
}

impl IndexMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexMode::Title => "title",
            IndexMode::Id => "id",
        }
    }
}

/// A group of questions within a module, as defined by a survey schema.
///
/// `entries` holds question titles or identifiers depending on `mode`, in the
/// order in which the schema lists them, without duplicates.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SchemaSection {
    pub key: String,
    pub label: String,
    pub mode: IndexMode,
    pub pages: Vec<String>,
    pub entries: Vec<String>,
}

/// Questions of a module distributed over its sections.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SectionGroup {
    pub key: String,
    pub label: String,
    pub questions: Vec<SummaryQuestion>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct GroupedSummary {
    pub sections: Vec<SectionGroup>,
    /// The questions that no section claims, in input order.
    pub unassigned: Vec<SummaryQuestion>,
}
