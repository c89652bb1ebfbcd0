use log::debug;
use std::collections::HashSet;

pub use crate::config::*;

/// A case-insensitive set of question titles or identifiers.
///
/// An empty allow-list lets every question through: a module without a
/// curated schema is browsed unfiltered.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    entries: HashSet<String>,
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

impl AllowList {
    pub fn new<S: AsRef<str>>(entries: &[S]) -> AllowList {
        AllowList {
            entries: entries
                .iter()
                .map(|s| normalize(s.as_ref()))
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the question's title or identifier is listed.
    pub fn admits(&self, question: &SummaryQuestion) -> bool {
        self.is_empty() || self.lists(question)
    }

    fn lists(&self, question: &SummaryQuestion) -> bool {
        let title = normalize(&question.title);
        let item_id = normalize(&question.item_id);
        (!title.is_empty() && self.entries.contains(&title))
            || (!item_id.is_empty() && self.entries.contains(&item_id))
    }
}

/// Keeps the questions whose title or identifier the section lists.
pub fn filter_section(questions: &[SummaryQuestion], entries: &[String]) -> Vec<SummaryQuestion> {
    let allow = AllowList::new(entries);
    let res: Vec<SummaryQuestion> = questions
        .iter()
        .filter(|q| allow.admits(q))
        .cloned()
        .collect();
    debug!(
        "filter_section: kept {} of {} questions ({} section entries)",
        res.len(),
        questions.len(),
        entries.len()
    );
    res
}

/// Keeps the questions whose title or identifier contains `query`, ignoring
/// case. A blank query keeps everything.
pub fn filter_search(questions: &[SummaryQuestion], query: &str) -> Vec<SummaryQuestion> {
    let q = normalize(query);
    if q.is_empty() {
        return questions.to_vec();
    }
    questions
        .iter()
        .filter(|x| x.title.to_lowercase().contains(&q) || x.item_id.to_lowercase().contains(&q))
        .cloned()
        .collect()
}

/// Applies the section filter, then the free-text search.
///
/// `section` is the list of titles or identifiers of the selected section;
/// `None` and an empty list both mean no section filter.
pub fn reconcile(
    questions: &[SummaryQuestion],
    section: Option<&[String]>,
    search: Option<&str>,
) -> Vec<SummaryQuestion> {
    let by_section = match section {
        Some(entries) => filter_section(questions, entries),
        None => questions.to_vec(),
    };
    match search {
        Some(query) => filter_search(&by_section, query),
        None => by_section,
    }
}

/// Distributes the questions over the sections of a module.
///
/// A question goes to the first section that lists it. Sections without any
/// entry claim nothing here, and the questions that no section lists end up
/// in `unassigned`. The input order is preserved everywhere.
pub fn group_by_section(questions: &[SummaryQuestion], sections: &[SchemaSection]) -> GroupedSummary {
    let lists: Vec<AllowList> = sections.iter().map(|s| AllowList::new(&s.entries)).collect();
    let mut groups: Vec<SectionGroup> = sections
        .iter()
        .map(|s| SectionGroup {
            key: s.key.clone(),
            label: s.label.clone(),
            questions: Vec::new(),
        })
        .collect();
    let mut unassigned: Vec<SummaryQuestion> = Vec::new();

    for q in questions {
        match lists.iter().position(|l| l.lists(q)) {
            Some(idx) => groups[idx].questions.push(q.clone()),
            None => unassigned.push(q.clone()),
        }
    }
    GroupedSummary {
        sections: groups,
        unassigned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(item_id: &str, title: &str, total: u64) -> SummaryQuestion {
        SummaryQuestion {
            key: if item_id.is_empty() { title } else { item_id }.to_string(),
            item_id: item_id.to_string(),
            title: title.to_string(),
            total,
            series: vec![SeriesPoint {
                name: "Yes".to_string(),
                value: total,
            }],
        }
    }

    fn sample() -> Vec<SummaryQuestion> {
        vec![
            question("Q1", "Does your institution teach BIM?", 10),
            question("", "Which research topics are covered?", 8),
            question("Q3", "How long are the short courses?", 5),
        ]
    }

    fn keys(qs: &[SummaryQuestion]) -> Vec<&str> {
        qs.iter().map(|q| q.key.as_str()).collect()
    }

    #[test]
    fn section_by_title_ignores_case_and_spaces() {
        let entries = vec!["  which RESEARCH topics are covered? ".to_string()];
        let res = filter_section(&sample(), &entries);
        assert_eq!(keys(&res), vec!["Which research topics are covered?"]);
    }

    #[test]
    fn section_by_id() {
        let entries = vec!["q3".to_string(), "Q1".to_string()];
        let res = filter_section(&sample(), &entries);
        assert_eq!(keys(&res), vec!["Q1", "Q3"]);
    }

    #[test]
    fn empty_section_is_unfiltered() {
        let res = filter_section(&sample(), &[]);
        assert_eq!(res, sample());
        let blanks = vec!["  ".to_string()];
        assert_eq!(filter_section(&sample(), &blanks), sample());
    }

    #[test]
    fn unknown_entries_filter_everything() {
        let entries = vec!["Not a question".to_string()];
        assert!(filter_section(&sample(), &entries).is_empty());
    }

    #[test]
    fn search_narrows_section() {
        let entries = vec!["Q1".to_string(), "Q3".to_string()];
        let res = reconcile(&sample(), Some(&entries), Some("COURSES"));
        assert_eq!(keys(&res), vec!["Q3"]);
        // The search never brings back a question the section excluded.
        let res = reconcile(&sample(), Some(&entries), Some("research"));
        assert!(res.is_empty());
    }

    #[test]
    fn search_matches_identifier() {
        let res = filter_search(&sample(), "q1");
        assert_eq!(keys(&res), vec!["Q1"]);
        assert_eq!(filter_search(&sample(), "   ").len(), 3);
    }

    #[test]
    fn reconcile_without_filters() {
        assert_eq!(reconcile(&sample(), None, None), sample());
    }

    #[test]
    fn grouping() {
        let sections = vec![
            SchemaSection {
                key: "RES".to_string(),
                label: "Research".to_string(),
                mode: IndexMode::Title,
                pages: vec!["Research".to_string()],
                entries: vec!["Which research topics are covered?".to_string()],
            },
            SchemaSection {
                key: "EMPTY".to_string(),
                label: "Empty".to_string(),
                mode: IndexMode::Title,
                pages: vec![],
                entries: vec![],
            },
            SchemaSection {
                key: "ALL".to_string(),
                label: "Everything by id".to_string(),
                mode: IndexMode::Id,
                pages: vec![],
                entries: vec!["Q1".to_string(), "Which research topics are covered?".to_string()],
            },
        ];
        let grouped = group_by_section(&sample(), &sections);
        assert_eq!(grouped.sections.len(), 3);
        assert_eq!(keys(&grouped.sections[0].questions), vec!["Which research topics are covered?"]);
        assert!(grouped.sections[1].questions.is_empty());
        assert_eq!(keys(&grouped.sections[2].questions), vec!["Q1"]);
        assert_eq!(keys(&grouped.unassigned), vec!["Q3"]);
    }
}
