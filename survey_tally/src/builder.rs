use log::{debug, warn};
use std::collections::HashMap;

pub use crate::config::*;
use crate::split::{split_answers, DelimiterHeuristic, SplitPolicy};

/// Accumulates answer rows into per-question frequency tables.
///
/// ```
/// use survey_tally::builder::Builder;
/// use survey_tally::AnswerRow;
///
/// let mut builder = Builder::new();
/// builder.add_row(&AnswerRow::new("Q1", "Materials used", "Steel; Concrete"));
/// builder.add_row(&AnswerRow::new("Q1", "Materials used", "Steel"));
///
/// let questions = builder.finish();
/// assert_eq!(questions[0].total, 3);
/// assert_eq!(questions[0].series[0].name, "Steel");
/// ```
pub struct Builder<'a> {
    policy: Box<dyn SplitPolicy + 'a>,
    blank_label: String,
    // Questions in the order they were first seen.
    questions: Vec<QuestionTally>,
    by_key: HashMap<String, usize>,
    rows_read: u64,
    rows_skipped: u64,
}

// Counts for one question. The labels keep their first-seen order, which is
// the tie-break of the final sort.
#[derive(Debug, Clone)]
struct QuestionTally {
    key: String,
    item_id: String,
    title: String,
    total: u64,
    counts: Vec<(String, u64)>,
    by_label: HashMap<String, usize>,
}

impl QuestionTally {
    fn add(&mut self, label: String) {
        self.total += 1;
        if let Some(idx) = self.by_label.get(&label) {
            self.counts[*idx].1 += 1;
        } else {
            self.by_label.insert(label.clone(), self.counts.len());
            self.counts.push((label, 1));
        }
    }

    fn finish(self) -> SummaryQuestion {
        let mut counts = self.counts;
        // sort_by is stable: equal counts stay in first-seen order.
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        SummaryQuestion {
            key: self.key,
            item_id: self.item_id,
            title: self.title,
            total: self.total,
            series: counts
                .into_iter()
                .map(|(name, value)| SeriesPoint { name, value })
                .collect(),
        }
    }
}

impl Default for Builder<'static> {
    fn default() -> Self {
        Builder::new()
    }
}

impl Builder<'static> {
    /// A builder with the default delimiter heuristic.
    pub fn new() -> Builder<'static> {
        Builder::with_policy(DelimiterHeuristic::DEFAULT)
    }
}

impl<'a> Builder<'a> {
    pub fn with_policy<P: SplitPolicy + 'a>(policy: P) -> Builder<'a> {
        Builder {
            policy: Box::new(policy),
            blank_label: BLANK_LABEL.to_string(),
            questions: Vec::new(),
            by_key: HashMap::new(),
            rows_read: 0,
            rows_skipped: 0,
        }
    }

    /// Replaces the label under which empty answers are counted.
    pub fn blank_label(mut self, label: &str) -> Builder<'a> {
        self.blank_label = label.to_string();
        self
    }

    /// Adds one answer row.
    ///
    /// Rows without identifier and title are skipped. An empty answer is
    /// counted as the blank label. A row whose answer splits into nothing
    /// (e.g. `";;"`) still registers its question, with no counts.
    pub fn add_row(&mut self, row: &AnswerRow) {
        self.rows_read += 1;
        let key = match row.question_key() {
            Some(k) => k.to_string(),
            None => {
                self.rows_skipped += 1;
                debug!("add_row: row {} has neither id nor title, skipping", self.rows_read);
                return;
            }
        };

        let idx = match self.by_key.get(&key) {
            Some(idx) => *idx,
            None => {
                let idx = self.questions.len();
                self.by_key.insert(key.clone(), idx);
                self.questions.push(QuestionTally {
                    key,
                    item_id: row.item_id.clone(),
                    title: row.item_title.clone(),
                    total: 0,
                    counts: Vec::new(),
                    by_label: HashMap::new(),
                });
                idx
            }
        };

        let raw = row.raw_input.trim();
        let raw = if raw.is_empty() {
            self.blank_label.as_str()
        } else {
            raw
        };
        let answers = split_answers(&*self.policy, raw);
        if answers.is_empty() {
            debug!(
                "add_row: answer {:?} for question {:?} has no content",
                row.raw_input, self.questions[idx].key
            );
        }
        for a in answers {
            self.questions[idx].add(a);
        }
    }

    pub fn add_rows<'r, I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = &'r AnswerRow>,
    {
        for row in rows {
            self.add_row(row);
        }
    }

    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    pub fn rows_skipped(&self) -> u64 {
        self.rows_skipped
    }

    /// Finalizes the tallies, sorted by decreasing total. Questions with the
    /// same total keep the order in which they were first seen.
    pub fn finish(self) -> Vec<SummaryQuestion> {
        if self.rows_skipped > 0 {
            warn!(
                "finish: skipped {} of {} rows without id or title",
                self.rows_skipped, self.rows_read
            );
        }
        let mut res: Vec<SummaryQuestion> =
            self.questions.into_iter().map(|q| q.finish()).collect();
        res.sort_by(|a, b| b.total.cmp(&a.total));
        res
    }
}
