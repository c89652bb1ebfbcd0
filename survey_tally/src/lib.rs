/*!
Frequency summaries of survey answers.

This crate turns the raw answer rows of a survey export into one frequency
table per question, and matches those questions against the sections of a
survey schema.

```
use survey_tally::*;

let rows = vec![
    AnswerRow::new("Q1", "Which materials do you use?", "Steel; Concrete; Timber"),
    AnswerRow::new("Q1", "Which materials do you use?", "Steel"),
    AnswerRow::new("Q2", "Comments", ""),
];
let questions = summarize(&rows, &split::DelimiterHeuristic::DEFAULT);

assert_eq!(questions[0].key, "Q1");
assert_eq!(questions[0].total, 4);
assert_eq!(questions[1].series[0].name, BLANK_LABEL);
```

See the [manual] for the input formats.
*/

mod config;

pub mod builder;
pub mod manual;
pub mod reconcile;
pub mod split;

use log::info;

pub use crate::config::*;
pub use crate::reconcile::{filter_search, filter_section, group_by_section, reconcile};

use crate::builder::Builder;
use crate::split::SplitPolicy;

/// Aggregates the answer rows of one export.
///
/// Arguments:
/// * `rows` the answers, one per respondent and question
/// * `policy` decides which answers hold several choices
///
/// The questions are sorted by decreasing total, and the series of each
/// question by decreasing count.
pub fn summarize(rows: &[AnswerRow], policy: &dyn SplitPolicy) -> Vec<SummaryQuestion> {
    let mut builder = Builder::with_policy(|v: &str| policy.delimiter(v));
    builder.add_rows(rows);
    info!(
        "summarize: {} rows read, {} skipped",
        builder.rows_read(),
        builder.rows_skipped()
    );
    builder.finish()
}
