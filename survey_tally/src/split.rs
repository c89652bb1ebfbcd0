/*!
Splitting of multi-select answers.

Survey exports store the choices of a multi-select question in a single cell,
joined with a delimiter. Nothing in the cell says whether it holds one answer
or several, so the decision is a policy: [`SplitPolicy`] picks the delimiter
(if any) for a value, and [`split_answers`] applies it.

```
use survey_tally::split::{split_answers, DelimiterHeuristic};

let policy = DelimiterHeuristic::DEFAULT;
assert_eq!(
    split_answers(&policy, "Steel; Concrete; Timber"),
    vec!["Steel", "Concrete", "Timber"]
);
// A single comma is ordinary prose.
assert_eq!(split_answers(&policy, "Yes, mostly").len(), 1);
```
*/

/// Decides whether a raw answer holds several choices.
///
/// Any `Fn(&str) -> Option<char>` closure is a policy.
pub trait SplitPolicy {
    /// The delimiter that separates the choices in `value`, or `None` if the
    /// value is a single answer.
    fn delimiter(&self, value: &str) -> Option<char>;
}

impl<F> SplitPolicy for F
where
    F: Fn(&str) -> Option<char>,
{
    fn delimiter(&self, value: &str) -> Option<char> {
        self(value)
    }
}

/// The delimiter heuristic used by the dashboard exports.
///
/// In order of precedence: a semicolon, a pipe, then a comma if there are at
/// least `min_commas` of them.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct DelimiterHeuristic {
    pub min_commas: usize,
}

impl DelimiterHeuristic {
    pub const DEFAULT: DelimiterHeuristic = DelimiterHeuristic { min_commas: 2 };
}

impl Default for DelimiterHeuristic {
    fn default() -> Self {
        DelimiterHeuristic::DEFAULT
    }
}

impl SplitPolicy for DelimiterHeuristic {
    fn delimiter(&self, value: &str) -> Option<char> {
        if value.contains(';') {
            Some(';')
        } else if value.contains('|') {
            Some('|')
        } else if self.min_commas > 0 && value.matches(',').count() >= self.min_commas {
            Some(',')
        } else {
            None
        }
    }
}

/// Splits a raw answer into its trimmed, non-empty choices.
///
/// An empty (or all-whitespace) value gives no choices. The fragments of a
/// split are split again with the same policy, so that no returned fragment
/// would be split any further: `"a|b; c"` gives `["a", "b", "c"]`.
pub fn split_answers(policy: &dyn SplitPolicy, value: &str) -> Vec<String> {
    let mut res: Vec<String> = Vec::new();
    split_into(policy, value, &mut res);
    res
}

fn split_into(policy: &dyn SplitPolicy, value: &str, res: &mut Vec<String>) {
    let v = value.trim();
    if v.is_empty() {
        return;
    }
    match policy.delimiter(v) {
        Some(delim) if v.contains(delim) => {
            for fragment in v.split(delim) {
                split_into(policy, fragment, res);
            }
        }
        _ => res.push(v.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn split(s: &str) -> Vec<String> {
        split_answers(&DelimiterHeuristic::DEFAULT, s)
    }

    #[test]
    fn semicolons() {
        assert_eq!(split("Steel; Concrete; Timber"), vec!["Steel", "Concrete", "Timber"]);
    }

    #[test]
    fn pipes() {
        assert_eq!(split("Revit|ArchiCAD | Tekla"), vec!["Revit", "ArchiCAD", "Tekla"]);
    }

    #[test]
    fn single_comma_is_prose() {
        assert_eq!(
            split("We use BIM, mostly for clash detection and it works"),
            vec!["We use BIM, mostly for clash detection and it works"]
        );
    }

    #[test]
    fn two_commas_split() {
        assert_eq!(
            split("We use BIM, mostly for clash detection, and it works"),
            vec!["We use BIM", "mostly for clash detection", "and it works"]
        );
    }

    #[test]
    fn empty_and_whitespace() {
        assert!(split("").is_empty());
        assert!(split("   ").is_empty());
        assert!(split(" ; ;; ").is_empty());
    }

    #[test]
    fn empty_fragments_dropped() {
        assert_eq!(split(";Yes;;No;"), vec!["Yes", "No"]);
    }

    #[test]
    fn mixed_delimiters_refined() {
        assert_eq!(split("a|b; c"), vec!["a", "b", "c"]);
        assert_eq!(split("x, y, z; w"), vec!["x", "y", "z", "w"]);
        // One comma inside a semicolon fragment stays.
        assert_eq!(split("Yes, often; No"), vec!["Yes, often", "No"]);
    }

    #[test]
    fn custom_threshold() {
        let strict = DelimiterHeuristic { min_commas: 3 };
        assert_eq!(split_answers(&strict, "a, b, c").len(), 1);
        assert_eq!(split_answers(&strict, "a, b, c, d").len(), 4);
        let never = DelimiterHeuristic { min_commas: 0 };
        assert_eq!(split_answers(&never, "a, b, c, d").len(), 1);
    }

    #[test]
    fn closure_policy() {
        let slash = |v: &str| if v.contains('/') { Some('/') } else { None };
        assert_eq!(split_answers(&slash, "Yes / No"), vec!["Yes", "No"]);
        assert_eq!(split_answers(&slash, "a; b"), vec!["a; b"]);
    }

    #[test]
    fn policy_returning_absent_delimiter() {
        let bogus = |_: &str| Some('#');
        assert_eq!(split_answers(&bogus, "plain"), vec!["plain"]);
    }

    proptest! {
        #[test]
        fn fragments_are_stable(s in "[a-c ,;|]{0,24}") {
            for fragment in split(&s) {
                prop_assert_eq!(split(&fragment), vec![fragment.clone()]);
            }
        }

        #[test]
        fn fragments_are_trimmed_and_non_empty(s in "\\PC{0,40}") {
            for fragment in split(&s) {
                prop_assert!(!fragment.is_empty());
                prop_assert_eq!(fragment.trim(), fragment.as_str());
            }
        }
    }
}
