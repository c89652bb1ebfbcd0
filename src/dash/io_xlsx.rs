use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use std::collections::HashMap;
use std::path::Path;

use survey_tally::AnswerRow;

use crate::dash::*;

/// The answer rows of one export, with the name of the sheet they come from.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AnswerSheet {
    pub sheet_name: String,
    pub rows: Vec<AnswerRow>,
}

/// Renders a cell as text. Whole numbers print without a fractional part.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => "".to_string(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        x => x.to_string().trim().to_string(),
    }
}

/// Picks the sheet named `preferred` if there is one, else the first sheet.
pub fn choose_sheet(sheet_names: &[String], preferred: &str) -> Option<String> {
    sheet_names
        .iter()
        .find(|s| s.as_str() == preferred)
        .or_else(|| sheet_names.first())
        .cloned()
}

/// Given the header of a sheet, finds the position of each requested column.
/// Columns that are not in the header are `None`.
pub fn get_col_index_mapping(req_col_names: &[&str], header: &[Data]) -> Vec<Option<usize>> {
    let col_names: HashMap<String, usize> = header
        .iter()
        .enumerate()
        .rev()
        .filter_map(|(idx, x)| match x {
            Data::String(s) => Some((s.trim().to_string(), idx)),
            _ => None,
        })
        .collect();
    debug!("get_col_index_mapping: col_names: {:?}", col_names);
    req_col_names
        .iter()
        .map(|cname| col_names.get(cname.trim()).cloned())
        .collect()
}

fn get_range(path: &Path, preferred_sheet: &str) -> DashResult<(String, Range<Data>)> {
    let display_path = path.display().to_string();
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu {
        path: display_path.clone(),
    })?;
    let sheet_names = workbook.sheet_names();
    debug!("get_range: path: {:?} sheets: {:?}", display_path, sheet_names);
    let sheet_name = choose_sheet(&sheet_names, preferred_sheet).context(DatasetUnreadableSnafu {
        path: display_path.clone(),
        reason: "the workbook has no sheet",
    })?;
    let wrange = workbook
        .worksheet_range(&sheet_name)
        .context(OpeningExcelSnafu { path: display_path })?;
    Ok((sheet_name, wrange))
}

/// Reads the answer rows of an export.
///
/// The first row of the sheet is the header; the identifier, title and answer
/// columns are found by name. Rows with neither identifier nor title are kept:
/// the aggregator decides what to skip.
pub fn read_answer_sheet(path: &Path, settings: &Settings) -> DashResult<AnswerSheet> {
    let display_path = path.display().to_string();
    let (sheet_name, wrange) = get_range(path, &settings.answers_sheet)?;

    let mut iter = wrange.rows();
    let header = iter.next().context(DatasetUnreadableSnafu {
        path: display_path.clone(),
        reason: format!("sheet {:?} is empty", sheet_name),
    })?;
    debug!("read_answer_sheet: header: {:?}", header);

    let cols = &settings.columns;
    let idxs = get_col_index_mapping(
        &[
            cols.item_id.as_str(),
            cols.item_title.as_str(),
            cols.user_input.as_str(),
        ],
        header,
    );
    let (id_idx, title_idx, input_idx) = (idxs[0], idxs[1], idxs[2]);
    ensure!(
        id_idx.is_some() || title_idx.is_some(),
        DatasetUnreadableSnafu {
            path: display_path.clone(),
            reason: format!(
                "sheet {:?} has neither a {:?} nor a {:?} column",
                sheet_name, cols.item_id, cols.item_title
            ),
        }
    );
    if input_idx.is_none() {
        warn!(
            "read_answer_sheet: {:?}: no {:?} column, all the answers will be blank",
            display_path, cols.user_input
        );
    }

    let cell = |row: &[Data], idx: Option<usize>| -> String {
        idx.and_then(|i| row.get(i))
            .map(cell_to_string)
            .unwrap_or_default()
    };

    let mut rows: Vec<AnswerRow> = Vec::new();
    for row in iter {
        rows.push(AnswerRow::new(
            &cell(row, id_idx),
            &cell(row, title_idx),
            &cell(row, input_idx),
        ));
    }
    info!(
        "read_answer_sheet: {:?}: {} rows in sheet {:?}",
        simplify_file_name(path),
        rows.len(),
        sheet_name
    );
    Ok(AnswerSheet { sheet_name, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells() {
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&Data::String("  Yes ".to_string())), "Yes");
        assert_eq!(cell_to_string(&Data::Float(5.0)), "5");
        assert_eq!(cell_to_string(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_to_string(&Data::Int(12)), "12");
        assert_eq!(cell_to_string(&Data::Bool(true)), "true");
    }

    #[test]
    fn sheet_choice() {
        let names = vec!["Summary".to_string(), "Answers".to_string()];
        assert_eq!(choose_sheet(&names, "Answers").as_deref(), Some("Answers"));
        assert_eq!(choose_sheet(&names, "Responses").as_deref(), Some("Summary"));
        assert_eq!(choose_sheet(&[], "Answers"), None);
    }

    #[test]
    fn header_mapping() {
        let header = vec![
            Data::String("Respondent".to_string()),
            Data::String(" Item Title ".to_string()),
            Data::Empty,
            Data::String("Item ID".to_string()),
            Data::String("Item ID".to_string()),
        ];
        assert_eq!(
            get_col_index_mapping(&["Item ID", "Item Title", "User Input"], &header),
            vec![Some(3), Some(1), None]
        );
    }
}
