/*!

This is the long-form manual for `survey_tally` and `surveydash`.

## Input formats

### Survey exports

Exports are Excel workbooks (.xlsx) with one row per answer. The sheet named
`Answers` is used when present, otherwise the first sheet. The first row is the
header, and three columns are read by name:

|  Item ID | Item Title                     | User Input               |
|----------|--------------------------------|--------------------------|
| Q1       | Which materials do you use?    | Steel; Concrete; Timber  |
| Q1       | Which materials do you use?    | Steel                    |
| Q2       | Comments                       | We use BIM, mostly       |

The answers of a question are grouped by `Item ID`, or by `Item Title` when the
identifier is missing. Rows with neither are skipped.

A multi-select answer is split on semicolons, else on pipes, else on commas
when there are at least two of them. The rule is a [`SplitPolicy`](crate::split::SplitPolicy)
and can be replaced. An empty answer is counted as `(blank)`.

The file name binds an export to a module and a country:

```text
EL - ECU XLSX Report - Jan2024.xlsx
OA-PER XLSX Report.xlsx
PE - ALL XLSX Report - final.xlsx
```

The module is two letters, the country two or three letters or `ALL`. Case is
ignored and both are reported in upper case. Other files are ignored.

### Survey schemas

Schemas are JSON documents with an ordered list of pages, each with a title and
a list of elements:

```text
{
  "pages": [
    {
      "name": "page1",
      "title": { "default": "Research", "es": "Investigación" },
      "elements": [
        { "name": "q12", "questionId": "EL-12", "title": "Which research topics are covered?" }
      ]
    }
  ]
}
```

Titles are either plain strings or per-locale maps. A per-locale map is read in
the order `default`, `en`, `es`, `pt-br`. Panels (elements that have their own
`elements`) contribute their children.

A module groups pages into sections. A section lists either the titles of its
questions (`indexBy: "title"`) or their identifiers (`indexBy: "id"`, taken from
`questionId`, else `name`).

## Configuration

`surveydash` comes with defaults for the Education Landscape (EL) and
Organisational Adoption (OA) schemas. All of them can be changed with a JSON
configuration file:

```text
{
  "dataDirectory": "data",
  "defaultModule": "EL",
  "minCommasForSplit": 2,
  "moduleLabels": { "EL": "Education Landscape" },
  "schemas": [
    {
      "key": "EL",
      "label": "Education Landscape",
      "schemaFile": "JSON file Education Landscape v2.json",
      "indexBy": "title",
      "subcategories": [
        { "key": "EL_RES", "label": "Research", "pages": ["Research"] }
      ]
    }
  ]
}
```

Relative paths are resolved against the directory of the configuration file.

 */
