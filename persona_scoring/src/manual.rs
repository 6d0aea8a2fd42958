/*!

This is the long-form manual for `persona_scoring` and `personaq`.

## Input formats

The following response formats are supported:
* `csv` Comma Separated Values, one row per participant
* `xlsx` Excel workbooks, as exported by Google Forms / Google Sheets
* `json` An array of response records, the format produced by the web front end

### `csv`

One row per participant. The expected columns are, in order: an optional
timestamp column, the participant identifier, the participant name, the team,
and then one column per question.

```text
timestamp,id,name,team,q1,q2,q3,q4
2024-06-03T09:15:00Z,123456,Alice Example,Platform,2,-2,0,0
2024-06-03T09:20:00Z,654321,Bob Example,Research,0,0,0,0
```

Answer cells hold either a raw scale value in {-2, -1, 0, 1, 2} or one of the
configured answer labels (see `answerLabels` below). The timestamp column is
controlled by the `timestampColumn` source setting and must be in RFC 3339
format when present; rows without a timestamp are stamped with the time of the
run. A header row is expected by default (`headerRow` setting).

### `xlsx`

The same row shape as `csv`, read from the first worksheet of the workbook, or
from the worksheet named by the `worksheetName` source setting (or the
`--excel-worksheet-name` flag). This is the format obtained from a Google
Forms collection through the `Create spreadsheet` option, with one question
per column. Timestamp cells must hold RFC 3339 text; native spreadsheet date
cells are not interpreted.

### `json`

An array of response records with the field names used by the web front end:

```text
[
  {
    "id": "123456",
    "name": "Alice Example",
    "team": "Platform",
    "answers": [2, -2, 0, 0],
    "completedAt": "2024-06-03T09:15:00Z"
  }
]
```

`completedAt` is optional and defaults to the time of the run.

## Configuration

`personaq` ships with a built-in questionnaire and accepts a JSON definition
file with the `--config` flag to replace it. The definition looks as follows:

```text
{
  "title": "Team working-style quiz",
  "personas": [
    {"key": "A", "name": "The craftsman", "description": "..."},
    {"key": "B", "name": "The harmonizer"}
  ],
  "teams": ["Platform", "Research"],
  "answerLabels": ["Strongly agree", "Agree", "Neutral", "Disagree", "Strongly disagree"],
  "questions": [
    {"text": "Prefers their own way of working", "weights": {"A": 2, "E": -1}},
    {"text": "Enjoys leading the team", "weights": {"LP": 2}}
  ],
  "source": {"headerRow": true, "timestampColumn": true, "worksheetName": "Form Responses 1"},
  "export": {"appsScriptUrl": "https://script.google.com/macros/s/.../exec"}
}
```

Notes:
- `personas` declares the category keys; every declared key appears in each
  result with an initial score of zero. Weight maps may reference undeclared
  keys, which materialize on first use.
- the weight key `LP` is reserved for the leader/player axis: a positive
  weight feeds the leader accumulator, a negative one the player accumulator.
- `answerLabels` lists the five scale labels from "strongly agree" (value 2)
  down to "strongly disagree" (value -2). It is only needed when response
  cells carry labels instead of raw values.
- `export.appsScriptUrl` is the row-append endpoint used by `--export`. The
  `--export-url` flag overrides it.

## Scoring

For every answered question, each `(key, weight)` pair of its weight map adds
`answer * weight` to the category total for `key`. Percentages are derived
once, at completion:

- the axis split is taken over `|leader| + |player|`, rounds the leader side
  and gives the player side the exact complement, so the pair always sums
  to 100 (50/50 when both accumulators are zero);
- category percentages are each rounded independently over the sum of
  absolute scores, so their total may drift slightly from 100 (an even
  `round(100/count)` split when all scores are zero). The drift is accepted
  and deliberately not corrected.

*/
