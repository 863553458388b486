use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use log::info;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::filter::MC_DELIMITER;
use super::model::{Question, QuestionType, Respondent, ResponseTable, SurveySchema};

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

// ---------------------------------------------------------------------------
// Schema table
// ---------------------------------------------------------------------------

/// Load the question schema.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header `column,question_text,type`
/// * `.json` – `[{ "column": ..., "question_text": ..., "type": "SC" }, ...]`
pub fn load_schema(path: &Path) -> Result<SurveySchema> {
    let questions = match extension_of(path).as_str() {
        "csv" => load_schema_csv(path),
        "json" => load_schema_json(path),
        other => bail!("Unsupported schema file extension: .{other}"),
    }
    .with_context(|| format!("loading schema from {}", path.display()))?;

    let schema = SurveySchema::from_questions(questions)
        .with_context(|| format!("validating schema {}", path.display()))?;
    info!("Loaded schema with {} questions from {}", schema.len(), path.display());
    Ok(schema)
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    column: String,
    question_text: String,
    #[serde(rename = "type")]
    question_type: String,
}

impl RawQuestion {
    fn into_question(self, row: usize) -> Result<Question> {
        let question_type: QuestionType = self
            .question_type
            .parse()
            .with_context(|| format!("Schema row {row} ('{}')", self.column))?;
        Ok(Question {
            column: self.column.trim().to_string(),
            question_text: self.question_text.trim().to_string(),
            question_type,
        })
    }
}

fn load_schema_csv(path: &Path) -> Result<Vec<Question>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    for required in ["column", "question_text", "type"] {
        if !headers.iter().any(|h| h == required) {
            bail!("schema CSV missing '{required}' column");
        }
    }

    let mut questions = Vec::new();
    for (row_no, result) in reader.deserialize::<RawQuestion>().enumerate() {
        let raw = result.with_context(|| format!("CSV row {row_no}"))?;
        questions.push(raw.into_question(row_no)?);
    }
    Ok(questions)
}

fn load_schema_json(path: &Path) -> Result<Vec<Question>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let raw: Vec<RawQuestion> = serde_json::from_str(&text).context("parsing JSON")?;
    raw.into_iter()
        .enumerate()
        .map(|(row, q)| q.into_question(row))
        .collect()
}

// ---------------------------------------------------------------------------
// Response table
// ---------------------------------------------------------------------------

/// Load the respondent rows.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`      – header row of question columns, one row per respondent
/// * `.json`     – `[{ "Age": "25-34", "Languages": "Rust;Go" }, ...]`
/// * `.parquet`  – one column per question; values are read as text
///
/// Every cell is kept as its raw string. Nulls become empty strings, which
/// the missing-value policy treats as "no answer".
pub fn load_responses(path: &Path) -> Result<ResponseTable> {
    let table = match extension_of(path).as_str() {
        "csv" => load_responses_csv(path),
        "json" => load_responses_json(path),
        "parquet" | "pq" => load_responses_parquet(path),
        other => bail!("Unsupported response file extension: .{other}"),
    }
    .with_context(|| format!("loading responses from {}", path.display()))?;

    info!(
        "Loaded {} respondents and {} columns from {}",
        table.len(),
        table.columns().len(),
        path.display()
    );
    Ok(table)
}

fn load_responses_csv(path: &Path) -> Result<ResponseTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut respondents = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        respondents.push(Respondent {
            cells: record.iter().map(str::to_string).collect(),
        });
    }

    ResponseTable::from_rows(headers, respondents)
}

/// Records-oriented JSON (`df.to_json(orient='records')`). Columns are the
/// union of keys over all records; absent keys read as missing and arrays
/// are joined with the multiple-choice delimiter.
fn load_responses_json(path: &Path) -> Result<ResponseTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let respondents = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| Respondent {
            cells: columns
                .iter()
                .map(|col| obj.get(col).map(json_to_cell).unwrap_or_default())
                .collect(),
        })
        .collect();

    ResponseTable::from_rows(columns, respondents)
}

fn json_to_cell(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        JsonValue::Array(items) => items
            .iter()
            .map(json_to_cell)
            .collect::<Vec<_>>()
            .join(&MC_DELIMITER.to_string()),
        other => other.to_string(),
    }
}

/// Load a Parquet file written by Pandas (`df.to_parquet()`) or Polars.
/// Non-string columns are cast to text with Arrow's cast kernel.
fn load_responses_parquet(path: &Path) -> Result<ResponseTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut respondents = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let n_rows = batch.num_rows();

        let text_columns = batch
            .columns()
            .iter()
            .zip(&columns)
            .map(|(col, name)| {
                cast(col, &DataType::Utf8)
                    .map_err(|e| anyhow!("Column '{name}' cannot be read as text: {e}"))
            })
            .collect::<Result<Vec<_>>>()?;

        for row in 0..n_rows {
            let cells = text_columns
                .iter()
                .map(|col| {
                    if col.is_null(row) {
                        String::new()
                    } else {
                        col.as_string::<i32>().value(row).to_string()
                    }
                })
                .collect();
            respondents.push(Respondent { cells });
        }
    }

    ResponseTable::from_rows(columns, respondents)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use arrow::array::{BooleanArray, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::TempDir;

    use super::*;

    fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn schema_csv_loads_in_order() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "schema.csv",
            "column,question_text,type\n\
             Age,What is your age?,SC\n\
             Languages,\"Which languages, if any?\",mc\n\
             Notes,Anything else?,TE\n",
        );
        let schema = load_schema(&path).unwrap();
        let cols: Vec<&str> = schema.questions().iter().map(|q| q.column.as_str()).collect();
        assert_eq!(cols, vec!["Age", "Languages", "Notes"]);
        assert_eq!(
            schema.get("Languages").unwrap().question_text,
            "Which languages, if any?"
        );
        assert_eq!(
            schema.get("Languages").unwrap().question_type,
            QuestionType::MultipleChoice
        );
    }

    #[test]
    fn schema_with_bad_type_fails() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "schema.csv", "column,question_text,type\nAge,How old?,XX\n");
        let err = load_schema(&path).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("Schema row 0"), "{msg}");
        assert!(msg.contains("unknown question type 'XX'"), "{msg}");
    }

    #[test]
    fn schema_missing_header_fails() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "schema.csv", "column,question_text\nAge,How old?\n");
        let err = load_schema(&path).unwrap_err();
        assert!(format!("{err:#}").contains("missing 'type' column"));
    }

    #[test]
    fn schema_json_loads() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "schema.json",
            r#"[{"column": "Age", "question_text": "How old?", "type": "SC"}]"#,
        );
        let schema = load_schema(&path).unwrap();
        assert_eq!(schema.len(), 1);
    }

    #[test]
    fn missing_file_and_unknown_extension_fail() {
        let dir = TempDir::new().unwrap();
        assert!(load_schema(&dir.path().join("absent.csv")).is_err());
        let path = write(&dir, "schema.txt", "column,question_text,type\n");
        let err = load_schema(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Unsupported schema file extension: .txt"));
    }

    #[test]
    fn responses_csv_keeps_raw_cells() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "responses.csv",
            "Age,Languages\n25-34,\"Python;JavaScript\"\n,Python\nNA,\n",
        );
        let table = load_responses(&path).unwrap();
        assert_eq!(table.len(), 3);
        let langs = table.column_index("Languages").unwrap();
        assert_eq!(table.cell(0, langs), "Python;JavaScript");
        assert_eq!(table.cell(1, 0), "");
        assert_eq!(table.cell(2, 0), "NA");
    }

    #[test]
    fn responses_csv_with_ragged_rows_fails() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "responses.csv", "a,b,c\n\"unclosed,quote,x\n1,2,3\n");
        assert!(load_responses(&path).is_err());
    }

    #[test]
    fn responses_json_unions_columns() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "responses.json",
            r#"[{"Age": "25-34", "Years": 4}, {"Lang": ["Rust", "Go"], "Age": null}]"#,
        );
        let table = load_responses(&path).unwrap();
        assert_eq!(table.columns(), &["Age", "Years", "Lang"]);
        assert_eq!(table.cell(0, 1), "4");
        assert_eq!(table.cell(0, 2), "");
        assert_eq!(table.cell(1, 0), "");
        assert_eq!(table.cell(1, 2), "Rust;Go");
    }

    #[test]
    fn responses_parquet_reads_values_as_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("responses.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("Age", DataType::Utf8, true),
            Field::new("Years", DataType::Int64, true),
            Field::new("Remote", DataType::Boolean, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("25-34"), None])),
                Arc::new(Int64Array::from(vec![Some(3), Some(12)])),
                Arc::new(BooleanArray::from(vec![true, false])),
            ],
        )
        .unwrap();
        let file = fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_responses(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 0), "25-34");
        assert_eq!(table.cell(1, 0), "");
        assert_eq!(table.cell(1, 1), "12");
        assert_eq!(table.cell(0, 2), "true");
    }
}
