use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug)]
pub(crate) struct ImportedRow {
    pub(crate) line: u64,
    pub(crate) student_id: String,
    pub(crate) name: String,
    pub(crate) year_group: String,
    pub(crate) subject: String,
    pub(crate) code: String,
    pub(crate) grade: String,
    pub(crate) points: u32,
    pub(crate) status: Option<String>,
    pub(crate) board: Option<String>,
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<ImportedRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut record = csv::StringRecord::new();
    let mut rows = Vec::new();

    while csv_reader.read_record(&mut record)? {
        // Starting line of the record, so quoted multi-line fields do not shift later rows.
        let line = record.position().map_or(0, |position| position.line());
        let row: ResultRow = record.deserialize(Some(&headers))?;
        rows.push(ImportedRow {
            line,
            student_id: row.student_id,
            name: row.name,
            year_group: row.year_group.unwrap_or_default(),
            subject: row.subject,
            code: row.code.unwrap_or_default(),
            grade: row.grade.unwrap_or_default(),
            points: row.points.unwrap_or(0),
            status: row.status,
            board: row.board,
        });
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct ResultRow {
    #[serde(rename = "Student ID")]
    student_id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(
        rename = "Year Group",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    year_group: Option<String>,
    #[serde(rename = "Subject")]
    subject: String,
    #[serde(rename = "Code", default, deserialize_with = "empty_string_as_none")]
    code: Option<String>,
    #[serde(rename = "Grade", default, deserialize_with = "empty_string_as_none")]
    grade: Option<String>,
    #[serde(rename = "Points", default, deserialize_with = "empty_string_as_points")]
    points: Option<u32>,
    #[serde(rename = "Status", default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
    #[serde(rename = "Board", default, deserialize_with = "empty_string_as_none")]
    board: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn empty_string_as_points<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match empty_string_as_none(deserializer)? {
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid points value '{raw}'"))),
        None => Ok(None),
    }
}
