//! Tab-delimited answer sheet model.
//!
//! A sheet is pasted (or piped) straight out of a spreadsheet: one header
//! line naming the columns, then one tab-delimited line per student. Columns
//! whose header field is the reserved token `score` are not columns of their
//! own; they carry the score for the column immediately to their left.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved header token marking a score column.
pub const SCORE_TOKEN: &str = "score";
/// Placeholder serialized in place of a score that has not been set.
pub const UNSET_SCORE: &str = "?";

const DELIMITER: char = '\t';

/// A logical column of the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Column title as it appeared in the header line.
    pub title: String,
    /// Index of this column's value field in the raw field list.
    pub column: usize,
    /// Whether the raw field right after the value carries this column's score.
    pub has_score: bool,
}

/// One cell of a record: the student's text plus an optional score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Verbatim cell text.
    pub value: String,
    /// Score, if one has been recovered from the source or assigned by grading.
    pub score: Option<i64>,
}

impl Entry {
    /// Creates an entry with no score.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            score: None,
        }
    }

    /// Creates an entry that already carries a score.
    pub fn with_score(value: impl Into<String>, score: i64) -> Self {
        Self {
            value: value.into(),
            score: Some(score),
        }
    }
}

/// A parsed answer sheet: headings plus one record per student.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    headings: Vec<Heading>,
    records: Vec<Vec<Entry>>,
}

impl Table {
    /// Builds a table from the raw fields of a header line.
    ///
    /// The header is scanned twice: the first pass turns every field that is
    /// not the reserved `score` token into a [`Heading`] remembering its raw
    /// index, and the second pass marks the headings that are immediately
    /// followed by the token. A leading orphan token is dropped.
    pub fn new(header_fields: &[String]) -> Self {
        if header_fields.first().is_some_and(|field| field == SCORE_TOKEN) {
            tracing::debug!("dropping leading score token with no heading to its left");
        }
        let mut headings: Vec<Heading> = header_fields
            .iter()
            .enumerate()
            .filter(|(_, field)| field.as_str() != SCORE_TOKEN)
            .map(|(column, field)| Heading {
                title: field.clone(),
                column,
                has_score: false,
            })
            .collect();
        for heading in &mut headings {
            heading.has_score = header_fields
                .get(heading.column + 1)
                .is_some_and(|field| field == SCORE_TOKEN);
        }
        Self {
            headings,
            records: Vec::new(),
        }
    }

    /// Parses a whole pasted sheet.
    ///
    /// Lines are trimmed; the first line is the header and the first empty
    /// line afterwards terminates row ingestion. Empty input (or an empty
    /// header line) yields the empty table.
    pub fn from_text(text: &str) -> Self {
        let mut lines = text.lines().map(str::trim);
        let Some(header) = lines.next().filter(|line| !line.is_empty()) else {
            return Self::default();
        };
        let fields: Vec<String> = header.split(DELIMITER).map(str::to_string).collect();
        let mut table = Self::new(&fields);
        for line in lines {
            if line.is_empty() {
                break;
            }
            let fields: Vec<String> = line.split(DELIMITER).map(str::to_string).collect();
            table.add_record(&fields);
        }
        table
    }

    /// Appends one record built from the raw fields of a data line.
    ///
    /// Each heading reads its value from the field at its raw index (missing
    /// fields become empty values). Headings with a score column additionally
    /// try to parse the next field as an integer; anything that does not
    /// parse leaves the score unset. A table with no headings accepts no
    /// records.
    pub fn add_record(&mut self, fields: &[String]) {
        if self.headings.is_empty() {
            return;
        }
        let record = self
            .headings
            .iter()
            .map(|heading| {
                let value = fields.get(heading.column).cloned().unwrap_or_default();
                let score = if heading.has_score {
                    fields
                        .get(heading.column + 1)
                        .and_then(|field| field.trim().parse::<i64>().ok())
                } else {
                    None
                };
                Entry { value, score }
            })
            .collect();
        self.records.push(record);
    }

    /// The logical columns of this table.
    pub fn headings(&self) -> &[Heading] {
        &self.headings
    }

    /// All records, in ingestion order.
    pub fn records(&self) -> &[Vec<Entry>] {
        &self.records
    }

    /// Number of records.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// True when the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up the entry at a record row and heading index.
    pub fn entry(&self, row: usize, column: usize) -> Option<&Entry> {
        self.records.get(row).and_then(|record| record.get(column))
    }

    /// Writes a score into the entry at a record row and heading index.
    ///
    /// Returns false when no such entry exists.
    pub fn set_score(&mut self, row: usize, column: usize, score: i64) -> bool {
        match self
            .records
            .get_mut(row)
            .and_then(|record| record.get_mut(column))
        {
            Some(entry) => {
                entry.score = Some(score);
                true
            }
            None => false,
        }
    }

    /// Resolves a heading index from a column selector: an exact title match
    /// first, then a zero-based numeric index.
    pub fn resolve_column(&self, selector: &str) -> Option<usize> {
        if let Some(index) = self
            .headings
            .iter()
            .position(|heading| heading.title == selector)
        {
            return Some(index);
        }
        selector
            .parse::<usize>()
            .ok()
            .filter(|index| *index < self.headings.len())
    }
}

/// Serializes the table back into pasteable tab-delimited text.
///
/// Every heading is written as a title field plus a score column, whether or
/// not the source had one, so a graded sheet always round-trips. Unset
/// scores serialize as the `?` placeholder, which the parser rejects as an
/// integer and so recovers as unset.
impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::with_capacity(self.records.len() + 1);
        let header: Vec<String> = self
            .headings
            .iter()
            .flat_map(|heading| [heading.title.clone(), SCORE_TOKEN.to_string()])
            .collect();
        lines.push(header.join("\t"));
        for record in &self.records {
            let fields: Vec<String> = record
                .iter()
                .flat_map(|entry| {
                    let score = entry
                        .score
                        .map_or_else(|| UNSET_SCORE.to_string(), |s| s.to_string());
                    [entry.value.clone(), score]
                })
                .collect();
            lines.push(fields.join("\t"));
        }
        write!(f, "{}", lines.join("\n"))
    }
}
