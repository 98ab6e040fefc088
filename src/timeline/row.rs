//! The timeline artifact: dated exchange occurrences produced upstream.

use crate::error::RowContext;
use crate::store::NodeId;
use crate::temporal::InterpolationWeights;
use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One dated occurrence of an exchange between a consumer and a producer.
///
/// Rows arrive from the external timeline builder and are read-only here;
/// the annotator appends the `nearest_year` / `interpolation_weights`
/// columns into a fresh copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineRow {
    pub date: Option<NaiveDateTime>,
    pub producer: NodeId,
    pub consumer: NodeId,
    pub amount: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nearest_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpolation_weights: Option<InterpolationWeights>,
}

impl TimelineRow {
    pub fn new(
        date: NaiveDateTime,
        producer: impl Into<NodeId>,
        consumer: impl Into<NodeId>,
        amount: f64,
    ) -> Self {
        Self {
            date: Some(date),
            producer: producer.into(),
            consumer: consumer.into(),
            amount,
            nearest_year: None,
            interpolation_weights: None,
        }
    }

    /// The calendar year of the occurrence, if the row is dated.
    pub fn year(&self) -> Option<i32> {
        self.date.map(|date| date.year())
    }

    /// The diagnostic triple attached to every row-level error.
    pub fn context(&self) -> RowContext {
        RowContext {
            producer: self.producer,
            consumer: self.consumer,
            date: self.date,
        }
    }
}

/// An ordered collection of timeline rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline {
    pub rows: Vec<TimelineRow>,
}

impl Timeline {
    pub fn new(rows: Vec<TimelineRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimelineRow> {
        self.rows.iter()
    }

    /// Writes the rows as a JSON array.
    pub fn to_json_writer<W: std::io::Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer_pretty(writer, self)
    }

    /// Reads rows from a JSON array.
    pub fn from_json_reader<R: std::io::Read>(reader: R) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::{Seek, SeekFrom};

    fn date(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_artifact_round_trip_preserves_annotations() {
        let mut row = TimelineRow::new(date(2021, 3, 14), 4, 9, 2.5);
        row.interpolation_weights =
            Some(InterpolationWeights::from_pairs([(2020, 0.25), (2022, 0.75)]));
        let timeline = Timeline::new(vec![row, TimelineRow::new(date(2024, 1, 1), 5, 9, 1.0)]);

        let mut file = tempfile::tempfile().unwrap();
        timeline.to_json_writer(&file).unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();
        let restored = Timeline::from_json_reader(&file).unwrap();

        assert_eq!(restored, timeline);
        let weights = restored.rows[0].interpolation_weights.as_ref().unwrap();
        assert_eq!(weights.get(2022), Some(0.75));
        assert_eq!(restored.rows[1].interpolation_weights, None);
    }

    #[test]
    fn test_unannotated_columns_absent_from_json() {
        let timeline = Timeline::new(vec![TimelineRow::new(date(2021, 1, 1), 1, 2, 3.0)]);
        let json = serde_json::to_string(&timeline).unwrap();
        assert!(!json.contains("interpolation_weights"));
        assert!(!json.contains("nearest_year"));
    }
}
