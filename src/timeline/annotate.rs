//! Attaches interpolation weights to every timeline row.

use super::row::{Timeline, TimelineRow};
use crate::error::PatchError;
use crate::temporal::{self, InterpolationMode};
use crate::vintage::VintageSet;
use rayon::prelude::*;

/// Annotates every row of `timeline` with the weight distribution over the
/// vintage dates (and, in nearest mode, the winning year).
///
/// Pure transform: the input is untouched and a fresh timeline is returned,
/// so calling it twice with the same inputs is a no-op beyond allocation.
/// Rows are independent and processed in parallel; results keep the original
/// row order. Fails with `MissingDateColumn` on the first undated row.
pub fn annotate(
    timeline: &Timeline,
    vintages: &VintageSet,
    mode: InterpolationMode,
) -> Result<Timeline, PatchError> {
    let dates = vintages.dates();
    let rows = timeline
        .rows
        .par_iter()
        .map(|row| annotate_row(row, &dates, mode))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Timeline::new(rows))
}

fn annotate_row(
    row: &TimelineRow,
    dates: &[chrono::NaiveDateTime],
    mode: InterpolationMode,
) -> Result<TimelineRow, PatchError> {
    let target = row.date.ok_or(PatchError::MissingDateColumn {
        context: row.context(),
    })?;

    let bracket = temporal::bracket(target, dates)?;
    let weights = temporal::weights(target, bracket, mode)?;

    let mut annotated = row.clone();
    if mode == InterpolationMode::Nearest {
        // A nearest-mode distribution has exactly one key.
        annotated.nearest_year = weights.iter().next().map(|(year, _)| year);
    }
    annotated.interpolation_weights = Some(weights);
    Ok(annotated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vintage::ReferenceDate;
    use chrono::{NaiveDate, NaiveDateTime};

    fn date(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn vintages() -> VintageSet {
        VintageSet::new(vec![
            ReferenceDate::from_year("db-2020", 2020),
            ReferenceDate::from_year("db-2022", 2022),
            ReferenceDate::from_year("db-2025", 2025),
        ])
        .unwrap()
    }

    #[test]
    fn test_every_row_gains_weights() {
        let timeline = Timeline::new(vec![
            TimelineRow::new(date(2021, 1, 1), 1, 10, 4.0),
            TimelineRow::new(date(2026, 1, 1), 2, 10, 5.0),
        ]);
        let annotated = annotate(&timeline, &vintages(), InterpolationMode::Linear).unwrap();

        assert_eq!(annotated.len(), 2);
        let first = annotated.rows[0].interpolation_weights.as_ref().unwrap();
        assert_eq!(first.len(), 2);
        assert!(first.is_normalized(1e-9));
        // Out-of-range row clamps to the latest vintage.
        let second = annotated.rows[1].interpolation_weights.as_ref().unwrap();
        assert_eq!(second.get(2025), Some(1.0));
    }

    #[test]
    fn test_nearest_mode_sets_nearest_year() {
        let timeline = Timeline::new(vec![TimelineRow::new(date(2024, 8, 1), 1, 10, 4.0)]);
        let annotated = annotate(&timeline, &vintages(), InterpolationMode::Nearest).unwrap();
        assert_eq!(annotated.rows[0].nearest_year, Some(2025));
        let weights = annotated.rows[0].interpolation_weights.as_ref().unwrap();
        assert_eq!(weights.get(2025), Some(1.0));
    }

    #[test]
    fn test_input_rows_untouched_and_idempotent() {
        let timeline = Timeline::new(vec![TimelineRow::new(date(2021, 1, 1), 1, 10, 4.0)]);
        let once = annotate(&timeline, &vintages(), InterpolationMode::Linear).unwrap();
        assert_eq!(timeline.rows[0].interpolation_weights, None);

        let twice = annotate(&once, &vintages(), InterpolationMode::Linear).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_date_fails_with_row_context() {
        let mut row = TimelineRow::new(date(2021, 1, 1), 3, 11, 4.0);
        row.date = None;
        let timeline = Timeline::new(vec![row]);

        let err = annotate(&timeline, &vintages(), InterpolationMode::Linear).unwrap_err();
        match err {
            PatchError::MissingDateColumn { context } => {
                assert_eq!(context.producer.raw(), 3);
                assert_eq!(context.consumer.raw(), 11);
            }
            other => panic!("wrong error: {other}"),
        }
    }

    #[test]
    fn test_order_preserved_under_parallel_annotation() {
        let rows: Vec<TimelineRow> = (0..200)
            .map(|i| TimelineRow::new(date(2020 + (i % 6), 1, 1), i as i64, 999, 1.0))
            .collect();
        let timeline = Timeline::new(rows);
        let annotated = annotate(&timeline, &vintages(), InterpolationMode::Linear).unwrap();
        for (i, row) in annotated.iter().enumerate() {
            assert_eq!(row.producer.raw(), i as i64);
        }
    }
}
