//! BARSLAST and VALUEWHEN.

use crate::domain::error::FormulaError;
use crate::domain::operator::Op;
use crate::domain::series::{align, BoolSeries, NumericSeries, Operand, NO_EVENT};

/// Bars since the condition last held. Zero on true bars, [`NO_EVENT`]
/// before the first true bar.
pub fn bars_last(cond: &BoolSeries) -> NumericSeries {
    let len = cond.len();
    let mut out = vec![NO_EVENT; len];
    // Walk backwards; each true bar owns the run up to the next later true bar.
    let mut end = len;
    for begin in (0..len).rev() {
        if cond.values[begin] {
            for (distance, slot) in out[begin..end].iter_mut().enumerate() {
                *slot = distance as f64;
            }
            end = begin;
        }
    }
    NumericSeries::new(Op::BarsLast, out)
}

/// Value of `source` on the most recent bar where `cond` held.
///
/// Distances come from [`bars_last`] on the whole condition. When the event
/// precedes the first bar of the aligned source window there is nothing to
/// read and the output is [`NO_EVENT`], as it is before the first event.
/// Only `occurrence == 0` (the nearest event) is supported.
pub fn value_when<'a>(
    cond: &BoolSeries,
    source: impl Into<Operand<'a>>,
    occurrence: usize,
) -> Result<NumericSeries, FormulaError> {
    if occurrence != 0 {
        return Err(FormulaError::UnsupportedOccurrence { occurrence });
    }
    let op = Op::ValueWhen { occurrence };
    let distances = bars_last(cond);
    let [dist, src] = align(op, [Operand::from(&distances), source.into()])?;

    let values = dist
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            if d == NO_EVENT {
                return NO_EVENT;
            }
            let back = d as usize;
            if back > i { NO_EVENT } else { src[i - back] }
        })
        .collect();

    Ok(NumericSeries::new(op, values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(values: &[bool]) -> BoolSeries {
        BoolSeries::raw(values.to_vec())
    }

    #[test]
    fn bars_last_counts_from_event() {
        let out = bars_last(&cond(&[false, false, true, false, false]));
        assert_eq!(out.values, vec![NO_EVENT, NO_EVENT, 0.0, 1.0, 2.0]);
        assert_eq!(out.op, Op::BarsLast);
    }

    #[test]
    fn bars_last_resets_on_each_event() {
        let out = bars_last(&cond(&[true, false, true, true, false, false]));
        assert_eq!(out.values, vec![0.0, 1.0, 0.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn bars_last_without_events_is_all_sentinel() {
        let out = bars_last(&cond(&[false; 4]));
        assert!(out.values.iter().all(|&v| v.to_bits() == NO_EVENT.to_bits()));
    }

    #[test]
    fn bars_last_empty() {
        assert!(bars_last(&cond(&[])).is_empty());
    }

    #[test]
    fn value_when_reads_event_bar() {
        let c = cond(&[false, false, true, false, false]);
        let source = NumericSeries::raw(vec![10.0, 11.0, 12.0, 13.0, 14.0]);
        let out = value_when(&c, &source, 0).unwrap();
        assert_eq!(out.values, vec![NO_EVENT, NO_EVENT, 12.0, 12.0, 12.0]);
        assert_eq!(out.op, Op::ValueWhen { occurrence: 0 });
    }

    #[test]
    fn value_when_follows_latest_event() {
        let c = cond(&[true, false, true, false]);
        let source = NumericSeries::raw(vec![1.0, 2.0, 3.0, 4.0]);
        let out = value_when(&c, &source, 0).unwrap();
        assert_eq!(out.values, vec![1.0, 1.0, 3.0, 3.0]);
    }

    #[test]
    fn value_when_event_before_source_window() {
        // Event on bar 0 of the condition; source only covers bars 2..=3.
        let c = cond(&[true, false, false, false]);
        let source = NumericSeries::raw(vec![30.0, 40.0]);
        let out = value_when(&c, &source, 0).unwrap();
        assert_eq!(out.values, vec![NO_EVENT, NO_EVENT]);
    }

    #[test]
    fn value_when_with_scalar_source() {
        let c = cond(&[false, true, false]);
        let out = value_when(&c, 5.0, 0).unwrap();
        assert_eq!(out.values, vec![NO_EVENT, 5.0, 5.0]);
    }

    #[test]
    fn value_when_rejects_older_occurrences() {
        let c = cond(&[true, true]);
        let source = NumericSeries::raw(vec![1.0, 2.0]);
        let err = value_when(&c, &source, 1).unwrap_err();
        assert!(matches!(
            err,
            FormulaError::UnsupportedOccurrence { occurrence: 1 }
        ));
    }
}
