//! # Quality Search Module
//!
//! Ricerca binaria sul parametro di qualità JPEG per rispettare un budget in byte.
//!
//! ## Assunzioni:
//! - La funzione di misura è monotona non decrescente nella qualità
//!   (qualità più alta ⇒ file più grande). Non viene verificato.
//! - Ogni misura è un encoding completo: è il costo dominante dell'intero
//!   motore, quindi il numero di chiamate resta O(log W).
//!
//! ## Tie-break:
//! Quando l'intervallo collassa senza un match esatto viene restituito l'ultimo
//! `mid` ispezionato, senza cercare il confine più vicino al target. Con
//! intervallo `[0, 100]` e ogni qualità sotto budget il risultato è quindi 99,
//! non 100: i chiamanti misurano prima la qualità massima e saltano la ricerca.

use crate::error::ResizeError;
use std::cmp::Ordering;
use tracing::debug;

/// Lowest quality level accepted by the search
pub const MIN_QUALITY: u8 = 0;
/// Highest quality level, also the default when no size budget is set
pub const MAX_QUALITY: u8 = 100;

/// Find the quality in `[low, high]` whose encoded size best fits `target` bytes.
///
/// `measure` encodes at the given quality and returns the byte count. Any error
/// it returns aborts the search and is propagated unchanged.
///
/// # Errors
/// - `ResizeError::InvalidRange` if `high < low`
/// - whatever `measure` fails with
pub fn find_quality<F>(target: u64, low: u8, high: u8, mut measure: F) -> Result<u8, ResizeError>
where
    F: FnMut(u8) -> Result<u64, ResizeError>,
{
    if high < low {
        return Err(ResizeError::InvalidRange { low, high });
    }

    let (mut low, mut high) = (low, high);
    loop {
        let mid = ((u16::from(low) + u16::from(high)) / 2) as u8;
        let size = measure(mid)?;
        debug!("Trial encode at quality {}: {} bytes (target {})", mid, size, target);

        match size.cmp(&target) {
            Ordering::Greater => {
                // bottomed out: nothing in range fits
                if high == mid {
                    return Ok(mid);
                }
                high = mid;
            }
            Ordering::Less => {
                if low == mid {
                    return Ok(mid);
                }
                low = mid;
            }
            Ordering::Equal => return Ok(mid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::Cell, rc::Rc};

    /// Wrap an infallible size function, counting how often it is measured
    fn counted<F>(f: F) -> (impl FnMut(u8) -> Result<u64, ResizeError>, Rc<Cell<usize>>)
    where
        F: Fn(u8) -> u64,
    {
        let calls = Rc::new(Cell::new(0));
        let handle = calls.clone();
        let measure = move |q: u8| {
            handle.set(handle.get() + 1);
            Ok(f(q))
        };
        (measure, calls)
    }

    #[test]
    fn test_linear_size_converges_below_target() {
        let (measure, calls) = counted(|q| u64::from(q) * 1000);
        let quality = find_quality(55_500, 0, 100, measure).unwrap();
        assert_eq!(quality, 55);
        assert_eq!(calls.get(), 8);
    }

    #[test]
    fn test_exact_match_returns_immediately() {
        let (measure, calls) = counted(|q| u64::from(q) * 1000);
        assert_eq!(find_quality(50_000, 0, 100, measure).unwrap(), 50);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_nothing_fits_returns_lowest_explored() {
        let (measure, _) = counted(|q| 10_000 + u64::from(q));
        assert_eq!(find_quality(5, 0, 100, measure).unwrap(), 0);
    }

    #[test]
    fn test_everything_fits_tops_out_below_high() {
        let (measure, _) = counted(|q| u64::from(q));
        assert_eq!(find_quality(1_000, 0, 100, measure).unwrap(), 99);
    }

    #[test]
    fn test_single_point_range() {
        let (measure, calls) = counted(|_| 500);
        assert_eq!(find_quality(100, 42, 42, measure).unwrap(), 42);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_empty_range_is_an_error() {
        let (measure, calls) = counted(|_| 0);
        let err = find_quality(100, 60, 40, measure).unwrap_err();
        assert!(matches!(err, ResizeError::InvalidRange { low: 60, high: 40 }));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_measure_error_propagates() {
        let err = find_quality(100, 0, 100, |_| Err(ResizeError::Cancelled)).unwrap_err();
        assert!(matches!(err, ResizeError::Cancelled));
    }

    #[test]
    fn test_monotonic_result_fits_or_is_floor() {
        let size = |q: u8| 2_000 + u64::from(q) * u64::from(q) * 37;
        for target in (size(0)..=size(100)).step_by(997) {
            let (measure, calls) = counted(size);
            let quality = find_quality(target, MIN_QUALITY, MAX_QUALITY, measure).unwrap();
            assert!(
                size(quality) <= target || quality == MIN_QUALITY,
                "quality {} ({} bytes) exceeds target {}",
                quality,
                size(quality),
                target
            );
            assert!(calls.get() <= 8, "{} measurements for target {}", calls.get(), target);
        }
    }
}
