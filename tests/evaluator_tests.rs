/// Evaluator property and scenario tests.
///
/// Unit tests for the individual operations live in `src/evaluator`. These
/// tests sweep input ranges and run the end-to-end scenarios through the
/// public API.
use binwatch::evaluator::{
    BinReading, DEFAULT_CAPACITY, EvaluatorError, StatusTier, classify_status,
    compute_fill_percentage, evaluate,
};

const SAMPLE_USAGES: [i64; 12] = [
    i64::MIN,
    -1_000_000,
    -29,
    -1,
    0,
    1,
    7,
    14,
    27,
    28,
    29,
    i64::MAX,
];

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn percentage_is_always_in_range() {
    for capacity in [1, 2, 28, 100, 10_000, i64::MAX] {
        for usage in SAMPLE_USAGES {
            let p = compute_fill_percentage(usage, capacity).unwrap();
            assert!(
                (0.0..=100.0).contains(&p),
                "usage {usage}, capacity {capacity} gave {p}"
            );
        }
    }
}

#[test]
fn percentage_is_non_increasing_in_usage() {
    for capacity in [1, 28, 500] {
        let mut previous = f64::INFINITY;
        for usage in -40..=capacity + 40 {
            let p = compute_fill_percentage(usage, capacity).unwrap();
            assert!(p <= previous, "usage {usage} raised fill to {p}");
            previous = p;
        }
    }
}

#[test]
fn capacity_boundaries() {
    for capacity in [1, 28, 64] {
        assert_eq!(compute_fill_percentage(capacity, capacity).unwrap(), 0.0);
        assert_eq!(compute_fill_percentage(0, capacity).unwrap(), 100.0);
    }
}

#[test]
fn negative_capacity_always_fails() {
    for usage in SAMPLE_USAGES {
        assert_eq!(
            compute_fill_percentage(usage, -1),
            Err(EvaluatorError::InvalidCapacity(-1))
        );
    }
}

#[test]
fn classification_thresholds() {
    assert_eq!(classify_status(0.0), Ok(StatusTier::Low));
    assert_eq!(classify_status(30.0), Ok(StatusTier::Low));
    assert_eq!(classify_status(30.0001), Ok(StatusTier::Medium));
    assert_eq!(classify_status(70.0), Ok(StatusTier::Medium));
    assert_eq!(classify_status(70.0001), Ok(StatusTier::High));
    assert_eq!(classify_status(100.0), Ok(StatusTier::High));
}

#[test]
fn every_computed_percentage_classifies() {
    for usage in SAMPLE_USAGES {
        let p = compute_fill_percentage(usage, DEFAULT_CAPACITY).unwrap();
        assert!(classify_status(p).is_ok());
    }
}

// ---------------------------------------------------------------------------
// End-to-end scenarios (capacity 28)
// ---------------------------------------------------------------------------

fn scenario(usage: i64) -> (f64, StatusTier) {
    let level = evaluate(&BinReading::new("scenario", usage), DEFAULT_CAPACITY).unwrap();
    (level.percentage, level.status)
}

#[test]
fn empty_bin_is_low() {
    assert_eq!(scenario(28), (0.0, StatusTier::Low));
}

#[test]
fn full_bin_is_high() {
    assert_eq!(scenario(0), (100.0, StatusTier::High));
}

#[test]
fn half_full_bin_is_medium() {
    assert_eq!(scenario(14), (50.0, StatusTier::Medium));
}

#[test]
fn usage_above_capacity_clamps_to_low() {
    assert_eq!(scenario(35), (0.0, StatusTier::Low));
}

#[test]
fn evaluate_propagates_invalid_capacity() {
    let reading = BinReading::new("b", 3);
    assert_eq!(
        evaluate(&reading, 0),
        Err(EvaluatorError::InvalidCapacity(0))
    );
}
