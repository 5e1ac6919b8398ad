// src/processing/decimation.rs
//! Stride decimation for display-bounded series

/// Stride that brings `len` points down to at most `cap`
///
/// Always at least one, so empty and single-point series are kept as-is.
pub fn stride_for(len: usize, cap: usize) -> usize {
    let cap = cap.max(1);
    if len > cap {
        len.div_ceil(cap)
    } else {
        1
    }
}

/// Every `stride`-th element, starting with the first
pub fn decimate<T: Copy>(data: &[T], stride: usize) -> Vec<T> {
    data.iter().step_by(stride.max(1)).copied().collect()
}

/// Number of points [`decimate`] keeps
pub fn decimated_len(len: usize, stride: usize) -> usize {
    len.div_ceil(stride.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_stride_exact_multiple() {
        assert_eq!(stride_for(200_000, 50_000), 4);
        assert_eq!(decimated_len(200_000, 4), 50_000);
    }

    #[test]
    fn test_stride_under_cap() {
        assert_eq!(stride_for(0, 10), 1);
        assert_eq!(stride_for(1, 10), 1);
        assert_eq!(stride_for(10, 10), 1);
        assert_eq!(stride_for(11, 10), 2);
    }

    #[test]
    fn test_zero_cap_does_not_divide_by_zero() {
        assert_eq!(stride_for(5, 0), 5);
    }

    #[test]
    fn test_decimate_keeps_first() {
        assert_eq!(decimate(&[0, 1, 2, 3, 4, 5, 6], 3), vec![0, 3, 6]);
        assert!(decimate::<f64>(&[], 4).is_empty());
    }

    proptest! {
        #[test]
        fn decimated_series_never_exceeds_cap(len in 0usize..200_000, cap in 1usize..60_000) {
            let stride = stride_for(len, cap);
            prop_assert!(stride >= 1);
            prop_assert!(decimated_len(len, stride) <= cap);
        }
    }
}
