//! Compensated summation.
//!
//! Areas of closed chains are sums of many triangle areas of mixed sign and
//! magnitude. [`ManySum`] makes that total independent of the order in
//! which terms arrive; [`pairwise_sum`] is the cheaper in-place reduction
//! used by the Cornu series.

/// Order-independent accumulator for many `f64` terms.
///
/// Terms are kept until [`ManySum::total`] is asked for, then added from
/// smallest magnitude to largest with Neumaier compensation. Any NaN term
/// makes the total NaN.
///
/// # Example
///
/// ```
/// use alignment_curves::ManySum;
///
/// let mut sum = ManySum::new();
/// sum.push(1e16);
/// sum.push(1.0);
/// sum.push(-1e16);
/// assert_eq!(sum.total(), 1.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManySum {
    terms: Vec<f64>,
}

impl ManySum {
    /// Create an empty sum.
    #[must_use]
    pub const fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Add a term.
    pub fn push(&mut self, x: f64) {
        self.terms.push(x);
    }

    /// Number of terms accumulated.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether no terms have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Forget all terms.
    pub fn clear(&mut self) {
        self.terms.clear();
    }

    /// The compensated total.
    #[must_use]
    pub fn total(&self) -> f64 {
        if self.terms.iter().any(|x| x.is_nan()) {
            return f64::NAN;
        }

        let mut sorted = self.terms.clone();
        sorted.sort_by(|a, b| a.abs().total_cmp(&b.abs()).then(a.total_cmp(b)));

        let mut sum = 0.0;
        let mut compensation = 0.0;
        for x in sorted {
            let t = sum + x;
            if sum.abs() >= x.abs() {
                compensation += (sum - t) + x;
            } else {
                compensation += (x - t) + sum;
            }
            sum = t;
        }
        sum + compensation
    }
}

impl Extend<f64> for ManySum {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        self.terms.extend(iter);
    }
}

impl FromIterator<f64> for ManySum {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}

/// Sum a slice pairwise in place and return the total.
///
/// Adjacent elements are combined, then adjacent pairs, and so on; the
/// slice contents are overwritten. An empty slice sums to zero.
pub fn pairwise_sum(terms: &mut [f64]) -> f64 {
    let n = terms.len();
    let mut stride = 1;
    while stride < n {
        let mut j = 0;
        while j + stride < n {
            terms[j] += terms[j + stride];
            j += 2 * stride;
        }
        stride *= 2;
    }
    terms.first().copied().unwrap_or(0.0)
}
