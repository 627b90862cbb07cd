//! Summary statistics over the retained trial samples of one configuration point.
//!
//! Mean and variance use Welford's online update. The confidence interval is a
//! Student-t interval, `mean ± t(1 - α/2, n - 1) · s / √n`, with `s` the sample
//! (n − 1) standard deviation. A single sample has a standard deviation of zero and a
//! degenerate interval `[mean, mean]`.

pub const CONFIDENCE_LEVEL: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub stdev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

impl Statistics {
    /// Aggregates `samples` at the fixed 95% confidence level. Returns `None` for an
    /// empty sample set.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        Self::with_confidence(samples, CONFIDENCE_LEVEL)
    }

    pub fn with_confidence(samples: &[f64], level: f64) -> Option<Self> {
        let (&first, rest) = samples.split_first()?;

        let mut accumulator = Welford::default();
        let mut min = first;
        let mut max = first;
        accumulator.push(first);
        for &sample in rest {
            accumulator.push(sample);
            min = min.min(sample);
            max = max.max(sample);
        }

        let count = accumulator.count;
        let mean = accumulator.mean;
        let stdev = accumulator.sample_variance().sqrt();
        let half_width = if count > 1 && stdev > 0.0 {
            let quantile = student_t_quantile(0.5 + level / 2.0, (count - 1) as f64);
            quantile * stdev / (count as f64).sqrt()
        } else {
            0.0
        };

        Some(Self {
            count,
            min,
            max,
            mean,
            stdev,
            ci_lower: mean - half_width,
            ci_upper: mean + half_width,
        })
    }
}

#[derive(Debug, Default)]
struct Welford {
    count: usize,
    mean: f64,
    m2: f64,
}

impl Welford {
    fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    fn sample_variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            (self.m2 / (self.count - 1) as f64).max(0.0)
        }
    }
}

/// Quantile of Student's t distribution with `df` degrees of freedom, for `p` in
/// `(0.5, 1)`, found by bisection on the CDF.
pub fn student_t_quantile(p: f64, df: f64) -> f64 {
    const MAX_UPPER: f64 = 1e8;
    let mut lower = 0.0;
    let mut upper = 1.0;
    while student_t_cdf(upper, df) < p && upper < MAX_UPPER {
        upper *= 2.0;
    }
    for _ in 0..200 {
        let mid = 0.5 * (lower + upper);
        if student_t_cdf(mid, df) < p {
            lower = mid;
        } else {
            upper = mid;
        }
        if upper - lower < 1e-13 {
            break;
        }
    }
    0.5 * (lower + upper)
}

pub fn student_t_cdf(t: f64, df: f64) -> f64 {
    let x = df / (df + t * t);
    let tail = 0.5 * regularized_incomplete_beta(df / 2.0, 0.5, x);
    if t >= 0.0 { 1.0 - tail } else { tail }
}

fn regularized_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

// Modified Lentz evaluation of the incomplete beta continued fraction.
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITERATIONS: usize = 500;
    const EPSILON: f64 = 1e-15;
    const TINY: f64 = 1e-300;

    let clamp = |v: f64| if v.abs() < TINY { TINY } else { v };

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 / clamp(1.0 - qab * x / qap);
    let mut h = d;

    for m in 1..=MAX_ITERATIONS {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 / clamp(1.0 + aa * d);
        c = clamp(1.0 + aa / c);
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 / clamp(1.0 + aa * d);
        c = clamp(1.0 + aa / c);
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPSILON {
            break;
        }
    }
    h
}

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural log of the gamma function for `x >= 0.5`.
fn ln_gamma(x: f64) -> f64 {
    let x = x - 1.0;
    let t = x + LANCZOS_G + 0.5;
    let series = LANCZOS_COEFFICIENTS[1..]
        .iter()
        .enumerate()
        .fold(LANCZOS_COEFFICIENTS[0], |acc, (i, &c)| {
            acc + c / (x + (i + 1) as f64)
        });
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + series.ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    const T_975_DF4: f64 = 2.776_445_105_197_799;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() < tolerance,
            "expected {} but got {}",
            expected,
            actual
        );
    }

    #[test]
    fn empty_sample_set_has_no_statistics() {
        assert!(Statistics::from_samples(&[]).is_none());
    }

    #[test]
    fn equal_samples_have_zero_spread_and_degenerate_interval() {
        let stats = Statistics::from_samples(&[4.25; 7]).unwrap();
        assert_eq!(stats.mean, 4.25);
        assert_eq!(stats.stdev, 0.0);
        assert_eq!((stats.ci_lower, stats.ci_upper), (4.25, 4.25));
        assert_eq!((stats.min, stats.max), (4.25, 4.25));
    }

    #[test]
    fn one_to_five_matches_reference_values() {
        let stats = Statistics::from_samples(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(stats.count, 5);
        assert_eq!(stats.mean, 3.0);
        assert_eq!((stats.min, stats.max), (1.0, 5.0));
        assert_close(stats.stdev, 2.5_f64.sqrt(), 1e-12);

        let half_width = T_975_DF4 * 0.5_f64.sqrt();
        assert_close(stats.ci_lower, 3.0 - half_width, 1e-9);
        assert_close(stats.ci_upper, 3.0 + half_width, 1e-9);
    }

    #[test]
    fn single_sample_has_zero_stdev() {
        let stats = Statistics::from_samples(&[12.5]).unwrap();
        assert_eq!(stats.stdev, 0.0);
        assert_eq!((stats.ci_lower, stats.ci_upper), (12.5, 12.5));
    }

    #[test]
    fn mean_is_stable_for_large_offsets() {
        let samples: Vec<f64> = (0..1000).map(|i| 1e9 + (i % 2) as f64).collect();
        let stats = Statistics::from_samples(&samples).unwrap();
        assert_close(stats.mean, 1e9 + 0.5, 1e-6);
        assert!(stats.stdev > 0.49 && stats.stdev < 0.51);
    }

    #[test]
    fn student_t_quantiles_match_tables() {
        assert_close(student_t_quantile(0.975, 1.0), 12.706_204_736_174_7, 1e-6);
        assert_close(student_t_quantile(0.975, 4.0), T_975_DF4, 1e-9);
        assert_close(student_t_quantile(0.975, 30.0), 2.042_272_456_301_237, 1e-9);
        assert_close(student_t_quantile(0.975, 1000.0), 1.962_339_080_826_4, 1e-9);
    }

    #[test]
    fn student_t_cdf_is_symmetric() {
        assert_close(student_t_cdf(0.0, 5.0), 0.5, 1e-12);
        assert_close(student_t_cdf(-1.3, 5.0) + student_t_cdf(1.3, 5.0), 1.0, 1e-12);
    }

    #[test]
    fn ln_gamma_matches_known_values() {
        assert_close(ln_gamma(1.0), 0.0, 1e-12);
        assert_close(ln_gamma(0.5), std::f64::consts::PI.sqrt().ln(), 1e-12);
        assert_close(ln_gamma(5.0), 24.0_f64.ln(), 1e-12);
    }
}
