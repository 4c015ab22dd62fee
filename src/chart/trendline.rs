use crate::chart::{check_finite, ChartError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

//least squares line y = slope * x + intercept
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,

    //true when every x was identical and the zero-slope fallback was used
    pub degenerate: bool,
}

impl LineFit {
    pub fn value_at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    //vertical distance from (x, y) to the line
    pub fn residual(&self, x: f64, y: f64) -> f64 {
        (y - self.value_at(x)).abs()
    }
}

//a fitted trendline and the points supporting it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trendline {
    pub slope: f64,
    pub intercept: f64,

    //ascending positions of the inlier points in the input
    pub support: Vec<usize>,

    //rms vertical residual of the support points
    pub error: f64,

    //inlier threshold the line was accepted with
    pub threshold: f64,
}

impl Trendline {
    pub fn value_at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    pub fn support_count(&self) -> usize {
        self.support.len()
    }
}

//ordinary least squares fit through the given points
//when all x values are equal the slope is undefined; the fit falls back to a
//horizontal line through the mean of y and is flagged degenerate
pub fn fit_trendline(xs: &[f64], ys: &[f64]) -> Result<LineFit, ChartError> {
    if xs.len() != ys.len() {
        return Err(ChartError::LengthMismatch {
            xs: xs.len(),
            ys: ys.len(),
        });
    }
    if xs.len() < 2 {
        return Err(ChartError::InsufficientPoints {
            needed: 2,
            got: xs.len(),
        });
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        let dx = x - mean_x;
        sxx += dx * dx;
        sxy += dx * (y - mean_y);
    }

    if sxx == 0.0 {
        return Ok(LineFit {
            slope: 0.0,
            intercept: mean_y,
            degenerate: true,
        });
    }

    let slope = sxy / sxx;
    Ok(LineFit {
        slope,
        intercept: mean_y - slope * mean_x,
        degenerate: false,
    })
}

//settings for consensus trendline search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RansacConfig {
    //maximum number of lines returned
    pub max_lines: usize,

    //maximum vertical residual for a point to count as an inlier
    pub threshold: f64,

    //minimum inliers for a line to be accepted, at least 2
    pub min_support: usize,

    //candidate pairs evaluated per line; below this pair count the search is exhaustive
    pub max_trials: usize,

    //seed for the sampled search
    pub seed: u64,
}

impl Default for RansacConfig {
    fn default() -> Self {
        RansacConfig {
            max_lines: 3,
            threshold: 1.0,
            min_support: 3,
            max_trials: 500,
            seed: 42,
        }
    }
}

impl RansacConfig {
    pub fn validate(&self) -> Result<(), ChartError> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(ChartError::InvalidParameter(format!(
                "threshold must be a non-negative number, got {}",
                self.threshold
            )));
        }
        if self.min_support < 2 {
            return Err(ChartError::InvalidParameter(format!(
                "min_support must be at least 2, got {}",
                self.min_support
            )));
        }
        if self.max_trials == 0 {
            return Err(ChartError::InvalidParameter(
                "max_trials must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

//score of one candidate line against the unassigned points
#[derive(Debug, Clone, Copy)]
struct Candidate {
    order: usize,
    line: LineFit,
    inliers: usize,
    residual_sum: f64,
}

//more inliers first, then tighter fit, then earlier candidate
fn better(a: Candidate, b: Candidate) -> Candidate {
    let ordering = b
        .inliers
        .cmp(&a.inliers)
        .then(
            a.residual_sum
                .partial_cmp(&b.residual_sum)
                .unwrap_or(Ordering::Equal),
        )
        .then(a.order.cmp(&b.order));

    match ordering {
        Ordering::Greater => b,
        _ => a,
    }
}

//detects up to `max_lines` trendlines by repeated consensus fitting
//
//each round fits a line through pairs of still unassigned points, keeps the pair
//line with the most inliers and, if it has at least `min_support` of them,
//refits it over its inliers and removes them from the pool
pub fn detect_trendlines_ransac(
    xs: &[f64],
    ys: &[f64],
    config: &RansacConfig,
) -> Result<Vec<Trendline>, ChartError> {
    if xs.len() != ys.len() {
        return Err(ChartError::LengthMismatch {
            xs: xs.len(),
            ys: ys.len(),
        });
    }
    if xs.len() < 2 {
        return Err(ChartError::InsufficientPoints {
            needed: 2,
            got: xs.len(),
        });
    }
    check_finite(xs)?;
    check_finite(ys)?;
    config.validate()?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut unassigned: Vec<usize> = (0..xs.len()).collect();
    let mut lines = Vec::new();

    while lines.len() < config.max_lines && unassigned.len() >= 2 {
        let pairs = candidate_pairs(xs, &unassigned, config.max_trials, &mut rng);

        let best = pairs
            .par_iter()
            .enumerate()
            .filter_map(|(order, &(a, b))| {
                let line = fit_trendline(&[xs[a], xs[b]], &[ys[a], ys[b]]).ok()?;
                let (inliers, residual_sum) =
                    unassigned
                        .iter()
                        .fold((0usize, 0.0f64), |(count, sum), &p| {
                            let r = line.residual(xs[p], ys[p]);
                            if r <= config.threshold {
                                (count + 1, sum + r)
                            } else {
                                (count, sum)
                            }
                        });
                Some(Candidate {
                    order,
                    line,
                    inliers,
                    residual_sum,
                })
            })
            .reduce_with(better);

        let Some(best) = best else {
            break;
        };

        if best.inliers < config.min_support {
            debug!(
                inliers = best.inliers,
                min_support = config.min_support,
                "best candidate below minimum support, stopping"
            );
            break;
        }

        let (support, rest): (Vec<usize>, Vec<usize>) = unassigned
            .iter()
            .partition(|&&p| best.line.residual(xs[p], ys[p]) <= config.threshold);

        let support_xs: Vec<f64> = support.iter().map(|&p| xs[p]).collect();
        let support_ys: Vec<f64> = support.iter().map(|&p| ys[p]).collect();
        let refit = fit_trendline(&support_xs, &support_ys)?;

        let error = (support
            .iter()
            .map(|&p| refit.residual(xs[p], ys[p]).powi(2))
            .sum::<f64>()
            / support.len() as f64)
            .sqrt();

        debug!(
            slope = refit.slope,
            intercept = refit.intercept,
            support = support.len(),
            "accepted trendline"
        );

        lines.push(Trendline {
            slope: refit.slope,
            intercept: refit.intercept,
            support,
            error,
            threshold: config.threshold,
        });
        unassigned = rest;
    }

    Ok(lines)
}

//pairs of unassigned positions with distinct x
//exhaustive when the pool is small enough, otherwise `max_trials` seeded samples
fn candidate_pairs(
    xs: &[f64],
    unassigned: &[usize],
    max_trials: usize,
    rng: &mut StdRng,
) -> Vec<(usize, usize)> {
    let n = unassigned.len();
    let total_pairs = n * (n - 1) / 2;

    if total_pairs <= max_trials {
        let mut pairs = Vec::with_capacity(total_pairs);
        for i in 0..n {
            for j in i + 1..n {
                let (a, b) = (unassigned[i], unassigned[j]);
                if xs[a] != xs[b] {
                    pairs.push((a, b));
                }
            }
        }
        return pairs;
    }

    let mut pairs = Vec::with_capacity(max_trials);
    for _ in 0..max_trials {
        let i = rng.gen_range(0..n);
        let mut j = rng.gen_range(0..n - 1);
        if j >= i {
            j += 1;
        }
        let (a, b) = (unassigned[i], unassigned[j]);
        if xs[a] != xs[b] {
            pairs.push((a.min(b), a.max(b)));
        }
    }
    pairs
}
