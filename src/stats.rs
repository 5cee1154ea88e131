use crate::models::{GroupBy, GroupKey, Measure, SaleRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary statistics for a group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub key: GroupKey,
    pub count: usize,
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Compute count/min/max/mean/median of `measure` for every group of `by`.
pub fn grouped_summary(records: &[SaleRecord], by: GroupBy, measure: Measure) -> Vec<Summary> {
    let mut groups: BTreeMap<GroupKey, Vec<f64>> = BTreeMap::new();
    let mut missing: BTreeMap<GroupKey, usize> = BTreeMap::new();
    for r in records {
        let key = by.key(r);
        match measure.value(r) {
            Some(v) => groups.entry(key).or_default().push(v),
            None => *missing.entry(key).or_default() += 1,
        }
    }
    // groups made only of missing values still get a row
    for key in missing.keys() {
        groups.entry(key.clone()).or_default();
    }

    let mut out = Vec::new();
    for (key, mut vals) in groups {
        vals.sort_by(f64::total_cmp);
        let count = vals.len();
        let min = vals.first().cloned();
        let max = vals.last().cloned();
        let mean = if count > 0 {
            Some(vals.iter().copied().sum::<f64>() / count as f64)
        } else {
            None
        };
        let median = if count == 0 {
            None
        } else if count % 2 == 1 {
            Some(vals[count / 2])
        } else {
            Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
        };
        let miss = missing.get(&key).cloned().unwrap_or(0);
        out.push(Summary {
            key,
            count,
            missing: miss,
            min,
            max,
            mean,
            median,
        });
    }
    out
}

/// Sum of `value` per key. Rows where `value` is `None` are skipped.
pub fn sum_by<K, FK, FV>(records: &[SaleRecord], key: FK, value: FV) -> BTreeMap<K, f64>
where
    K: Ord,
    FK: Fn(&SaleRecord) -> K,
    FV: Fn(&SaleRecord) -> Option<f64>,
{
    let mut out = BTreeMap::new();
    for r in records {
        if let Some(v) = value(r) {
            *out.entry(key(r)).or_insert(0.0) += v;
        }
    }
    out
}

/// Arithmetic mean of `value` per key, over the rows that have a value.
pub fn mean_by<K, FK, FV>(records: &[SaleRecord], key: FK, value: FV) -> BTreeMap<K, f64>
where
    K: Ord,
    FK: Fn(&SaleRecord) -> K,
    FV: Fn(&SaleRecord) -> Option<f64>,
{
    let mut acc: BTreeMap<K, (f64, usize)> = BTreeMap::new();
    for r in records {
        let Some(v) = value(r) else { continue };
        let e = acc.entry(key(r)).or_insert((0.0, 0));
        e.0 += v;
        e.1 += 1;
    }
    acc.into_iter()
        .map(|(k, (sum, n))| (k, sum / n as f64))
        .collect()
}

/// Row count per key.
pub fn count_by<K, FK>(records: &[SaleRecord], key: FK) -> BTreeMap<K, usize>
where
    K: Ord,
    FK: Fn(&SaleRecord) -> K,
{
    let mut out = BTreeMap::new();
    for r in records {
        *out.entry(key(r)).or_insert(0) += 1;
    }
    out
}

/// Sum of `value` per (outer, inner) key pair.
pub fn sum_by_pair<K1, K2, F1, F2, FV>(
    records: &[SaleRecord],
    outer: F1,
    inner: F2,
    value: FV,
) -> BTreeMap<K1, BTreeMap<K2, f64>>
where
    K1: Ord,
    K2: Ord,
    F1: Fn(&SaleRecord) -> K1,
    F2: Fn(&SaleRecord) -> K2,
    FV: Fn(&SaleRecord) -> Option<f64>,
{
    let mut out: BTreeMap<K1, BTreeMap<K2, f64>> = BTreeMap::new();
    for r in records {
        let Some(v) = value(r) else { continue };
        *out.entry(outer(r))
            .or_default()
            .entry(inner(r))
            .or_insert(0.0) += v;
    }
    out
}

/// Pearson correlation coefficient. NaN when either side has no variance
/// or fewer than two paired values.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return f64::NAN;
    }
    let mx = xs[..n].iter().sum::<f64>() / n as f64;
    let my = ys[..n].iter().sum::<f64>() / n as f64;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys.iter()) {
        let (dx, dy) = (x - mx, y - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    // a constant column only accumulates rounding noise
    let flat = |ss: f64, mean: f64| ss <= mean.abs().max(1.0).powi(2) * n as f64 * 1e-20;
    if flat(sxx, mx) || flat(syy, my) {
        return f64::NAN;
    }
    (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0)
}

/// Pairwise Pearson correlation between equally long columns.
pub fn correlation_matrix(columns: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let k = columns.len();
    let mut m = vec![vec![f64::NAN; k]; k];
    for i in 0..k {
        for j in i..k {
            let r = pearson(&columns[i], &columns[j]);
            m[i][j] = r;
            m[j][i] = r;
        }
    }
    m
}

/// Least-squares line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
}

impl LinearFit {
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Simple linear regression. `None` if x has no spread.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let mx = xs[..n].iter().sum::<f64>() / n as f64;
    let my = ys[..n].iter().sum::<f64>() / n as f64;
    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (x, y) in xs.iter().zip(ys.iter()) {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx) * (x - mx);
    }
    if sxx <= f64::EPSILON {
        return None;
    }
    let slope = sxy / sxx;
    Some(LinearFit {
        intercept: my - slope * mx,
        slope,
    })
}

/// Equal-width histogram bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Split `values` into `bins` equal-width bins over their range.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if (hi - lo).abs() < f64::EPSILON {
        hi = lo + 1.0;
    }
    let width = (hi - lo) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in values {
        // the maximum lands in the last bin
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            start: lo + i as f64 * width,
            end: lo + (i + 1) as f64 * width,
            count,
        })
        .collect()
}
