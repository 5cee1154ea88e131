//! Sales predictor: ordinary least squares for `Total` from four transaction columns.
//!
//! The model is refit on every request from a seeded 80/20 split of the dataset,
//! so the reported holdout error is reproducible.

use crate::dataset::Dataset;
use crate::error::{Result, SalesError};
use crate::models::Measure;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Model inputs, in coefficient order.
pub const FEATURES: [Measure; 4] = [
    Measure::UnitPrice,
    Measure::Quantity,
    Measure::Tax,
    Measure::GrossIncome,
];
pub const TARGET: Measure = Measure::Total;
pub const SPLIT_SEED: u64 = 42;
pub const TEST_FRACTION: f64 = 0.2;

/// Relative size below which a pivot is treated as zero (column is a combination of earlier ones).
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Raw form submission. Every field is kept as text until validated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionForm {
    pub unit_price: Option<String>,
    pub quantity: Option<String>,
    pub tax_percent: Option<String>,
    pub gross_income: Option<String>,
}

/// Validated predictor input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionInput {
    pub unit_price: f64,
    pub quantity: u32,
    pub tax_percent: f64,
    pub gross_income: f64,
}

fn required<'a>(field: &'static str, value: &'a Option<String>) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(SalesError::InvalidInput {
            field,
            reason: "a value is required".into(),
        }),
    }
}

fn finite(field: &'static str, value: &Option<String>) -> Result<f64> {
    let s = required(field, value)?;
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(_) => Err(SalesError::InvalidInput {
            field,
            reason: format!("`{s}` is not a finite number"),
        }),
        Err(_) => Err(SalesError::InvalidInput {
            field,
            reason: format!("`{s}` is not a number"),
        }),
    }
}

impl PredictionInput {
    pub fn from_form(form: &PredictionForm) -> Result<Self> {
        let unit_price = finite("unit_price", &form.unit_price)?;
        let quantity = {
            let s = required("quantity", &form.quantity)?;
            s.parse::<u32>().map_err(|_| SalesError::InvalidInput {
                field: "quantity",
                reason: format!("`{s}` is not a non-negative whole number"),
            })?
        };
        let tax_percent = finite("tax_percent", &form.tax_percent)?;
        let gross_income = finite("gross_income", &form.gross_income)?;
        Ok(Self {
            unit_price,
            quantity,
            tax_percent,
            gross_income,
        })
    }

    pub fn features(&self) -> [f64; 4] {
        [
            self.unit_price,
            self.quantity as f64,
            self.tax_percent,
            self.gross_income,
        ]
    }
}

/// `y = intercept + Σ coefficients[i] · x[i]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: [f64; 4],
}

impl LinearModel {
    /// Least-squares fit with intercept.
    ///
    /// Solves the normal equations by Gaussian elimination with partial pivoting.
    /// A feature that is a linear combination of earlier ones gets coefficient 0.
    pub fn fit(x: &[[f64; 4]], y: &[f64]) -> Result<Self> {
        const P: usize = 5;
        let n = x.len().min(y.len());
        if n < P {
            return Err(SalesError::InsufficientData { rows: n, params: P });
        }

        // Augmented [XᵀX | Xᵀy] with a leading column of ones for the intercept.
        let mut a = [[0.0f64; P + 1]; P];
        for (row, target) in x.iter().zip(y) {
            let design = [1.0, row[0], row[1], row[2], row[3]];
            for i in 0..P {
                for j in 0..P {
                    a[i][j] += design[i] * design[j];
                }
                a[i][P] += design[i] * target;
            }
        }
        let scale: [f64; P] = std::array::from_fn(|i| a[i][i].abs().max(f64::MIN_POSITIVE));

        // Forward elimination; `pivots` records (row, column) of every accepted pivot.
        let mut pivots: Vec<(usize, usize)> = Vec::with_capacity(P);
        let mut row = 0;
        for col in 0..P {
            let Some(best) = (row..P).max_by(|&r1, &r2| a[r1][col].abs().total_cmp(&a[r2][col].abs()))
            else {
                break;
            };
            if a[best][col].abs() <= PIVOT_TOLERANCE * scale[col] {
                log::debug!("feature column {} is collinear; coefficient fixed at 0", col);
                continue;
            }
            a.swap(row, best);
            for r in (row + 1)..P {
                let factor = a[r][col] / a[row][col];
                if factor != 0.0 {
                    for c in col..=P {
                        a[r][c] -= factor * a[row][c];
                    }
                }
            }
            pivots.push((row, col));
            row += 1;
        }

        // Back substitution; free columns stay at zero.
        let mut beta = [0.0f64; P];
        for &(r, col) in pivots.iter().rev() {
            let mut acc = a[r][P];
            for c in (col + 1)..P {
                acc -= a[r][c] * beta[c];
            }
            beta[col] = acc / a[r][col];
        }

        Ok(Self {
            intercept: beta[0],
            coefficients: [beta[1], beta[2], beta[3], beta[4]],
        })
    }

    pub fn predict(&self, x: &[f64; 4]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(x)
                .map(|(c, v)| c * v)
                .sum::<f64>()
    }
}

/// Shuffle `0..n` with a seeded RNG; the first `ceil(test_fraction · n)` indices form the
/// test set. Returns `(train, test)`.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut idx: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    idx.shuffle(&mut rng);
    let n_test = ((n as f64 * test_fraction).ceil() as usize).min(n);
    let train = idx.split_off(n_test);
    (train, idx)
}

/// Mean of squared differences. NaN for empty input.
pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / n as f64
}

/// Result of one prediction request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub input: PredictionInput,
    pub predicted_total: f64,
    /// Mean squared error on the held-out rows.
    pub mse: f64,
    pub model: LinearModel,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Fit on the training split of `dataset` and predict `Total` for `input`.
pub fn predict_total(dataset: &Dataset, input: &PredictionInput) -> Result<Prediction> {
    let rows = dataset.records();
    let features = |i: usize| -> [f64; 4] {
        let r = &rows[i];
        FEATURES.map(|m| m.value(r).unwrap_or(f64::NAN))
    };
    let target = |i: usize| TARGET.value(&rows[i]).unwrap_or(f64::NAN);

    let (train, test) = train_test_split(rows.len(), TEST_FRACTION, SPLIT_SEED);
    let x_train: Vec<[f64; 4]> = train.iter().map(|&i| features(i)).collect();
    let y_train: Vec<f64> = train.iter().map(|&i| target(i)).collect();
    let model = LinearModel::fit(&x_train, &y_train)?;

    let actual: Vec<f64> = test.iter().map(|&i| target(i)).collect();
    let predicted: Vec<f64> = test.iter().map(|&i| model.predict(&features(i))).collect();
    let mse = mean_squared_error(&actual, &predicted);

    let predicted_total = model.predict(&input.features());
    log::info!(
        "predicted total {:.4} (mse {:.6}, {} train / {} test rows)",
        predicted_total,
        mse,
        train.len(),
        test.len()
    );
    Ok(Prediction {
        input: *input,
        predicted_total,
        mse,
        model,
        train_rows: train.len(),
        test_rows: test.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(up: &str, q: &str, tax: &str, gi: &str) -> PredictionForm {
        PredictionForm {
            unit_price: Some(up.into()),
            quantity: Some(q.into()),
            tax_percent: Some(tax.into()),
            gross_income: Some(gi.into()),
        }
    }

    #[test]
    fn form_validation_names_the_field() {
        let ok = PredictionInput::from_form(&form("74.69", " 7 ", "26.14", "26.14")).unwrap();
        assert_eq!(ok.quantity, 7);

        let err = PredictionInput::from_form(&form("abc", "7", "1", "1")).unwrap_err();
        assert!(matches!(err, SalesError::InvalidInput { field: "unit_price", .. }));

        let err = PredictionInput::from_form(&form("1", "-3", "1", "1")).unwrap_err();
        assert!(matches!(err, SalesError::InvalidInput { field: "quantity", .. }));

        let err = PredictionInput::from_form(&form("1", "2", "inf", "1")).unwrap_err();
        assert!(matches!(err, SalesError::InvalidInput { field: "tax_percent", .. }));

        let mut missing = form("1", "2", "3", "4");
        missing.gross_income = None;
        let err = PredictionInput::from_form(&missing).unwrap_err();
        assert!(matches!(err, SalesError::InvalidInput { field: "gross_income", .. }));
    }

    #[test]
    fn fit_recovers_exact_linear_relation() {
        let x: Vec<[f64; 4]> = (0..20)
            .map(|i| {
                let i = i as f64;
                [i * 1.5 + 3.0, (i * 7.0) % 10.0 + 1.0, (i * i) % 13.0, (i * 3.0) % 7.0]
            })
            .collect();
        let y: Vec<f64> = x
            .iter()
            .map(|r| 2.0 + 0.5 * r[0] + 3.0 * r[1] - 1.0 * r[2] + 4.0 * r[3])
            .collect();
        let m = LinearModel::fit(&x, &y).unwrap();
        assert!((m.intercept - 2.0).abs() < 1e-8, "{m:?}");
        assert!((m.coefficients[3] - 4.0).abs() < 1e-8, "{m:?}");
    }

    #[test]
    fn duplicated_column_gets_zero_coefficient() {
        // third and fourth feature identical, target = 21 * tax
        let x: Vec<[f64; 4]> = (1..=12)
            .map(|i| {
                let up = 10.0 + i as f64 * 3.3;
                let q = (i % 5 + 1) as f64;
                let tax = 0.05 * up * q;
                [up, q, tax, tax]
            })
            .collect();
        let y: Vec<f64> = x.iter().map(|r| 21.0 * r[2]).collect();
        let m = LinearModel::fit(&x, &y).unwrap();
        assert_eq!(m.coefficients[3], 0.0);
        for (row, target) in x.iter().zip(&y) {
            assert!((m.predict(row) - target).abs() < 1e-6);
        }
    }

    #[test]
    fn too_few_rows_is_reported() {
        let err = LinearModel::fit(&[[1.0, 2.0, 3.0, 4.0]; 3], &[1.0; 3]).unwrap_err();
        assert!(matches!(err, SalesError::InsufficientData { rows: 3, params: 5 }));
    }

    #[test]
    fn split_is_seeded_and_sized() {
        let (train, test) = train_test_split(11, 0.2, 42);
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 8);
        let again = train_test_split(11, 0.2, 42);
        assert_eq!(again, (train.clone(), test.clone()));
        let mut all: Vec<usize> = train.into_iter().chain(test).collect();
        all.sort();
        assert_eq!(all, (0..11).collect::<Vec<_>>());
    }
}
