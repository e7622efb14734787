use serde::{Deserialize, Serialize};

use super::summary::require_rows;
use crate::data::filter::FilteredView;
use crate::data::model::NumericColumn;
use crate::error::EmptyViewError;

/// Pairwise Pearson correlation among numeric columns.
///
/// Symmetric. An entry is `None` when either column has zero variance in
/// the view, since the coefficient is undefined there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    columns: Vec<NumericColumn>,
    values: Vec<Vec<Option<f64>>>,
}

/// One coefficient against a reference column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub column: NumericColumn,
    pub coefficient: Option<f64>,
}

impl CorrelationMatrix {
    pub fn columns(&self) -> &[NumericColumn] {
        &self.columns
    }

    fn position(&self, column: NumericColumn) -> Option<usize> {
        self.columns.iter().position(|&c| c == column)
    }

    /// Coefficient between two columns; `None` if undefined or if either
    /// column is not part of the matrix.
    pub fn get(&self, a: NumericColumn, b: NumericColumn) -> Option<f64> {
        let i = self.position(a)?;
        let j = self.position(b)?;
        self.values[i][j]
    }

    /// Lookup by canonical column name (`"price"`, `"engine_size"`, ...).
    pub fn get_by_name(&self, a: &str, b: &str) -> Option<f64> {
        let find = |name: &str| self.columns.iter().copied().find(|c| c.name() == name);
        self.get(find(a)?, find(b)?)
    }

    /// Every column's correlation with `reference`, strongest positive
    /// first, undefined entries last. Includes `reference` itself.
    pub fn ranked_against(&self, reference: NumericColumn) -> Vec<Correlation> {
        let Some(i) = self.position(reference) else {
            return Vec::new();
        };
        let mut ranked: Vec<Correlation> = self
            .columns
            .iter()
            .zip(&self.values[i])
            .map(|(&column, &coefficient)| Correlation {
                column,
                coefficient,
            })
            .collect();
        ranked.sort_by(|a, b| match (a.coefficient, b.coefficient) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        ranked
    }
}

/// Correlate the given numeric columns over `view`. Duplicate columns are
/// collapsed; an empty column list means every numeric column. Needs at
/// least two rows.
pub fn correlate(
    view: &FilteredView<'_>,
    columns: &[NumericColumn],
) -> Result<CorrelationMatrix, EmptyViewError> {
    require_rows(view, 2)?;

    let requested: &[NumericColumn] = if columns.is_empty() {
        &NumericColumn::ALL
    } else {
        columns
    };
    let mut selected: Vec<NumericColumn> = Vec::new();
    for &c in requested {
        if !selected.contains(&c) {
            selected.push(c);
        }
    }

    // Centered series per column. A column whose raw values are all equal
    // has zero variance even when rounding in the mean leaves residue.
    let n = view.len() as f64;
    let mut constant = Vec::with_capacity(selected.len());
    let centered: Vec<Vec<f64>> = selected
        .iter()
        .map(|&c| {
            let xs: Vec<f64> = view.iter().map(|l| l.numeric(c)).collect();
            constant.push(xs.windows(2).all(|w| w[0] == w[1]));
            let mean = xs.iter().sum::<f64>() / n;
            xs.into_iter().map(|x| x - mean).collect()
        })
        .collect();
    let sum_sq: Vec<f64> = centered
        .iter()
        .map(|d| d.iter().map(|x| x * x).sum())
        .collect();
    let undefined: Vec<bool> = constant
        .iter()
        .zip(&sum_sq)
        .map(|(&flat, &ss)| flat || ss <= 0.0)
        .collect();

    let k = selected.len();
    let mut values = vec![vec![None; k]; k];
    for i in 0..k {
        if !undefined[i] {
            values[i][i] = Some(1.0);
        }
        for j in (i + 1)..k {
            if undefined[i] || undefined[j] {
                continue;
            }
            let cross: f64 = centered[i]
                .iter()
                .zip(&centered[j])
                .map(|(x, y)| x * y)
                .sum();
            let r = (cross / (sum_sq[i] * sum_sq[j]).sqrt()).clamp(-1.0, 1.0);
            values[i][j] = Some(r);
            values[j][i] = Some(r);
        }
    }

    Ok(CorrelationMatrix {
        columns: selected,
        values,
    })
}
