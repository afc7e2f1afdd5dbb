use crate::canonical::CanonicalProblem;
use crate::problem::ObjectiveKind;
use crate::solution::SolutionResult;

/// One Gauss-Jordan exchange step, recorded while tracing a solve.
///
/// The engines emit these instead of building display text; any renderer
/// can replay a solve from the sequence.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct PivotEvent {
    /// 1-based pivot count
    pub step: usize,
    pub pivot_row: usize,
    pub pivot_col: usize,
    /// Column that left the basis at `pivot_row`
    pub leaving: usize,
    /// Ratio-test candidates for the exchange: (index, ratio) pairs, over
    /// rows in the primal engine and over columns in the dual engine
    pub ratios: Vec<(usize, f64)>,
    /// Tableau after the pivot, reduced-cost row last, rhs column last
    pub tableau: Vec<Vec<f64>>,
    /// Basis after the pivot, row index -> column index
    pub basis: Vec<usize>,
}

/// Dense simplex tableau: `m` constraint rows plus the reduced-cost row,
/// with the right-hand side in the last column. Private working state of a
/// single solve; results are extracted into fresh values.
pub(crate) struct Tableau {
    /// (m + 1) x (columns + 1), reduced-cost row last
    rows: Vec<Vec<f64>>,
    /// Row index -> column index of the basic variable
    basis: Vec<usize>,
    structural: usize,
    columns: usize,
}

impl Tableau {
    /// Build the starting tableau with the slack columns as the basis.
    pub fn new(canon: &CanonicalProblem) -> Self {
        let m = canon.num_constraints();
        let columns = canon.num_columns();

        let mut rows = Vec::with_capacity(m + 1);
        for i in 0..m {
            let mut row = canon.a[i].clone();
            row.push(canon.rhs[i]);
            rows.push(row);
        }
        let mut cost = canon.cost_row.clone();
        cost.push(0.0);
        rows.push(cost);

        let basis = (0..m).map(|i| canon.slack_column(i)).collect();

        Self { rows, basis, structural: canon.structural, columns }
    }

    pub fn num_constraints(&self) -> usize {
        self.basis.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns
    }

    pub fn entry(&self, row: usize, col: usize) -> f64 {
        self.rows[row][col]
    }

    pub fn rhs(&self, row: usize) -> f64 {
        self.rows[row][self.columns]
    }

    pub fn reduced_cost(&self, col: usize) -> f64 {
        self.rows[self.num_constraints()][col]
    }

    pub fn basis(&self) -> &[usize] {
        &self.basis
    }

    /// Scale the pivot row to a unit pivot and eliminate the pivot column
    /// from every other row, then record the basis exchange. Returns the
    /// column that left the basis.
    pub fn pivot(&mut self, pivot_row: usize, pivot_col: usize) -> usize {
        let pivot = self.rows[pivot_row][pivot_col];
        for entry in &mut self.rows[pivot_row] {
            *entry /= pivot;
        }

        for i in 0..self.rows.len() {
            if i == pivot_row {
                continue;
            }
            let factor = self.rows[i][pivot_col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..=self.columns {
                self.rows[i][j] -= factor * self.rows[pivot_row][j];
            }
        }

        std::mem::replace(&mut self.basis[pivot_row], pivot_col)
    }

    /// Read the optimal solution off the tableau: basic original variables
    /// take their row's rhs, everything else is zero. The corner holds the
    /// negated value of the minimization objective, so the task's own
    /// objective is the corner as-is for Maximize and negated for Minimize.
    pub fn extract(&self, objective: ObjectiveKind) -> SolutionResult {
        let mut values = vec![0.0; self.structural];
        for (row, &col) in self.basis.iter().enumerate() {
            if col < self.structural {
                values[col] = self.rhs(row);
            }
        }

        let corner = self.rhs(self.num_constraints());
        let objective_value = match objective {
            ObjectiveKind::Maximize => corner,
            ObjectiveKind::Minimize => -corner,
        };

        SolutionResult::optimal(values, objective_value)
    }

    pub fn snapshot(&self) -> Vec<Vec<f64>> {
        self.rows.clone()
    }
}
