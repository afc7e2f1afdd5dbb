use crate::problem::{LpTask, ObjectiveKind, Relation};

/// Outcome of certifying a candidate plan
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateStatus {
    /// The plan is feasible and a matching dual plan certifies optimality
    Optimal,
    /// The plan is feasible but no valid dual plan exists for it
    NotOptimal,
    /// The plan violates at least one constraint
    Infeasible,
}

/// A duality certificate for a candidate plan.
///
/// When the status is `Optimal`, `dual_values` is a feasible dual plan with
/// `dual_objective` equal to `objective_value` (strong duality); callers may
/// assert that equality as a consistency check.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Certificate {
    pub status: CertificateStatus,
    /// `F(x)` of the candidate plan; present whenever the plan is feasible
    pub objective_value: Option<f64>,
    /// Recovered dual plan `y`; present when the slackness system solved
    pub dual_values: Option<Vec<f64>>,
    /// `G(y) = b . y`; present when the plan is optimal
    pub dual_objective: Option<f64>,
    /// Which constraints the plan makes binding
    pub active: Vec<bool>,
    /// Indices of violated constraints (infeasible plans only)
    pub violated: Vec<usize>,
    pub message: String,
}

impl Certificate {
    pub fn is_optimal(&self) -> bool {
        self.status == CertificateStatus::Optimal
    }

    pub fn is_feasible(&self) -> bool {
        self.status != CertificateStatus::Infeasible
    }
}

/// Certifies plan optimality through duality theory: a feasible plan is
/// optimal exactly when complementary slackness admits a feasible dual plan.
pub struct Verifier {
    tolerance: f64,
}

impl Default for Verifier {
    fn default() -> Self {
        Self { tolerance: 1e-4 }
    }
}

impl Verifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Check a candidate plan for optimality.
    ///
    /// Feasibility is checked first; a violated constraint short-circuits
    /// before any system is assembled. For a feasible plan, complementary
    /// slackness fixes `y_i = 0` on every inactive constraint and requires
    /// `A^T y = c` over the plan's support, a linear system whose shape
    /// depends on the support structure; it is solved by Gaussian
    /// elimination and the recovered duals are checked for sign and dual
    /// feasibility.
    pub fn certify(&self, task: &LpTask, plan: &[f64]) -> Certificate {
        let eps = self.tolerance;
        let n = task.num_variables();
        let m = task.num_constraints();

        // Step 1: feasibility and activity of every constraint.
        let mut active = vec![false; m];
        let mut violated = Vec::new();

        for i in 0..m {
            let lhs = task.constraint_lhs(i, plan);
            let b = task.b[i];
            let (ok, is_active) = match task.relations[i] {
                Relation::Le => (lhs <= b + eps, (lhs - b).abs() < eps),
                Relation::Ge => (lhs >= b - eps, (lhs - b).abs() < eps),
                Relation::Eq => ((lhs - b).abs() < eps, true),
            };
            active[i] = is_active;
            if !ok {
                violated.push(i);
            }
        }

        if !violated.is_empty() {
            let listed = violated
                .iter()
                .map(|i| (i + 1).to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Certificate {
                status: CertificateStatus::Infeasible,
                objective_value: None,
                dual_values: None,
                dual_objective: None,
                active,
                violated,
                message: format!("plan violates constraint(s) {listed}"),
            };
        }

        let objective_value = task.objective_value(plan);

        // Step 2: support of the plan and the free dual variables.
        let support: Vec<usize> = (0..n).filter(|&j| plan[j] > eps).collect();
        let free: Vec<usize> = (0..m).filter(|&i| active[i]).collect();

        // Step 3: solve the complementary-slackness system for the duals.
        let Some(duals) = self.solve_slackness_system(task, &support, &free) else {
            return Certificate {
                status: CertificateStatus::NotOptimal,
                objective_value: Some(objective_value),
                dual_values: None,
                dual_objective: None,
                active,
                violated: Vec::new(),
                message: "complementary-slackness system has no solution".to_string(),
            };
        };

        // Step 4: dual sign and dual feasibility.
        if let Some(i) = (0..m).find(|&i| duals[i] < -eps) {
            return Certificate {
                status: CertificateStatus::NotOptimal,
                objective_value: Some(objective_value),
                dual_values: Some(duals.clone()),
                dual_objective: None,
                active,
                violated: Vec::new(),
                message: format!("dual variable y{} is negative", i + 1),
            };
        }

        for j in 0..n {
            let sum: f64 = (0..m).map(|i| task.a[i][j] * duals[i]).sum();
            let ok = match task.objective {
                ObjectiveKind::Maximize => sum >= task.c[j] - eps,
                ObjectiveKind::Minimize => sum <= task.c[j] + eps,
            };
            if !ok {
                return Certificate {
                    status: CertificateStatus::NotOptimal,
                    objective_value: Some(objective_value),
                    dual_values: Some(duals),
                    dual_objective: None,
                    active,
                    violated: Vec::new(),
                    message: format!("dual constraint {} fails", j + 1),
                };
            }
        }

        // Step 5: both objectives; equal by strong duality.
        let dual_objective: f64 = (0..m).map(|i| task.b[i] * duals[i]).sum();

        Certificate {
            status: CertificateStatus::Optimal,
            objective_value: Some(objective_value),
            dual_values: Some(duals),
            dual_objective: Some(dual_objective),
            active,
            violated: Vec::new(),
            message: "plan is optimal".to_string(),
        }
    }

    /// Solve `sum_i A[i,j] y_i = c_j` for `j` in the support, with `y_i = 0`
    /// fixed on inactive constraints. Returns the full dual vector, or
    /// `None` when the system is inconsistent for the plan.
    fn solve_slackness_system(
        &self,
        task: &LpTask,
        support: &[usize],
        free: &[usize],
    ) -> Option<Vec<f64>> {
        let eps = self.tolerance;
        let m = task.num_constraints();
        let equations = support.len();
        let unknowns = free.len();

        let mut duals = vec![0.0; m];

        if equations == 0 {
            return Some(duals);
        }
        if unknowns == 0 {
            // nothing to solve for: consistent only if every rhs is zero
            return support
                .iter()
                .all(|&j| task.c[j].abs() <= eps)
                .then_some(duals);
        }
        if equations < unknowns {
            // underdetermined; not solved
            return None;
        }

        // Square solve on the first `unknowns` equations, then check any
        // remaining equations by substitution.
        let mut matrix: Vec<Vec<f64>> = (0..unknowns)
            .map(|eq| {
                let j = support[eq];
                let mut row: Vec<f64> = free.iter().map(|&i| task.a[i][j]).collect();
                row.push(task.c[j]);
                row
            })
            .collect();

        let solution = gaussian_elimination(&mut matrix, eps)?;

        for &j in &support[unknowns..] {
            let lhs: f64 = free
                .iter()
                .zip(&solution)
                .map(|(&i, &y)| task.a[i][j] * y)
                .sum();
            if (lhs - task.c[j]).abs() > eps {
                return None;
            }
        }

        for (&i, &y) in free.iter().zip(&solution) {
            duals[i] = y;
        }
        Some(duals)
    }
}

/// Gaussian elimination with partial pivoting on an augmented square
/// system. `None` on a singular pivot.
fn gaussian_elimination(matrix: &mut [Vec<f64>], eps: f64) -> Option<Vec<f64>> {
    let size = matrix.len();

    for k in 0..size {
        let max_row = (k..size).max_by(|&a, &b| {
            matrix[a][k]
                .abs()
                .partial_cmp(&matrix[b][k].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        matrix.swap(k, max_row);

        if matrix[k][k].abs() < eps {
            return None;
        }

        for i in k + 1..size {
            let factor = matrix[i][k] / matrix[k][k];
            for j in k..=size {
                matrix[i][j] -= factor * matrix[k][j];
            }
        }
    }

    let mut solution = vec![0.0; size];
    for i in (0..size).rev() {
        let mut value = matrix[i][size];
        for j in i + 1..size {
            value -= matrix[i][j] * solution[j];
        }
        solution[i] = value / matrix[i][i];
    }
    Some(solution)
}
