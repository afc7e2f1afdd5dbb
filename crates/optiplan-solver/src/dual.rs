use crate::canonical::CanonicalProblem;
use crate::primal::PrimalSimplex;
use crate::problem::{LpTask, ObjectiveKind, Relation};
use crate::solution::SolutionResult;
use crate::tableau::{PivotEvent, Tableau};

/// Dual simplex over the slack basis.
///
/// Assumes the starting reduced-cost row is already optimal (dual feasible)
/// while right-hand sides may be negative, the usual shape of a
/// minimization with `>=` rows and nonnegative costs. `>=` rows are
/// normalized so their slack columns form the identity basis; equality rows
/// have no slack identity at all and are outside this engine's guarantee.
pub struct DualSimplex {
    /// Pivot cap before the solve is reported inconclusive
    max_iterations: usize,
    /// Tolerance for rhs and ratio comparisons
    tolerance: f64,
}

impl Default for DualSimplex {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-4,
        }
    }
}

impl DualSimplex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn solve(&self, task: &LpTask) -> SolutionResult {
        self.run(task, &mut None)
    }

    /// Solve and record one [`PivotEvent`] per exchange step.
    pub fn solve_traced(&self, task: &LpTask) -> (SolutionResult, Vec<PivotEvent>) {
        let mut trace = Some(Vec::new());
        let result = self.run(task, &mut trace);
        (result, trace.unwrap_or_default())
    }

    fn run(&self, task: &LpTask, trace: &mut Option<Vec<PivotEvent>>) -> SolutionResult {
        let canon = CanonicalProblem::from_task(task).normalized_for_dual();
        let mut tableau = Tableau::new(&canon);

        for step in 1..=self.max_iterations {
            let Some(pivot_row) = self.leaving_row(&tableau) else {
                // no negative rhs left: primal feasible, hence optimal
                return tableau.extract(canon.objective);
            };
            let Some((pivot_col, ratios)) = self.entering_column(&tableau, &canon, pivot_row)
            else {
                return SolutionResult::infeasible(
                    "no valid pivot column: the constraints admit no solution",
                );
            };

            let leaving = tableau.pivot(pivot_row, pivot_col);
            if let Some(events) = trace {
                events.push(PivotEvent {
                    step,
                    pivot_row,
                    pivot_col,
                    leaving,
                    ratios,
                    tableau: tableau.snapshot(),
                    basis: tableau.basis().to_vec(),
                });
            }
        }

        SolutionResult::iteration_limit(self.max_iterations)
    }

    /// Row with the most negative right-hand side, first occurrence on
    /// ties. `None` means the basis is primal feasible.
    fn leaving_row(&self, tableau: &Tableau) -> Option<usize> {
        let mut best = None;
        let mut most_negative = -self.tolerance;

        for i in 0..tableau.num_constraints() {
            let rhs = tableau.rhs(i);
            if rhs < most_negative {
                most_negative = rhs;
                best = Some(i);
            }
        }
        best
    }

    /// Among columns with a strictly negative entry in the pivot row, the
    /// one minimizing `|reduced_cost / entry|`, which keeps the cost row
    /// dual feasible. `None` means the task is infeasible.
    fn entering_column(
        &self,
        tableau: &Tableau,
        canon: &CanonicalProblem,
        row: usize,
    ) -> Option<(usize, Vec<(usize, f64)>)> {
        let mut best = None;
        let mut min_ratio = f64::INFINITY;
        let mut ratios = Vec::new();

        for j in 0..tableau.num_columns() {
            if canon.is_barred(j) {
                continue;
            }
            let entry = tableau.entry(row, j);
            if entry < -self.tolerance {
                let ratio = (tableau.reduced_cost(j) / entry).abs();
                ratios.push((j, ratio));
                if ratio < min_ratio {
                    min_ratio = ratio;
                    best = Some(j);
                }
            }
        }

        best.map(|col| (col, ratios))
    }
}

/// The algebraic dual: transpose the constraints, swap costs with
/// right-hand sides, and flip both the objective direction and every
/// relation. The dual of `max {c x : A x <= b}` is `min {b y : A^T y >= c}`
/// and vice versa.
pub fn dual_of(task: &LpTask) -> LpTask {
    let n = task.num_variables();
    let m = task.num_constraints();

    let mut transposed = vec![vec![0.0; m]; n];
    for (i, row) in task.a.iter().enumerate() {
        for (j, &value) in row.iter().enumerate() {
            transposed[j][i] = value;
        }
    }

    let (objective, relation) = match task.objective {
        ObjectiveKind::Maximize => (ObjectiveKind::Minimize, Relation::Ge),
        ObjectiveKind::Minimize => (ObjectiveKind::Maximize, Relation::Le),
    };

    LpTask::new(objective, task.b.clone(), transposed, task.c.clone(), vec![relation; n])
}

/// Solve a task and its algebraic dual side by side: the task with the
/// primal engine, the dual with the dual engine (whose slack basis is dual
/// feasible for exactly the shape `dual_of` produces). For feasible bounded
/// tasks the two objective values agree by strong duality.
pub fn solve_primal_dual(task: &LpTask) -> (SolutionResult, SolutionResult) {
    let primal = PrimalSimplex::new().solve(task);
    let dual = DualSimplex::new().solve(&dual_of(task));
    (primal, dual)
}
