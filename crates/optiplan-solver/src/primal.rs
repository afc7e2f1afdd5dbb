use crate::canonical::CanonicalProblem;
use crate::problem::LpTask;
use crate::solution::SolutionResult;
use crate::tableau::{PivotEvent, Tableau};

/// Primal simplex over the slack starting basis.
///
/// The engine always starts from the slack basis, so it is only guaranteed
/// on tasks whose slack basis is feasible (`<=` rows with nonnegative
/// right-hand sides). There is no phase 1; `>=` and `=` tasks belong to the
/// dual engine or the verifier.
pub struct PrimalSimplex {
    /// Pivot cap before the solve is reported inconclusive
    max_iterations: usize,
    /// Tolerance for reduced-cost and ratio-test comparisons
    tolerance: f64,
}

impl Default for PrimalSimplex {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-4,
        }
    }
}

impl PrimalSimplex {
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
        let canon = CanonicalProblem::from_task(task);
        let mut tableau = Tableau::new(&canon);

        for step in 1..=self.max_iterations {
            let Some(pivot_col) = self.entering_column(&tableau, &canon) else {
                return tableau.extract(canon.objective);
            };
            let Some((pivot_row, ratios)) = self.leaving_row(&tableau, pivot_col) else {
                return SolutionResult::unbounded();
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

    /// Most negative reduced cost, first occurrence on ties. `None` means
    /// the current basis is optimal.
    fn entering_column(&self, tableau: &Tableau, canon: &CanonicalProblem) -> Option<usize> {
        let mut best = None;
        let mut best_cost = -self.tolerance;

        for j in 0..tableau.num_columns() {
            if canon.is_barred(j) {
                continue;
            }
            let cost = tableau.reduced_cost(j);
            if cost < best_cost {
                best_cost = cost;
                best = Some(j);
            }
        }
        best
    }

    /// Minimum-ratio test over rows with a strictly positive entry in the
    /// pivot column. `None` means the objective is unbounded.
    fn leaving_row(&self, tableau: &Tableau, col: usize) -> Option<(usize, Vec<(usize, f64)>)> {
        let mut best = None;
        let mut min_ratio = f64::INFINITY;
        let mut ratios = Vec::new();

        for i in 0..tableau.num_constraints() {
            let entry = tableau.entry(i, col);
            if entry > self.tolerance {
                let ratio = tableau.rhs(i) / entry;
                ratios.push((i, ratio));
                if ratio >= 0.0 && ratio < min_ratio {
                    min_ratio = ratio;
                    best = Some(i);
                }
            }
        }

        best.map(|row| (row, ratios))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{ObjectiveKind, Relation};
    use crate::solution::SolveStatus;

    fn textbook_max() -> LpTask {
        // maximize 3x1 + 5x2
        //   x1        <= 4
        //        2x2  <= 12
        //   3x1 + 2x2 <= 18
        // optimal x = (2, 6), F = 36
        LpTask::new(
            ObjectiveKind::Maximize,
            vec![3.0, 5.0],
            vec![vec![1.0, 0.0], vec![0.0, 2.0], vec![3.0, 2.0]],
            vec![4.0, 12.0, 18.0],
            vec![Relation::Le, Relation::Le, Relation::Le],
        )
    }

    #[test]
    fn solves_the_textbook_maximization() {
        let result = PrimalSimplex::new().solve(&textbook_max());

        assert_eq!(result.status, SolveStatus::Optimal);
        assert!((result.values[0] - 2.0).abs() < 1e-6, "x1 = {}", result.values[0]);
        assert!((result.values[1] - 6.0).abs() < 1e-6, "x2 = {}", result.values[1]);
        assert!((result.objective_value - 36.0).abs() < 1e-6, "F = {}", result.objective_value);
    }

    #[test]
    fn solves_a_three_constraint_corner() {
        // maximize 3x + 2y, x + y <= 4, x <= 3, y <= 3 -> x = 3, y = 1, F = 11
        let task = LpTask::new(
            ObjectiveKind::Maximize,
            vec![3.0, 2.0],
            vec![vec![1.0, 1.0], vec![1.0, 0.0], vec![0.0, 1.0]],
            vec![4.0, 3.0, 3.0],
            vec![Relation::Le, Relation::Le, Relation::Le],
        );
        let result = PrimalSimplex::new().solve(&task);

        assert_eq!(result.status, SolveStatus::Optimal);
        assert!((result.values[0] - 3.0).abs() < 1e-6);
        assert!((result.values[1] - 1.0).abs() < 1e-6);
        assert!((result.objective_value - 11.0).abs() < 1e-6);
    }

    #[test]
    fn reports_unbounded_when_no_row_limits_the_entering_column() {
        // maximize x with -x <= 1: x can grow forever
        let task = LpTask::new(
            ObjectiveKind::Maximize,
            vec![1.0],
            vec![vec![-1.0]],
            vec![1.0],
            vec![Relation::Le],
        );
        let result = PrimalSimplex::new().solve(&task);
        assert_eq!(result.status, SolveStatus::Unbounded);
    }

    #[test]
    fn nonnegative_costs_are_optimal_at_the_origin() {
        // minimize 2x + y over <= rows: the slack basis is already optimal
        let task = LpTask::new(
            ObjectiveKind::Minimize,
            vec![2.0, 1.0],
            vec![vec![1.0, 1.0]],
            vec![5.0],
            vec![Relation::Le],
        );
        let result = PrimalSimplex::new().solve(&task);

        assert_eq!(result.status, SolveStatus::Optimal);
        assert_eq!(result.values, vec![0.0, 0.0]);
        assert!((result.objective_value).abs() < 1e-9);
    }

    #[test]
    fn iteration_cap_is_inconclusive_not_unbounded() {
        let result = PrimalSimplex::new()
            .with_max_iterations(1)
            .solve(&textbook_max());
        assert_eq!(result.status, SolveStatus::IterationLimit);
    }

    #[test]
    fn trace_replays_the_solve() {
        let (result, events) = PrimalSimplex::new().solve_traced(&textbook_max());

        assert_eq!(result.status, SolveStatus::Optimal);
        assert!(!events.is_empty());
        for (k, event) in events.iter().enumerate() {
            assert_eq!(event.step, k + 1);
            assert_eq!(event.basis[event.pivot_row], event.pivot_col);
            assert!(!event.ratios.is_empty());
        }

        // the final snapshot's basis solves the task
        let last = events.last().unwrap();
        let n = 2;
        let mut values = vec![0.0; n];
        for (row, &col) in last.basis.iter().enumerate() {
            if col < n {
                values[col] = last.tableau[row].last().copied().unwrap();
            }
        }
        assert!((values[0] - result.values[0]).abs() < 1e-9);
        assert!((values[1] - result.values[1]).abs() < 1e-9);
    }

    #[test]
    fn equality_slack_column_never_enters_the_basis() {
        // x + y = 4 leaves a structurally zero column; the engine must not
        // pick it even though its reduced cost is zero
        let task = LpTask::new(
            ObjectiveKind::Maximize,
            vec![1.0, 1.0],
            vec![vec![1.0, 1.0], vec![1.0, 0.0]],
            vec![4.0, 4.0],
            vec![Relation::Eq, Relation::Le],
        );
        let (_, events) = PrimalSimplex::new().solve_traced(&task);
        for event in &events {
            assert_ne!(event.pivot_col, 2, "barred equality slack entered the basis");
        }
    }
}
