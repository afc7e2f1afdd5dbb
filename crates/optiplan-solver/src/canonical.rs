use crate::problem::{LpTask, ObjectiveKind, Relation};

/// An LP rewritten with only equality constraints and nonnegative variables.
///
/// Every constraint row gets one extra column at index `structural + i`: `+1`
/// for a `<=` row, `-1` for a `>=` row, and `0` for an `=` row. The zero
/// columns of equality rows are structurally dead; they are listed in
/// `barred` and the engines never let them enter the basis.
#[derive(Debug, Clone)]
pub struct CanonicalProblem {
    /// Equality matrix, `constraints` rows by `columns` columns
    pub a: Vec<Vec<f64>>,
    /// Right-hand side
    pub rhs: Vec<f64>,
    /// Initial reduced-cost row: the objective of the equivalent
    /// minimization, so pivoting stops when every entry is nonnegative
    pub cost_row: Vec<f64>,
    /// Number of original (structural) variables
    pub structural: usize,
    /// Columns that may never enter the basis
    pub barred: Vec<usize>,
    /// Direction of the original objective
    pub objective: ObjectiveKind,
}

impl CanonicalProblem {
    /// Augment a task with one slack/surplus column per constraint.
    pub fn from_task(task: &LpTask) -> Self {
        let n = task.num_variables();
        let m = task.num_constraints();
        let columns = n + m;

        let mut a = vec![vec![0.0; columns]; m];
        let mut barred = Vec::new();

        for (i, row) in task.a.iter().enumerate() {
            a[i][..n].copy_from_slice(row);
            match task.relations[i] {
                Relation::Le => a[i][n + i] = 1.0,
                Relation::Ge => a[i][n + i] = -1.0,
                Relation::Eq => barred.push(n + i),
            }
        }

        // Minimization-style costs: maximizing c^T x is minimizing -c^T x.
        let mut cost_row = vec![0.0; columns];
        for (j, &c) in task.c.iter().enumerate() {
            cost_row[j] = match task.objective {
                ObjectiveKind::Maximize => -c,
                ObjectiveKind::Minimize => c,
            };
        }

        Self {
            a,
            rhs: task.b.clone(),
            cost_row,
            structural: n,
            barred,
            objective: task.objective,
        }
    }

    pub fn num_constraints(&self) -> usize {
        self.rhs.len()
    }

    pub fn num_columns(&self) -> usize {
        self.structural + self.rhs.len()
    }

    /// Slack column belonging to constraint `i`.
    pub fn slack_column(&self, i: usize) -> usize {
        self.structural + i
    }

    pub fn is_barred(&self, column: usize) -> bool {
        self.barred.contains(&column)
    }

    /// Flip every `>=` row so its slack column reads `+1` and primal
    /// infeasibility shows up as a negative right-hand side. The slack
    /// columns then form an identity basis, which is what the dual simplex
    /// iteration starts from.
    pub fn normalized_for_dual(mut self) -> Self {
        for i in 0..self.rhs.len() {
            let slack = self.slack_column(i);
            if self.a[i][slack] < 0.0 {
                for entry in &mut self.a[i] {
                    *entry = -*entry;
                }
                self.rhs[i] = -self.rhs[i];
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixed_task() -> LpTask {
        LpTask::new(
            ObjectiveKind::Maximize,
            vec![2.0, 3.0],
            vec![vec![1.0, 1.0], vec![1.0, 2.0], vec![1.0, -1.0]],
            vec![10.0, 14.0, 2.0],
            vec![Relation::Le, Relation::Ge, Relation::Eq],
        )
    }

    /// Slack value that makes the augmented point satisfy row `i` exactly.
    fn slack_for(task: &LpTask, i: usize, x: &[f64]) -> f64 {
        let lhs = task.constraint_lhs(i, x);
        match task.relations[i] {
            Relation::Le => task.b[i] - lhs,
            Relation::Ge => lhs - task.b[i],
            Relation::Eq => 0.0,
        }
    }

    #[test]
    fn slack_signs_follow_relations() {
        let task = mixed_task();
        let canon = CanonicalProblem::from_task(&task);

        assert_eq!(canon.num_columns(), 5);
        assert_eq!(canon.a[0][2], 1.0);
        assert_eq!(canon.a[1][3], -1.0);
        assert_eq!(canon.a[2][4], 0.0);
        assert_eq!(canon.barred, vec![4]);
    }

    #[test]
    fn maximize_costs_are_negated() {
        let task = mixed_task();
        let canon = CanonicalProblem::from_task(&task);
        assert_eq!(&canon.cost_row[..2], &[-2.0, -3.0]);
        assert!(canon.cost_row[2..].iter().all(|&c| c == 0.0));

        let mut min_task = mixed_task();
        min_task.objective = ObjectiveKind::Minimize;
        let canon = CanonicalProblem::from_task(&min_task);
        assert_eq!(&canon.cost_row[..2], &[2.0, 3.0]);
    }

    #[test]
    fn augmented_point_satisfies_equality_system_iff_original_holds() {
        let task = mixed_task();
        let canon = CanonicalProblem::from_task(&task);

        // x = (4, 2): 6 <= 10, 8 >= 14 fails -> surplus would be negative
        // x = (6, 4): 10 <= 10, 14 >= 14, 6 - 4 = 2 all hold
        for (x, feasible) in [(vec![4.0, 2.0], false), (vec![6.0, 4.0], true)] {
            let mut augmented = x.clone();
            for i in 0..task.num_constraints() {
                augmented.push(slack_for(&task, i, &x));
            }

            // The augmented point always satisfies A'x' = b by construction;
            // original feasibility is exactly nonnegativity of the slacks
            // plus the equality rows holding.
            for i in 0..canon.num_constraints() {
                let lhs: f64 = canon.a[i].iter().zip(&augmented).map(|(a, x)| a * x).sum();
                let eq_holds = (lhs - canon.rhs[i]).abs() < 1e-9;
                match task.relations[i] {
                    Relation::Eq => assert_eq!(
                        eq_holds,
                        (task.constraint_lhs(i, &x) - task.b[i]).abs() < 1e-9
                    ),
                    _ => assert!(eq_holds),
                }
            }
            let slacks_ok = augmented[task.num_variables()..].iter().all(|&s| s >= 0.0);
            let eq_rows_ok = task
                .relations
                .iter()
                .enumerate()
                .filter(|(_, r)| **r == Relation::Eq)
                .all(|(i, _)| (task.constraint_lhs(i, &x) - task.b[i]).abs() < 1e-9);
            assert_eq!(slacks_ok && eq_rows_ok, feasible);
        }
    }

    #[test]
    fn dual_normalization_flips_ge_rows() {
        let task = LpTask::new(
            ObjectiveKind::Minimize,
            vec![2.0, 3.0],
            vec![vec![1.0, 1.0], vec![2.0, 1.0]],
            vec![4.0, 6.0],
            vec![Relation::Ge, Relation::Ge],
        );
        let canon = CanonicalProblem::from_task(&task).normalized_for_dual();

        assert_eq!(canon.a[0], vec![-1.0, -1.0, 1.0, 0.0]);
        assert_eq!(canon.a[1], vec![-2.0, -1.0, 0.0, 1.0]);
        assert_eq!(canon.rhs, vec![-4.0, -6.0]);
        // cost row untouched: still the minimization objective
        assert_eq!(&canon.cost_row[..2], &[2.0, 3.0]);
    }
}
