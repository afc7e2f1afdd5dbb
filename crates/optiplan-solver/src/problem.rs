use thiserror::Error;

/// Direction of the objective function
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveKind {
    Maximize,
    Minimize,
}

/// Comparison operator of a constraint row
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl Relation {
    /// Symbol used when rendering a constraint
    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Le => "<=",
            Relation::Ge => ">=",
            Relation::Eq => "=",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProblemError {
    #[error("task must have at least one variable and one constraint")]
    Empty,
    #[error("constraint row {row} has {found} coefficients but the task has {expected} variables")]
    RowLength { row: usize, expected: usize, found: usize },
    #[error("constraint matrix has {found} rows but the right-hand side has {expected} entries")]
    MatrixRows { expected: usize, found: usize },
    #[error("relations has {found} entries but the task has {expected} constraints")]
    RelationLength { expected: usize, found: usize },
    #[error("plan has {found} values but the task has {expected} variables")]
    PlanLength { expected: usize, found: usize },
    #[error("cost row {row} has {found} entries but the instance has {expected} consumers")]
    CostRowLength { row: usize, expected: usize, found: usize },
    #[error("cost matrix has {found} rows but the instance has {expected} suppliers")]
    CostRows { expected: usize, found: usize },
}

/// A general linear-programming task: optimize `c^T x` subject to
/// `A x {<=,>=,=} b` and `x >= 0`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct LpTask {
    /// Whether to maximize or minimize the objective
    pub objective: ObjectiveKind,
    /// Objective coefficients, one per variable
    pub c: Vec<f64>,
    /// Constraint matrix, one row per constraint
    pub a: Vec<Vec<f64>>,
    /// Right-hand side, one entry per constraint
    pub b: Vec<f64>,
    /// Comparison operator of each constraint
    pub relations: Vec<Relation>,
}

impl LpTask {
    pub fn new(
        objective: ObjectiveKind,
        c: Vec<f64>,
        a: Vec<Vec<f64>>,
        b: Vec<f64>,
        relations: Vec<Relation>,
    ) -> Self {
        Self { objective, c, a, b, relations }
    }

    pub fn num_variables(&self) -> usize {
        self.c.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.b.len()
    }

    /// Check the shape invariants once at the boundary. The engines assume a
    /// validated task and index without further checks.
    pub fn validate(&self) -> Result<(), ProblemError> {
        let n = self.num_variables();
        let m = self.num_constraints();

        if n == 0 || m == 0 {
            return Err(ProblemError::Empty);
        }
        if self.a.len() != m {
            return Err(ProblemError::MatrixRows { expected: m, found: self.a.len() });
        }
        for (i, row) in self.a.iter().enumerate() {
            if row.len() != n {
                return Err(ProblemError::RowLength { row: i, expected: n, found: row.len() });
            }
        }
        if self.relations.len() != m {
            return Err(ProblemError::RelationLength { expected: m, found: self.relations.len() });
        }
        Ok(())
    }

    /// Check a candidate plan against the task shape.
    pub fn validate_plan(&self, plan: &[f64]) -> Result<(), ProblemError> {
        if plan.len() != self.num_variables() {
            return Err(ProblemError::PlanLength {
                expected: self.num_variables(),
                found: plan.len(),
            });
        }
        Ok(())
    }

    /// Objective value `c^T x` of a plan.
    pub fn objective_value(&self, x: &[f64]) -> f64 {
        self.c.iter().zip(x).map(|(c, x)| c * x).sum()
    }

    /// Left-hand side `A[i] . x` of constraint `i`.
    pub fn constraint_lhs(&self, i: usize, x: &[f64]) -> f64 {
        self.a[i].iter().zip(x).map(|(a, x)| a * x).sum()
    }
}

/// A balanced transportation instance: ship from `supply.len()` suppliers to
/// `demand.len()` consumers at the given per-unit costs.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct TransportationInstance {
    /// Per-unit shipping costs, one row per supplier
    pub costs: Vec<Vec<f64>>,
    /// Available amount at each supplier
    pub supply: Vec<f64>,
    /// Required amount at each consumer
    pub demand: Vec<f64>,
}

impl TransportationInstance {
    pub fn new(costs: Vec<Vec<f64>>, supply: Vec<f64>, demand: Vec<f64>) -> Self {
        Self { costs, supply, demand }
    }

    pub fn num_suppliers(&self) -> usize {
        self.supply.len()
    }

    pub fn num_consumers(&self) -> usize {
        self.demand.len()
    }

    pub fn total_supply(&self) -> f64 {
        self.supply.iter().sum()
    }

    pub fn total_demand(&self) -> f64 {
        self.demand.iter().sum()
    }

    pub fn validate(&self) -> Result<(), ProblemError> {
        let m = self.num_suppliers();
        let n = self.num_consumers();

        if m == 0 || n == 0 {
            return Err(ProblemError::Empty);
        }
        if self.costs.len() != m {
            return Err(ProblemError::CostRows { expected: m, found: self.costs.len() });
        }
        for (i, row) in self.costs.iter().enumerate() {
            if row.len() != n {
                return Err(ProblemError::CostRowLength { row: i, expected: n, found: row.len() });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> LpTask {
        LpTask::new(
            ObjectiveKind::Maximize,
            vec![3.0, 5.0],
            vec![vec![1.0, 0.0], vec![0.0, 2.0], vec![3.0, 2.0]],
            vec![4.0, 12.0, 18.0],
            vec![Relation::Le, Relation::Le, Relation::Le],
        )
    }

    #[test]
    fn valid_task_passes() {
        assert!(sample_task().validate().is_ok());
    }

    #[test]
    fn ragged_matrix_is_rejected() {
        let mut task = sample_task();
        task.a[1] = vec![1.0];
        assert_eq!(
            task.validate(),
            Err(ProblemError::RowLength { row: 1, expected: 2, found: 1 })
        );
    }

    #[test]
    fn relation_count_must_match() {
        let mut task = sample_task();
        task.relations.pop();
        assert!(matches!(task.validate(), Err(ProblemError::RelationLength { .. })));
    }

    #[test]
    fn objective_and_lhs_helpers() {
        let task = sample_task();
        let x = [2.0, 6.0];
        assert!((task.objective_value(&x) - 36.0).abs() < 1e-12);
        assert!((task.constraint_lhs(2, &x) - 18.0).abs() < 1e-12);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn task_round_trips_through_json() {
        let json = r#"{
            "objective": "maximize",
            "c": [3.0, 5.0],
            "a": [[1.0, 0.0], [0.0, 2.0], [3.0, 2.0]],
            "b": [4.0, 12.0, 18.0],
            "relations": ["le", "le", "le"]
        }"#;
        let task: LpTask = serde_json::from_str(json).unwrap();
        assert!(task.validate().is_ok());
        assert_eq!(task.objective, ObjectiveKind::Maximize);
        assert_eq!(task.relations, vec![Relation::Le; 3]);

        let back = serde_json::to_string(&task).unwrap();
        let again: LpTask = serde_json::from_str(&back).unwrap();
        assert_eq!(again.c, task.c);
        assert_eq!(again.a, task.a);
        assert_eq!(again.b, task.b);
    }

    #[test]
    fn transportation_shapes() {
        let inst = TransportationInstance::new(
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            vec![10.0, 5.0],
            vec![7.0, 8.0],
        );
        assert!(inst.validate().is_ok());
        assert!((inst.total_supply() - 15.0).abs() < 1e-12);
        assert!((inst.total_demand() - 15.0).abs() < 1e-12);

        let ragged = TransportationInstance::new(
            vec![vec![1.0], vec![3.0, 4.0]],
            vec![10.0, 5.0],
            vec![7.0, 8.0],
        );
        assert!(matches!(
            ragged.validate(),
            Err(ProblemError::CostRowLength { row: 0, .. })
        ));
    }
}
