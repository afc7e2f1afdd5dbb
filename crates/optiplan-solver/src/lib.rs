mod canonical;
mod dual;
mod primal;
mod problem;
mod solution;
mod tableau;
mod transport;
mod verify;

pub use canonical::CanonicalProblem;
pub use dual::{DualSimplex, dual_of, solve_primal_dual};
pub use primal::PrimalSimplex;
pub use problem::{LpTask, ObjectiveKind, ProblemError, Relation, TransportationInstance};
pub use solution::{SolutionResult, SolveStatus};
pub use tableau::PivotEvent;
pub use transport::{AllocationEvent, NorthwestCorner, TransportError, TransportPlan};
pub use verify::{Certificate, CertificateStatus, Verifier};
