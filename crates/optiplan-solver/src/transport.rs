use thiserror::Error;

use crate::problem::TransportationInstance;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("unbalanced instance: total supply {supply} != total demand {demand}")]
    Unbalanced { supply: f64, demand: f64 },
}

/// A basic feasible shipping plan for a balanced transportation instance.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TransportPlan {
    /// Shipped amount per (supplier, consumer) cell
    pub allocation: Vec<Vec<f64>>,
    /// The m + n - 1 basis cells, including zero-valued cells added by
    /// degeneracy repair
    pub basic_cells: Vec<(usize, usize)>,
    /// Total shipping cost of the plan
    pub total_cost: f64,
}

impl TransportPlan {
    pub fn row_sum(&self, i: usize) -> f64 {
        self.allocation[i].iter().sum()
    }

    pub fn column_sum(&self, j: usize) -> f64 {
        self.allocation.iter().map(|row| row[j]).sum()
    }

    /// Cells with a strictly positive shipment.
    pub fn occupied_cells(&self) -> usize {
        self.allocation
            .iter()
            .map(|row| row.iter().filter(|&&a| a > 0.0).count())
            .sum()
    }
}

/// One allocation step of the northwest-corner walk.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct AllocationEvent {
    /// 1-based step count
    pub step: usize,
    pub row: usize,
    pub col: usize,
    /// Amount placed at (row, col)
    pub amount: f64,
    /// Supplier remainders after the step
    pub remaining_supply: Vec<f64>,
    /// Consumer remainders after the step
    pub remaining_demand: Vec<f64>,
}

/// Northwest-corner construction of an initial basic feasible plan, with
/// degeneracy repair.
pub struct NorthwestCorner {
    /// Tolerance for the balance check and remainder comparisons
    tolerance: f64,
}

impl Default for NorthwestCorner {
    fn default() -> Self {
        Self { tolerance: 1e-4 }
    }
}

impl NorthwestCorner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn solve(&self, instance: &TransportationInstance) -> Result<TransportPlan, TransportError> {
        self.run(instance, &mut None)
    }

    /// Solve and record one [`AllocationEvent`] per visited cell.
    pub fn solve_traced(
        &self,
        instance: &TransportationInstance,
    ) -> (Result<TransportPlan, TransportError>, Vec<AllocationEvent>) {
        let mut trace = Some(Vec::new());
        let result = self.run(instance, &mut trace);
        (result, trace.unwrap_or_default())
    }

    fn run(
        &self,
        instance: &TransportationInstance,
        trace: &mut Option<Vec<AllocationEvent>>,
    ) -> Result<TransportPlan, TransportError> {
        let supply_total = instance.total_supply();
        let demand_total = instance.total_demand();
        if (supply_total - demand_total).abs() > self.tolerance {
            return Err(TransportError::Unbalanced {
                supply: supply_total,
                demand: demand_total,
            });
        }

        let m = instance.num_suppliers();
        let n = instance.num_consumers();

        let mut allocation = vec![vec![0.0; n]; m];
        let mut basic_cells = Vec::with_capacity(m + n - 1);
        let mut remaining_supply = instance.supply.clone();
        let mut remaining_demand = instance.demand.clone();

        // Walk from the northwest corner, exhausting one supplier or one
        // consumer per step. A visited cell is a basis cell even when the
        // amount is zero. On simultaneous exhaustion only the supplier
        // index advances.
        let mut i = 0;
        let mut j = 0;
        let mut step = 0;
        while i < m && j < n {
            step += 1;
            let amount = remaining_supply[i].min(remaining_demand[j]);
            allocation[i][j] = amount;
            basic_cells.push((i, j));
            remaining_supply[i] -= amount;
            remaining_demand[j] -= amount;

            if let Some(events) = trace {
                events.push(AllocationEvent {
                    step,
                    row: i,
                    col: j,
                    amount,
                    remaining_supply: remaining_supply.clone(),
                    remaining_demand: remaining_demand.clone(),
                });
            }

            if remaining_supply[i].abs() <= self.tolerance {
                i += 1;
            } else {
                j += 1;
            }
        }

        self.repair_degeneracy(&allocation, &mut basic_cells, m, n);

        let total_cost = allocation
            .iter()
            .zip(&instance.costs)
            .map(|(arow, crow)| arow.iter().zip(crow).map(|(a, c)| a * c).sum::<f64>())
            .sum();

        Ok(TransportPlan { allocation, basic_cells, total_cost })
    }

    /// Pad the basis with zero-valued cells until it has m + n - 1 entries.
    /// Cells are taken in row-major order from the unoccupied ones; the
    /// result need not be a spanning tree of the bipartite graph, which a
    /// stepping-stone improvement pass would additionally require.
    fn repair_degeneracy(
        &self,
        allocation: &[Vec<f64>],
        basic_cells: &mut Vec<(usize, usize)>,
        m: usize,
        n: usize,
    ) {
        let required = m + n - 1;
        for i in 0..m {
            for j in 0..n {
                if basic_cells.len() >= required {
                    return;
                }
                if allocation[i][j] == 0.0 && !basic_cells.contains(&(i, j)) {
                    basic_cells.push((i, j));
                }
            }
        }
    }
}
