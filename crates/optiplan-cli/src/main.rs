use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use optiplan_solver::{
    AllocationEvent, Certificate, CertificateStatus, DualSimplex, LpTask, NorthwestCorner,
    ObjectiveKind, PivotEvent, PrimalSimplex, Relation, SolutionResult, SolveStatus,
    TransportationInstance, Verifier, dual_of, solve_primal_dual,
};

#[derive(Parser)]
#[command(name = "optiplan")]
#[command(about = "Solve and certify small LP and transportation tasks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a task with the primal simplex method
    Solve {
        /// JSON file describing the task
        file: PathBuf,
        /// Print the pivot-by-pivot transcript
        #[arg(short, long)]
        trace: bool,
    },
    /// Solve a task with the dual simplex method
    Dual {
        /// JSON file describing the task
        file: PathBuf,
        /// Print the pivot-by-pivot transcript
        #[arg(short, long)]
        trace: bool,
    },
    /// Solve a task and its algebraic dual side by side
    PrimalDual {
        /// JSON file describing the task
        file: PathBuf,
    },
    /// Check a candidate plan for optimality
    Verify {
        /// JSON file describing the task
        file: PathBuf,
        /// Candidate plan, comma separated (e.g. --plan 2,6)
        #[arg(long, value_delimiter = ',', required = true)]
        plan: Vec<f64>,
    },
    /// Build a northwest-corner transportation plan
    Transport {
        /// JSON file describing the instance
        file: PathBuf,
        /// Print the allocation steps
        #[arg(short, long)]
        trace: bool,
    },
    /// Validate and pretty-print a task file
    Check {
        /// JSON file describing the task
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve { file, trace } => {
            let task = load_task(&file);
            let solver = PrimalSimplex::new();
            let result = if trace {
                let (result, events) = solver.solve_traced(&task);
                print_pivot_trace(&events, &task);
                result
            } else {
                solver.solve(&task)
            };
            print_result(&task, &result, "x");
            exit_for(result.status)
        }
        Commands::Dual { file, trace } => {
            let task = load_task(&file);
            let solver = DualSimplex::new();
            let result = if trace {
                let (result, events) = solver.solve_traced(&task);
                print_pivot_trace(&events, &task);
                result
            } else {
                solver.solve(&task)
            };
            print_result(&task, &result, "x");
            exit_for(result.status)
        }
        Commands::PrimalDual { file } => {
            let task = load_task(&file);
            let (primal, dual) = solve_primal_dual(&task);

            println!("Primal task:");
            print_result(&task, &primal, "x");
            println!();
            println!("Dual task:");
            print_result(&dual_of(&task), &dual, "y");
            println!();

            if primal.is_optimal() && dual.is_optimal() {
                let gap = (primal.objective_value - dual.objective_value).abs();
                println!("F(x) = {:.4}", primal.objective_value);
                println!("G(y) = {:.4}", dual.objective_value);
                if gap < 1e-3 {
                    println!("Strong duality holds: F(x) = G(y)");
                } else {
                    println!("Warning: objective values differ by {gap:.4}");
                }
                ExitCode::SUCCESS
            } else {
                println!("No optimal pair found.");
                ExitCode::FAILURE
            }
        }
        Commands::Verify { file, plan } => {
            let task = load_task(&file);
            if let Err(e) = task.validate_plan(&plan) {
                eprintln!("Invalid plan: {e}");
                return ExitCode::FAILURE;
            }
            let certificate = Verifier::new().certify(&task, &plan);
            print_certificate(&task, &plan, &certificate);
            if certificate.is_optimal() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Commands::Transport { file, trace } => {
            let instance = load_instance(&file);
            let solver = NorthwestCorner::new();
            let result = if trace {
                let (result, events) = solver.solve_traced(&instance);
                print_allocation_trace(&events);
                result
            } else {
                solver.solve(&instance)
            };
            match result {
                Ok(plan) => {
                    println!(
                        "Balanced instance: supply = demand = {}",
                        instance.total_supply()
                    );
                    println!();
                    print_allocation(&plan.allocation, &instance);
                    println!();
                    println!(
                        "Basis cells: {} (need {})",
                        plan.basic_cells.len(),
                        instance.num_suppliers() + instance.num_consumers() - 1
                    );
                    println!("Total cost: {:.2}", plan.total_cost);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Check { file } => {
            let task = load_task(&file);
            println!("{} is valid", file.display());
            println!("  {} variables", task.num_variables());
            println!("  {} constraints", task.num_constraints());
            println!();
            print_task(&task);
            ExitCode::SUCCESS
        }
    }
}

fn load_task(path: &PathBuf) -> LpTask {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {e}");
            std::process::exit(1);
        }
    };
    let task: LpTask = match serde_json::from_str(&source) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error parsing task: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = task.validate() {
        eprintln!("Invalid task: {e}");
        std::process::exit(1);
    }
    task
}

fn load_instance(path: &PathBuf) -> TransportationInstance {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {e}");
            std::process::exit(1);
        }
    };
    let instance: TransportationInstance = match serde_json::from_str(&source) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error parsing instance: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = instance.validate() {
        eprintln!("Invalid instance: {e}");
        std::process::exit(1);
    }
    instance
}

fn exit_for(status: SolveStatus) -> ExitCode {
    if status == SolveStatus::Optimal {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// `x1..xn` for structural variables, `s1..sm` for slacks.
fn variable_name(index: usize, n: usize) -> String {
    if index < n {
        format!("x{}", index + 1)
    } else {
        format!("s{}", index - n + 1)
    }
}

fn print_task(task: &LpTask) {
    let terms: Vec<String> = task
        .c
        .iter()
        .enumerate()
        .map(|(j, c)| format!("{}*x{}", c, j + 1))
        .collect();
    let direction = match task.objective {
        ObjectiveKind::Maximize => "max",
        ObjectiveKind::Minimize => "min",
    };
    println!("F(x) = {} -> {}", terms.join(" + "), direction);

    println!("subject to:");
    for i in 0..task.num_constraints() {
        let terms: Vec<String> = task.a[i]
            .iter()
            .enumerate()
            .map(|(j, a)| format!("{}*x{}", a, j + 1))
            .collect();
        println!(
            "  {} {} {}",
            terms.join(" + "),
            task.relations[i].symbol(),
            task.b[i]
        );
    }
}

fn print_result(task: &LpTask, result: &SolutionResult, var: &str) {
    let status = match result.status {
        SolveStatus::Optimal => "OPTIMAL",
        SolveStatus::Infeasible => "INFEASIBLE",
        SolveStatus::Unbounded => "UNBOUNDED",
        SolveStatus::IterationLimit => "INCONCLUSIVE",
    };
    println!("Status: {status}");
    println!("  {}", result.message);

    if !result.is_optimal() {
        return;
    }

    println!("Objective: {:.4}", result.objective_value);
    for (j, value) in result.values.iter().enumerate() {
        println!("  {var}{} = {:.4}", j + 1, value);
    }

    println!("Constraint check:");
    for i in 0..task.num_constraints() {
        let lhs = task.constraint_lhs(i, &result.values);
        let ok = match task.relations[i] {
            Relation::Le => lhs <= task.b[i] + 1e-3,
            Relation::Ge => lhs >= task.b[i] - 1e-3,
            Relation::Eq => (lhs - task.b[i]).abs() <= 1e-3,
        };
        println!(
            "  {}. {:.4} {} {:.4} {}",
            i + 1,
            lhs,
            task.relations[i].symbol(),
            task.b[i],
            if ok { "ok" } else { "VIOLATED" }
        );
    }
}

fn print_pivot_trace(events: &[PivotEvent], task: &LpTask) {
    let n = task.num_variables();
    for event in events {
        println!("Step {}:", event.step);
        println!(
            "  {} enters, {} leaves (pivot row {}, column {})",
            variable_name(event.pivot_col, n),
            variable_name(event.leaving, n),
            event.pivot_row + 1,
            event.pivot_col + 1,
        );
        if !event.ratios.is_empty() {
            let ratios: Vec<String> = event
                .ratios
                .iter()
                .map(|(index, ratio)| format!("{}: {:.2}", index + 1, ratio))
                .collect();
            println!("  ratios: {}", ratios.join(", "));
        }
        println!("  tableau:");
        for (i, row) in event.tableau.iter().enumerate() {
            let label = if i < event.basis.len() {
                variable_name(event.basis[i], n)
            } else {
                "z".to_string()
            };
            let cells: Vec<String> = row.iter().map(|v| format!("{v:8.2}")).collect();
            println!("    {label:<4}{}", cells.join(" "));
        }
    }
    println!();
}

fn print_certificate(task: &LpTask, plan: &[f64], certificate: &Certificate) {
    println!("Feasibility:");
    for i in 0..task.num_constraints() {
        let lhs = task.constraint_lhs(i, plan);
        let mark = if certificate.violated.contains(&i) {
            "VIOLATED"
        } else if certificate.active[i] {
            "binding"
        } else {
            "ok"
        };
        println!(
            "  {}. {:.4} {} {:.4} {}",
            i + 1,
            lhs,
            task.relations[i].symbol(),
            task.b[i],
            mark
        );
    }
    println!();

    match certificate.status {
        CertificateStatus::Infeasible => {
            println!("Plan is infeasible: {}", certificate.message);
        }
        CertificateStatus::NotOptimal => {
            println!("Plan is feasible but not optimal: {}", certificate.message);
            if let Some(f) = certificate.objective_value {
                println!("F(x) = {f:.4}");
            }
        }
        CertificateStatus::Optimal => {
            if let Some(y) = &certificate.dual_values {
                let rendered: Vec<String> = y.iter().map(|v| format!("{v:.4}")).collect();
                println!("Recovered dual plan: y = ({})", rendered.join("; "));
            }
            println!("Plan is optimal.");
            println!("F(x) = {:.4}", certificate.objective_value.unwrap_or(f64::NAN));
            println!("G(y) = {:.4}", certificate.dual_objective.unwrap_or(f64::NAN));
        }
    }
}

fn print_allocation_trace(events: &[AllocationEvent]) {
    for event in events {
        println!(
            "Step {}: cell ({}, {}) <- {}",
            event.step,
            event.row + 1,
            event.col + 1,
            event.amount
        );
        let supply: Vec<String> = event.remaining_supply.iter().map(|v| v.to_string()).collect();
        let demand: Vec<String> = event.remaining_demand.iter().map(|v| v.to_string()).collect();
        println!("  remaining supply: [{}]", supply.join(", "));
        println!("  remaining demand: [{}]", demand.join(", "));
    }
    println!();
}

fn print_allocation(allocation: &[Vec<f64>], instance: &TransportationInstance) {
    let header: Vec<String> = (1..=instance.num_consumers())
        .map(|j| format!("{:>8}", format!("D{j}")))
        .collect();
    println!("      {}   supply", header.join(" "));
    for (i, row) in allocation.iter().enumerate() {
        let cells: Vec<String> = row
            .iter()
            .map(|&a| {
                if a > 0.0 {
                    format!("{a:8.1}")
                } else {
                    format!("{:>8}", "-")
                }
            })
            .collect();
        println!("  S{}  {}   {:.1}", i + 1, cells.join(" "), instance.supply[i]);
    }
    let demands: Vec<String> = instance
        .demand
        .iter()
        .map(|d| format!("{d:8.1}"))
        .collect();
    println!("      {}", demands.join(" "));
}
