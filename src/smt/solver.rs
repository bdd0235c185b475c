//! Solving engine adapter
//!
//! Thin wrapper over the Z3 solver: accumulate assertions, run the one
//! blocking satisfiability check, and report the outcome. Unknown is a
//! terminal outcome here, never retried.

use crate::config::SolverConfig;
use z3::ast::Bool;
use z3::{Context, Model, Params, SatResult, Solver};

/// Write-only constraint sink plus the single check entry point
pub struct SmtSolver<'ctx> {
    solver: Solver<'ctx>,
    assertion_count: usize,
}

/// Result of the satisfiability check
pub enum SolveOutcome<'ctx> {
    /// A model exists; every unknown can be looked up in it (possibly
    /// reporting absence)
    Satisfiable(Model<'ctx>),
    /// Definitive negative result, not an error
    Unsatisfiable,
    /// The engine could not decide; terminal
    Unknown,
}

impl<'ctx> SmtSolver<'ctx> {
    /// Create a solver; a non-zero configured timeout bounds the single
    /// check call
    pub fn new(ctx: &'ctx Context, config: &SolverConfig) -> Self {
        let solver = Solver::new(ctx);

        if config.timeout_seconds > 0 {
            let millis = config.timeout_seconds.saturating_mul(1000);
            let mut params = Params::new(ctx);
            params.set_u32("timeout", millis.min(u32::MAX as u64) as u32);
            solver.set_params(&params);
        }

        Self {
            solver,
            assertion_count: 0,
        }
    }

    /// Add one assertion to the accumulating constraint system
    pub fn assert(&mut self, constraint: &Bool<'ctx>) {
        self.solver.assert(constraint);
        self.assertion_count += 1;
    }

    /// Run the blocking satisfiability check
    pub fn check(&self) -> SolveOutcome<'ctx> {
        match self.solver.check() {
            SatResult::Sat => match self.solver.get_model() {
                Some(model) => SolveOutcome::Satisfiable(model),
                // sat without a retrievable model is indistinguishable
                // from an undecided engine for our callers
                None => SolveOutcome::Unknown,
            },
            SatResult::Unsat => SolveOutcome::Unsatisfiable,
            SatResult::Unknown => SolveOutcome::Unknown,
        }
    }

    /// Number of assertions added so far
    pub fn assertion_count(&self) -> usize {
        self.assertion_count
    }
}

impl SolveOutcome<'_> {
    /// The engine's verdict as the conventional lowercase word
    pub fn verdict(&self) -> &'static str {
        match self {
            SolveOutcome::Satisfiable(_) => "sat",
            SolveOutcome::Unsatisfiable => "unsat",
            SolveOutcome::Unknown => "unknown",
        }
    }
}
