use super::evolution_engine::{ProgressCallback, RoundSummary, StopReason};
use log::info;

/// Reports progress through the `log` facade.
///
/// Verbosity 0 reports nothing, 1 one line per round, 2 also one line per generation.
pub struct LogProgressCallback {
    verbosity: u8,
}

impl LogProgressCallback {
    pub fn new(verbosity: u8) -> Self {
        Self { verbosity }
    }
}

impl ProgressCallback for LogProgressCallback {
    fn on_round_start(&mut self, round: usize) {
        if self.verbosity >= 2 {
            info!("Round {} starting...", round + 1);
        }
    }

    fn on_generation_complete(
        &mut self,
        round: usize,
        generation: usize,
        best_fitness: f64,
        mean_fitness: f64,
    ) {
        if self.verbosity >= 2 {
            info!(
                "Round {} generation {}: best R² {:.6}, mean {:.4}",
                round + 1,
                generation,
                best_fitness,
                mean_fitness
            );
        }
    }

    fn on_round_complete(&mut self, summary: &RoundSummary) {
        if self.verbosity >= 1 {
            let reason = match summary.stop_reason {
                StopReason::GoalReached => "goal reached",
                StopReason::MaxIterations => "iteration limit",
            };
            info!(
                "Round {} complete after {} generations: best R² {:.6} ({})",
                summary.round + 1,
                summary.generations,
                summary.best_fitness,
                reason
            );
        }
    }
}

/// Discards every event.
pub struct SilentProgressCallback;

impl ProgressCallback for SilentProgressCallback {
    fn on_round_start(&mut self, _round: usize) {}

    fn on_generation_complete(&mut self, _: usize, _: usize, _: f64, _: f64) {}

    fn on_round_complete(&mut self, _summary: &RoundSummary) {}
}
