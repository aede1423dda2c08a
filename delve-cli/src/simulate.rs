//! Seeded batch runs driven by autoplay policies.
use crate::policy::{AutoPlayer, PlayPolicy, RunTally};
use anyhow::{Context, Result};
use delve_game::numbers::usize_to_f64;
use delve_game::{RunConfig, RunController, RunOutcome, SeededDice, derive_stream_seed, new_run};
use serde::Serialize;

/// Seed for run `index` of a batch, derived from the batch seed.
#[must_use]
pub fn run_seed(base: u64, index: u32) -> u64 {
    let bytes = derive_stream_seed(base, &index.to_le_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(head)
}

/// One finished automated run.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub policy: PlayPolicy,
    pub seed: u64,
    pub run_seed: u64,
    pub outcome: RunOutcome,
    pub floor: u32,
    pub average_level: f64,
    pub draws: u64,
    pub tally: RunTally,
}

/// Aggregate for one policy across every seed and run.
#[derive(Debug, Clone, Serialize)]
pub struct PolicySummary {
    pub policy: PlayPolicy,
    pub runs: usize,
    pub victories: usize,
    pub defeats: usize,
    pub win_rate: f64,
    pub average_level: f64,
    pub average_floor: f64,
    pub escapes: u32,
}

/// Play a single run to the end.
///
/// # Errors
///
/// Fails only if the autoplay front end stops answering, which it never does.
pub fn simulate_run(cfg: &RunConfig, policy: PlayPolicy, seed: u64, index: u32) -> Result<RunRecord> {
    let run_seed = run_seed(seed, index);
    let mut player = AutoPlayer::new(policy, run_seed);
    let mut dice = SeededDice::from_user_seed(run_seed);
    let state = new_run(cfg, &mut player).context("autoplay party creation")?;
    let mut controller = RunController::new(state, cfg.clone());
    let outcome = controller
        .run_to_end(&mut player, &mut dice)
        .context("autoplay run")?;
    let state = controller.state();
    let levels: u32 = state.party.iter().map(|c| c.level).sum();
    log::debug!("{policy} seed {seed} run {index}: {outcome:?} on floor {}", state.floor);
    Ok(RunRecord {
        policy,
        seed,
        run_seed,
        outcome,
        floor: state.floor,
        average_level: f64::from(levels) / usize_to_f64(state.party.len().max(1)),
        draws: dice.draws(),
        tally: player.tally(),
    })
}

/// Every policy × seed × run combination, in that nesting order.
///
/// # Errors
///
/// Propagates the first failed run.
pub fn simulate_batch(
    cfg: &RunConfig,
    policies: &[PlayPolicy],
    seeds: &[u64],
    runs: u32,
) -> Result<Vec<RunRecord>> {
    let mut records = Vec::new();
    for &policy in policies {
        for &seed in seeds {
            for index in 0..runs {
                records.push(simulate_run(cfg, policy, seed, index)?);
            }
        }
    }
    Ok(records)
}

#[must_use]
pub fn summarize(records: &[RunRecord]) -> Vec<PolicySummary> {
    PlayPolicy::ALL
        .iter()
        .filter_map(|&policy| {
            let runs: Vec<&RunRecord> = records.iter().filter(|r| r.policy == policy).collect();
            if runs.is_empty() {
                return None;
            }
            let count = usize_to_f64(runs.len());
            let victories = runs
                .iter()
                .filter(|r| r.outcome == RunOutcome::Victory)
                .count();
            Some(PolicySummary {
                policy,
                runs: runs.len(),
                victories,
                defeats: runs.len() - victories,
                win_rate: usize_to_f64(victories) / count,
                average_level: runs.iter().map(|r| r.average_level).sum::<f64>() / count,
                average_floor: runs.iter().map(|r| f64::from(r.floor)).sum::<f64>() / count,
                escapes: runs.iter().map(|r| r.tally.escapes).sum(),
            })
        })
        .collect()
}
