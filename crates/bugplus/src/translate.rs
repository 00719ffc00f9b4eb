//! Programs generated from 0/1 adjacency matrices.
//!
//! Two encodings are supported:
//!
//! * a **bit matrix** of `n` rows and `2n` columns over `n` bit nodes. Cell
//!   `[i][j] == 1` wires control output `j % 2` of node `j / 2` to node `i`.
//!   Every bit node feeds its own input, so firing it toggles it.
//! * an **adder matrix pair** over `n` adders. The control matrix has
//!   `n + 2` rows and `2n + 1` columns, the data matrix `2n + 1` rows and
//!   `n + 2` columns; the trailing rows and columns address the program's
//!   own interface (two data inputs, one data output, one control input, two
//!   control outputs).

use crate::config::EngineConfig;
use crate::driver::{CaseReport, Driver};
use crate::error::{Error, InstantiateError};
use crate::library::{InstantiateOptions, Library};
use crate::primitive::{ADDER_ID, BIT_ID};
use crate::program::Program;
use crate::specification::{ProgramImplementation, Specification};
use serde::Serialize;

pub const BIT_PROGRAM_ID: &str = "CF_Translate";
pub const ADDER_PROGRAM_ID: &str = "bug_program";

pub type Matrix = [Vec<u8>];

pub fn bit_role(index: usize) -> String {
    format!("{BIT_ID}_{index}")
}

pub fn adder_role(index: usize) -> String {
    format!("{ADDER_ID}_{index}")
}

fn cell(matrix: &Matrix, row: usize, col: usize) -> bool {
    matrix.get(row).and_then(|r| r.get(col)) == Some(&1)
}

fn cols(matrix: &Matrix) -> usize {
    matrix.first().map_or(0, Vec::len)
}

fn instantiate(spec: Specification, config: &EngineConfig) -> Result<Program, InstantiateError> {
    let identifier = spec.identifier().to_string();
    let mut library = Library::with_primitives();
    library.add_specification(spec)?;
    library.instantiate_with(
        &identifier,
        &InstantiateOptions {
            config: config.clone(),
            ..Default::default()
        },
    )
}

// --------------------------------------------------------------------------
// Bit matrices
// --------------------------------------------------------------------------

pub fn bit_matrix_specification(matrix: &Matrix) -> Specification {
    let bits = matrix.len();
    let mut p = ProgramImplementation::new();
    for i in 0..bits {
        let role = bit_role(i);
        p.add_bug(BIT_ID, &role).add_data_flow(&role, &role, 0);
    }
    for i in 0..bits {
        for j in 0..cols(matrix) {
            if cell(matrix, i, j) {
                p.add_control_flow(&bit_role(j / 2), j % 2, &bit_role(i));
            }
        }
    }
    p.connect_control_in_interface(&bit_role(0));
    Specification::composite(BIT_PROGRAM_ID, 0, 2, p)
}

pub fn bit_matrix_program(matrix: &Matrix, config: &EngineConfig) -> Result<Program, InstantiateError> {
    instantiate(bit_matrix_specification(matrix), config)
}

/// Final state of a bit-matrix run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BitRun {
    pub registers: Vec<i64>,
    pub call_counters: Vec<u32>,
    pub steps: usize,
}

/// Seed every bit from `positions`, run once and read the bits back.
/// Missing positions leave their bit at 0.
pub fn run_bit_positions(
    matrix: &Matrix,
    positions: &[i64],
    config: &EngineConfig,
) -> Result<BitRun, Error> {
    let mut program = bit_matrix_program(matrix, config)?;
    let nodes: Vec<_> = (0..matrix.len())
        .filter_map(|i| program.bug(&bit_role(i)))
        .collect();

    for (node, position) in nodes.iter().zip(positions) {
        program.set_internal_state(*node, *position)?;
    }
    let exit = program.execute()?;

    let mut registers = Vec::with_capacity(nodes.len());
    let mut call_counters = Vec::with_capacity(nodes.len());
    for node in &nodes {
        registers.push(program.internal_state(*node)?);
        call_counters.push(program.call_counter(*node)?);
    }
    Ok(BitRun {
        registers,
        call_counters,
        steps: exit.steps,
    })
}

/// Whether bit `pos` is fully isolated: nothing it fires, nothing firing it.
pub fn is_zero_connection_valid(matrix: &Matrix, pos: usize) -> bool {
    let bits = matrix.len();
    let fires_nothing = (0..2 * bits).all(|j| !cell(matrix, pos, j));
    let never_fired =
        (0..bits).all(|i| !cell(matrix, i, 2 * pos) && !cell(matrix, i, 2 * pos + 1));
    fires_nothing && never_fired
}

/// Reward weights for [`bit_reward`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BitRewards {
    /// Bonus when every position matches
    pub win: f64,
    /// Whole reward of a run that hit a loop guard
    pub failure: f64,
    /// Added per matching position
    pub partial: f64,
}

impl Default for BitRewards {
    fn default() -> Self {
        Self {
            win: 1000.0,
            failure: -10.0,
            partial: 1.0,
        }
    }
}

/// Score one run of `matrix` from all-zero bits against `goal`.
///
/// Each goal position reads as follows: `-1` means the bit must have fired,
/// `0` means it must never have fired, and `k` means it must have fired and
/// ended holding `k - 1`. A goal longer than the matrix counts the extra
/// positions as mismatches. Divergent runs score `rewards.failure`; any other
/// error is returned.
pub fn bit_reward(
    goal: &[i64],
    matrix: &Matrix,
    rewards: &BitRewards,
    config: &EngineConfig,
) -> Result<f64, Error> {
    let run = match run_bit_positions(matrix, &[], config) {
        Ok(run) => run,
        Err(Error::Exec(err)) if err.is_divergence() => {
            log::debug!("bit matrix diverged: {err}");
            return Ok(rewards.failure);
        }
        Err(err) => return Err(err),
    };

    let mut reward = 0.0;
    let mut solved = true;
    for (i, want) in goal.iter().enumerate() {
        let (Some(state), Some(calls)) = (run.registers.get(i), run.call_counters.get(i)) else {
            solved = false;
            continue;
        };
        let matches = match *want {
            -1 => *calls > 0,
            0 => *calls == 0,
            k => *calls > 0 && k == state + 1,
        };
        if matches {
            reward += rewards.partial;
        } else {
            solved = false;
        }
    }
    if solved {
        reward += rewards.win;
    }
    Ok(reward)
}

// --------------------------------------------------------------------------
// Adder matrices
// --------------------------------------------------------------------------

pub fn adder_matrix_specification(num_bugs: usize, control: &Matrix, data: &Matrix) -> Specification {
    let mut p = ProgramImplementation::new();
    for i in 0..num_bugs {
        p.add_bug(ADDER_ID, &adder_role(i));
    }

    let rows = control.len();
    let columns = cols(control);
    let inner_rows = rows.saturating_sub(2);
    let inner_cols = columns.saturating_sub(1);
    for i in 0..rows {
        for j in 0..inner_cols {
            if !cell(control, i, j) {
                continue;
            }
            let source = adder_role(j / 2);
            if i < inner_rows {
                p.add_control_flow(&source, j % 2, &adder_role(i));
            } else {
                let external = usize::from(i != inner_rows);
                p.connect_control_out_interface(&source, j % 2, external);
            }
        }
    }
    // the last marked row wins once the log is replayed
    if let Some(entry) = columns.checked_sub(1) {
        for i in (0..inner_rows).filter(|i| cell(control, *i, entry)) {
            p.connect_control_in_interface(&adder_role(i));
        }
    }

    let drows = data.len();
    let dcols = cols(data);
    let inner_drows = drows.saturating_sub(1);
    let inner_dcols = dcols.saturating_sub(2);
    for i in 0..inner_drows {
        let target = adder_role(i / 2);
        for j in 0..dcols {
            if !cell(data, i, j) {
                continue;
            }
            if j < inner_dcols {
                p.add_data_flow(&adder_role(j), &target, i % 2);
            } else {
                let external = usize::from(j != inner_dcols);
                p.connect_data_in_interface(&target, i % 2, external);
            }
        }
    }
    if let Some(last) = drows.checked_sub(1) {
        for j in 0..inner_dcols {
            if cell(data, last, j) {
                p.connect_data_out_interface(&adder_role(j));
            }
        }
    }

    Specification::composite(ADDER_PROGRAM_ID, 2, 2, p)
}

pub fn adder_matrix_program(
    num_bugs: usize,
    control: &Matrix,
    data: &Matrix,
    config: &EngineConfig,
) -> Result<Program, InstantiateError> {
    instantiate(adder_matrix_specification(num_bugs, control, data), config)
}

/// Build the adder network and evaluate it on every case.
pub fn run_adder_matrix(
    num_bugs: usize,
    control: &Matrix,
    data: &Matrix,
    cases: &[Vec<i64>],
    config: &EngineConfig,
) -> Result<Vec<CaseReport>, InstantiateError> {
    let program = adder_matrix_program(num_bugs, control, data, config)?;
    Ok(Driver::new(program).run_cases(cases))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExecError;

    #[test]
    fn single_adder_network_sums_its_inputs() {
        let control = vec![vec![0, 0, 1], vec![1, 0, 0], vec![0, 1, 0]];
        let data = vec![vec![0, 1, 0], vec![0, 0, 1], vec![1, 0, 0]];
        let cases = vec![vec![1, 1], vec![2, 3], vec![4, 5]];

        let reports =
            run_adder_matrix(1, &control, &data, &cases, &EngineConfig::default()).unwrap();
        let outputs: Vec<_> = reports.iter().map(|r| r.output).collect();
        assert_eq!(outputs, vec![Some(2), Some(5), Some(9)]);
        assert!(reports.iter().all(|r| r.exit_index == Some(1)));
    }

    #[test]
    fn adder_network_replays_cleanly() {
        let control = vec![vec![0, 0, 1], vec![1, 0, 0], vec![0, 1, 0]];
        let data = vec![vec![0, 1, 0], vec![0, 0, 1], vec![1, 0, 0]];
        let program =
            adder_matrix_program(1, &control, &data, &EngineConfig::default()).unwrap();
        assert!(program.issues().is_empty(), "{:?}", program.issues());
        assert!(program.bug("+_0").is_some());
    }

    #[test]
    fn self_looping_bit_toggles_back() {
        // out 1 of bit 0 loops to bit 0; out 0 ends the run
        let matrix = vec![vec![0, 1]];
        let run = run_bit_positions(&matrix, &[0], &EngineConfig::default()).unwrap();
        assert_eq!(
            run,
            BitRun {
                registers: vec![0],
                call_counters: vec![2],
                steps: 2,
            }
        );
    }

    #[test]
    fn two_bits_hand_off() {
        // bit 0 out 1 -> bit 1, bit 1 ends either way
        let matrix = vec![vec![0, 0, 0, 0], vec![0, 1, 0, 0]];
        let run = run_bit_positions(&matrix, &[0, 1], &EngineConfig::default()).unwrap();
        assert_eq!(run.registers, vec![1, 0]);
        assert_eq!(run.call_counters, vec![1, 1]);
    }

    #[test]
    fn endless_bit_loop_hits_call_limit() {
        let matrix = vec![vec![1, 1]];
        let err = run_bit_positions(&matrix, &[0], &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Exec(ExecError::CallLimit { limit: 20, .. })));
    }

    // bit 0 hands off to bit 1, bit 2 stands alone
    fn chain_with_island() -> Vec<Vec<u8>> {
        vec![vec![0; 6], vec![0, 1, 0, 0, 0, 0], vec![0; 6]]
    }

    #[test]
    fn isolated_bit_is_zero_connection_valid() {
        let matrix = chain_with_island();
        assert!(!is_zero_connection_valid(&matrix, 0));
        assert!(!is_zero_connection_valid(&matrix, 1));
        assert!(is_zero_connection_valid(&matrix, 2));
    }

    #[test]
    fn bit_reward_scores_each_position() {
        let config = EngineConfig::default();
        let rewards = BitRewards::default();
        let matrix = chain_with_island();

        // end state [1, 1, 0] with bits 0 and 1 fired once
        assert_eq!(bit_reward(&[2, 2, 0], &matrix, &rewards, &config).unwrap(), 1003.0);
        assert_eq!(bit_reward(&[-1, -1, -1], &matrix, &rewards, &config).unwrap(), 2.0);
        assert_eq!(bit_reward(&[1, 2, 0], &matrix, &rewards, &config).unwrap(), 2.0);
        assert_eq!(bit_reward(&[2, 2, 0, 0], &matrix, &rewards, &config).unwrap(), 3.0);
    }

    #[test]
    fn divergent_matrix_gets_failure_reward() {
        let rewards = BitRewards::default();
        let reward = bit_reward(&[1], &[vec![1, 1]], &rewards, &EngineConfig::default()).unwrap();
        assert_eq!(reward, rewards.failure);
    }
}
