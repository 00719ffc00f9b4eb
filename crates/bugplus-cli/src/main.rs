use anyhow::{bail, Context, Result};
use bugplus::stdlib::arithmetic_library;
use bugplus::trace::TraceKind;
use bugplus::translate::{run_adder_matrix, run_bit_positions};
use bugplus::{EngineConfig, InstantiateOptions, Library};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bugplus")]
#[command(about = "Build and run Bug+ programs")]
struct Cli {
    /// Engine config file (default: nearest Bugplus.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the programs of the arithmetic library
    List,
    /// Run a library program
    Run {
        /// Specification identifier, e.g. `++` or `max`
        spec: String,
        /// Root input values, in order
        #[arg(short, long = "input", allow_negative_numbers = true)]
        inputs: Vec<i64>,
        /// Number of consecutive runs
        #[arg(long, default_value_t = 1)]
        steps: usize,
        /// Trace every primitive and print the ledger
        #[arg(long)]
        debug: bool,
    },
    /// Run a bit matrix once from the given positions
    Bits {
        /// Rows separated by `;`, cells by `,`
        #[arg(long)]
        matrix: String,
        /// Initial bit values, comma separated
        #[arg(long, default_value = "")]
        positions: String,
    },
    /// Evaluate an adder network built from a control and a data matrix
    Adder {
        /// Number of adders
        #[arg(long)]
        bugs: usize,
        #[arg(long)]
        control: String,
        #[arg(long)]
        data: String,
        /// Input pair, comma separated; repeat for more cases
        #[arg(long = "case", allow_hyphen_values = true)]
        cases: Vec<String>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env().init();

    let cli = Cli::parse();
    let config = load_config(cli.config)?;

    let output = match cli.command {
        Commands::List => list(&arithmetic_library()),
        Commands::Run {
            spec,
            inputs,
            steps,
            debug,
        } => run(&arithmetic_library(), &spec, &inputs, steps, debug, config)?,
        Commands::Bits { matrix, positions } => {
            let matrix = parse_matrix(&matrix)?;
            let positions = parse_values(&positions)?;
            let run = run_bit_positions(&matrix, &positions, &config)?;
            serde_json::to_value(run)?
        }
        Commands::Adder {
            bugs,
            control,
            data,
            cases,
        } => {
            let control = parse_matrix(&control)?;
            let data = parse_matrix(&data)?;
            let cases = cases
                .iter()
                .map(|case| parse_values(case))
                .collect::<Result<Vec<_>>>()?;
            let reports = run_adder_matrix(bugs, &control, &data, &cases, &config)?;
            serde_json::to_value(reports)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<EngineConfig> {
    if let Some(path) = path {
        return EngineConfig::from_file(&path)
            .with_context(|| format!("Failed to load {}", path.display()));
    }
    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    let (config, found) = EngineConfig::discover(&cwd)?;
    if let Some(found) = found {
        log::info!("using {}", found.display());
    }
    Ok(config)
}

fn list(library: &Library) -> Value {
    let entries: Vec<Value> = library
        .identifiers()
        .into_iter()
        .filter_map(|id| library.select_specification(id).ok())
        .map(|spec| {
            json!({
                "id": spec.identifier(),
                "inputs": spec.num_data_in(),
                "outputs": spec.num_control_out(),
                "primitive": spec.is_primitive(),
            })
        })
        .collect();
    Value::Array(entries)
}

fn run(
    library: &Library,
    spec: &str,
    inputs: &[i64],
    steps: usize,
    debug: bool,
    config: EngineConfig,
) -> Result<Value> {
    let options = InstantiateOptions {
        config,
        trace: debug,
        ..Default::default()
    };
    let mut program = library.instantiate_with(spec, &options)?;
    for issue in program.issues() {
        eprintln!("warning: {issue}");
    }
    for (index, value) in inputs.iter().enumerate() {
        program.set_input_value(index, *value)?;
    }

    let mut runs = Vec::with_capacity(steps);
    for _ in 0..steps {
        let report = match program.step() {
            Ok(step) => json!({
                "output": step.output,
                "exit": step.exit.exit_index,
                "steps": step.exit.steps,
            }),
            Err(err) => json!({ "error": err.to_string(), "diverged": err.is_divergence() }),
        };
        let failed = report.get("error").is_some();
        runs.push(report);
        if failed {
            break;
        }
    }

    let mut result = json!({ "spec": spec, "runs": runs });
    if debug {
        let trace: Vec<Value> = program
            .trace()
            .entries()
            .iter()
            .map(|entry| match &entry.kind {
                TraceKind::Request {
                    specification,
                    inputs,
                } => json!({
                    "run": entry.run,
                    "node": entry.node.to_string(),
                    "request": specification.as_ref(),
                    "inputs": inputs.as_slice(),
                }),
                TraceKind::Emit {
                    output,
                    control_out,
                } => json!({
                    "run": entry.run,
                    "node": entry.node.to_string(),
                    "output": output,
                    "control_out": control_out,
                }),
            })
            .collect();
        result["trace"] = Value::Array(trace);
    }
    Ok(result)
}

fn parse_values(text: &str) -> Result<Vec<i64>> {
    text.split(',')
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(|cell| {
            cell.parse::<i64>()
                .with_context(|| format!("Invalid value '{cell}'"))
        })
        .collect()
}

fn parse_matrix(text: &str) -> Result<Vec<Vec<u8>>> {
    let rows: Vec<Vec<u8>> = text
        .split(';')
        .map(str::trim)
        .filter(|row| !row.is_empty())
        .map(|row| {
            row.split(',')
                .map(str::trim)
                .map(|cell| match cell {
                    "0" => Ok(0),
                    "1" => Ok(1),
                    other => bail!("Matrix cells must be 0 or 1, got '{other}'"),
                })
                .collect::<Result<Vec<u8>>>()
        })
        .collect::<Result<_>>()?;

    if let Some(width) = rows.first().map(Vec::len) {
        if rows.iter().any(|row| row.len() != width) {
            bail!("Matrix rows have different lengths");
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_matrices() {
        assert_eq!(parse_matrix("0,1; 1,0").unwrap(), vec![vec![0, 1], vec![1, 0]]);
        assert!(parse_matrix("0,2").is_err());
        assert!(parse_matrix("0,1;1").is_err());
    }

    #[test]
    fn parses_values() {
        assert_eq!(parse_values("1, -2,3").unwrap(), vec![1, -2, 3]);
        assert_eq!(parse_values("").unwrap(), Vec::<i64>::new());
        assert!(parse_values("x").is_err());
    }

    #[test]
    fn run_reports_each_step() {
        let result = run(&arithmetic_library(), "+++", &[1], 3, false, EngineConfig::default())
            .unwrap();
        let outputs: Vec<_> = result["runs"]
            .as_array()
            .unwrap()
            .iter()
            .map(|run| run["output"].as_i64())
            .collect();
        assert_eq!(outputs, vec![Some(2), Some(3), Some(4)]);
    }
}
