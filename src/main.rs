use clap::Parser;
use log::info;

use cliffsynth::{synthesize_from, SynthesisConfig, Tableau, TargetMetric};

/// Exact Clifford circuit synthesis via SAT/MaxSAT.
#[derive(Parser)]
#[command(name = "cliffsynth")]
struct Cli {
    /// Target stabilizer generators, one per qubit (e.g. -t XX -t ZZ).
    #[arg(short = 't', long = "target", required = true)]
    target: Vec<String>,

    /// Initial stabilizer generators; defaults to the identity tableau.
    #[arg(short = 'i', long = "initial")]
    initial: Vec<String>,

    /// Metric to minimize: gates, depth or two_qubit_gates.
    #[arg(short = 'm', long, default_value = "gates")]
    metric: String,

    /// Solve one optimizing instance instead of running bound search.
    #[arg(long)]
    maxsat: bool,

    /// Minimize the gate count after finding the minimal depth.
    #[arg(long)]
    minimize_gates_after_depth: bool,

    /// Allow more total gates while minimizing two-qubit gates.
    #[arg(long)]
    try_higher_gate_limit: bool,

    /// Minimize the gate count after finding the minimal two-qubit count.
    #[arg(long)]
    minimize_gates_after_two_qubit: bool,

    /// Coupling edge `a:b`; repeat for each edge. Omit for all-to-all.
    #[arg(long = "couple", value_parser = parse_edge)]
    coupling: Vec<(usize, usize)>,

    /// Starting timestep limit for the feasibility probes.
    #[arg(long)]
    initial_timestep_limit: Option<usize>,

    /// Wall-clock budget in milliseconds.
    #[arg(long)]
    time_limit_ms: Option<u64>,
}

fn parse_edge(s: &str) -> Result<(usize, usize), String> {
    let (a, b) = s
        .split_once(':')
        .ok_or_else(|| format!("expected a:b, got {s:?}"))?;
    let a = a.parse().map_err(|_| format!("bad qubit index {a:?}"))?;
    let b = b.parse().map_err(|_| format!("bad qubit index {b:?}"))?;
    Ok((a, b))
}

fn main() {
    colog::init();

    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> cliffsynth::Result<()> {
    let config = SynthesisConfig {
        target_metric: TargetMetric::parse(&cli.metric)?,
        use_maxsat: cli.maxsat,
        minimize_gates_after_depth_optimization: cli.minimize_gates_after_depth,
        try_higher_gate_limit_for_two_qubit_gate_optimization: cli.try_higher_gate_limit,
        minimize_gates_after_two_qubit_gate_optimization: cli.minimize_gates_after_two_qubit,
        coupling: (!cli.coupling.is_empty()).then(|| cli.coupling.clone()),
        initial_timestep_limit: cli.initial_timestep_limit,
        time_limit: cli.time_limit_ms.map(std::time::Duration::from_millis),
    };

    let targets: Vec<&str> = cli.target.iter().map(String::as_str).collect();
    let target = Tableau::from_generators(&targets)?;

    let result = if cli.initial.is_empty() {
        cliffsynth::synthesize(&target, &config)?
    } else {
        let initials: Vec<&str> = cli.initial.iter().map(String::as_str).collect();
        let initial = Tableau::from_generators(&initials)?;
        synthesize_from(&initial, &target, &config)?
    };

    info!(
        "gates: {}, depth: {}, two-qubit gates: {}, timeout: {}, runtime: {:?}",
        result.gates, result.depth, result.two_qubit_gates, result.timeout, result.runtime
    );
    match result.circuit {
        Some(circuit) => print!("{circuit}"),
        None => info!("no circuit found within the time budget"),
    }

    Ok(())
}
