use std::{fs::File, io::BufWriter, path::PathBuf};

use anyhow::Context;
use log::info;
use structopt::StructOpt;

use ersa::{
    engine::RsaEngine,
    graph::{NumSlices, SliceIndex},
    instance::{Input, Instance, Load, ObjectiveMetric, PartitionPolicy, PreprocessingLevel},
    io::{
        DotWriter, read_demands_file, read_topology_file, write_variables_csv,
        write_variables_json,
    },
    log::build_logger_for_level,
};

/// Builds and prunes the layered demand graphs for one routing round and
/// exports the solver-facing variable table.
#[derive(StructOpt)]
struct Opts {
    /// Topology file ("p eon" format)
    #[structopt(short, long)]
    topology: PathBuf,

    /// Demand file ("p demands" format)
    #[structopt(short, long)]
    demands: PathBuf,

    #[structopt(long, default_value = "full")]
    preprocessing: PreprocessingLevel,

    #[structopt(long, default_value = "none")]
    partition_policy: PartitionPolicy,

    /// Load threshold separating the partition's low and high classes
    #[structopt(long, default_value = "0")]
    partition_load: Load,

    /// First slice of the partition's high region
    #[structopt(long, default_value = "0")]
    partition_slice: SliceIndex,

    #[structopt(long, default_value = "1")]
    objective: ObjectiveMetric,

    #[structopt(long, default_value = "0")]
    hop_penalty: f64,

    #[structopt(long)]
    blocking_allowed: bool,

    /// Demands routed in this round; defaults to the whole demand set
    #[structopt(long)]
    demands_at_once: Option<usize>,

    /// Cap on the number of slices considered per link
    #[structopt(long)]
    slice_limit: Option<NumSlices>,

    /// Variable table destination; stdout if omitted
    #[structopt(short, long)]
    output: Option<PathBuf>,

    /// Emit JSON lines instead of CSV
    #[structopt(long)]
    json: bool,

    /// Directory receiving one DOT file per pruned demand graph
    #[structopt(long)]
    dot_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    build_logger_for_level(log::LevelFilter::Info);
    let opts = Opts::from_args();

    let (nb_nodes, fibers) = read_topology_file(&opts.topology)
        .with_context(|| format!("reading topology {:?}", opts.topology))?;
    let demands = read_demands_file(&opts.demands)
        .with_context(|| format!("reading demands {:?}", opts.demands))?;

    let input = Input {
        demands_at_once: opts.demands_at_once.unwrap_or(demands.len()),
        partition_policy: opts.partition_policy,
        partition_load: opts.partition_load,
        partition_slice: opts.partition_slice,
        preprocessing: opts.preprocessing,
        hop_penalty: opts.hop_penalty,
        blocking_allowed: opts.blocking_allowed,
        objective: opts.objective,
        global_slice_limit: opts.slice_limit,
    };

    let instance = Instance::new(nb_nodes, fibers, demands, input);
    let engine = RsaEngine::new(&instance);

    info!(
        "{} variables over {} demand graphs ({} distinct loads, total load {})",
        engine.number_of_variables(),
        engine.number_of_demands(),
        engine.loads_to_be_routed().len(),
        engine.total_load_to_be_routed()
    );
    for (d, graph) in engine.graphs().iter().enumerate() {
        info!(
            "demand #{}: {} nodes, {} arcs",
            engine.demand(d).id,
            graph.number_of_nodes(),
            graph.number_of_arcs()
        );
    }

    if let Some(dir) = &opts.dot_dir {
        std::fs::create_dir_all(dir)?;
        for (d, graph) in engine.graphs().iter().enumerate() {
            let path = dir.join(format!("demand_{}.dot", engine.demand(d).id));
            graph.try_write_dot(BufWriter::new(File::create(path)?))?;
        }
    }

    if let Some(path) = &opts.output {
        let writer = BufWriter::new(File::create(path)?);
        if opts.json {
            write_variables_json(&engine, writer)?;
        } else {
            write_variables_csv(&engine, writer)?;
        }
    } else {
        let stdout = std::io::stdout();
        if opts.json {
            write_variables_json(&engine, stdout.lock())?;
        } else {
            write_variables_csv(&engine, stdout.lock())?;
        }
    }

    Ok(())
}
