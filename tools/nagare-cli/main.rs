use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use nagare::prelude::*;
use serde::Deserialize;
use std::fs;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

// --- JSON Deserialization Structs (Input Format Specific) ---

/// Input of the `parallel` command.
#[derive(Deserialize)]
struct BranchInput {
    #[serde(alias = "fanOut")]
    fan_out: Vec<BranchRecord>,
    #[serde(default)]
    merge: Vec<BranchRecord>,
}

/// CLI-specific mirror of `PathMatching` for clap to parse.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum MatchingCli {
    Literal,
    Segmented,
}

/// Reference validation and branch analysis for workflow editor flows
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to an engine config JSON file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate every reference in a flow
    Validate {
        /// Path to the flow JSON file
        flow_path: String,
    },
    /// Render the text parameters of a node as editor markup
    Render {
        flow_path: String,
        node_id: String,
        /// Render without checking references
        #[arg(long)]
        no_validate: bool,
    },
    /// List the variables a node may reference
    Variables { flow_path: String, node_id: String },
    /// List fan-out nodes that may run concurrently
    Parallel {
        /// Path to a JSON file with `fan_out` and `merge` record lists
        branches_path: String,
        /// Overrides the configured path matching
        #[arg(short, long, value_enum)]
        matching: Option<MatchingCli>,
    },
    /// Propose a display name no node in the flow uses
    Name { flow_path: String, proposed: String },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e))),
        None => EngineConfig::default(),
    };

    let start = Instant::now();
    let code = match cli.command {
        Command::Validate { flow_path } => run_validate(&flow_path),
        Command::Render {
            flow_path,
            node_id,
            no_validate,
        } => run_render(&config, &flow_path, &node_id, !no_validate),
        Command::Variables { flow_path, node_id } => run_variables(&flow_path, &node_id),
        Command::Parallel {
            branches_path,
            matching,
        } => run_parallel(config, &branches_path, matching),
        Command::Name {
            flow_path,
            proposed,
        } => {
            let flow = load_flow(&flow_path);
            println!("{}", flow.unique_node_name(&proposed));
            0
        }
    };
    info!(elapsed = ?start.elapsed(), "done");
    std::process::exit(code);
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_validate(flow_path: &str) -> i32 {
    let flow = load_flow(flow_path);
    let report = FlowValidator::new(&flow).validate();

    println!(
        "Checked {} references across {} nodes",
        report.checked,
        flow.nodes.len()
    );
    if report.is_clean() {
        println!("  -> All references resolve");
        return 0;
    }
    for issue in &report.issues {
        println!(
            "  -> [{}.{}] {{{{#{}#}}}}: {}",
            issue.node_id, issue.param_key, issue.token, issue.error
        );
    }
    1
}

fn run_render(config: &EngineConfig, flow_path: &str, node_id: &str, validate: bool) -> i32 {
    let flow = load_flow(flow_path);
    let node = flow
        .node(node_id)
        .unwrap_or_else(|| exit_with_error(&format!("Node '{}' not found in flow", node_id)));
    let codec = config.codec(&flow);

    let mut broken = 0;
    for param in node.params() {
        let Some(text) = param.value.as_str() else {
            continue;
        };
        let decoded = codec.decode(text, node, validate);
        println!("{}: {}", param.key, decoded.text);
        if let Some(error) = &decoded.error {
            println!("  -> {}", error);
        }
        broken += decoded.broken;
    }
    i32::from(broken > 0)
}

fn run_variables(flow_path: &str, node_id: &str) -> i32 {
    let flow = load_flow(flow_path);
    if flow.node(node_id).is_none() {
        exit_with_error(&format!("Node '{}' not found in flow", node_id));
    }
    for variable in VariableCatalog::available_to(&flow, node_id) {
        println!("{}\t{}", variable.token, variable.label);
    }
    0
}

fn run_parallel(mut config: EngineConfig, branches_path: &str, matching: Option<MatchingCli>) -> i32 {
    let json = fs::read_to_string(branches_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read branches file '{}': {}",
            branches_path, e
        ))
    });
    let input: BranchInput = serde_json::from_str(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse branches JSON: {}", e)));

    if let Some(matching) = matching {
        config.branch.matching = match matching {
            MatchingCli::Literal => PathMatching::Literal,
            MatchingCli::Segmented => PathMatching::Segmented,
        };
    }

    let classifier = config.classifier();
    for (a, b) in classifier.concurrent_pairs(&input.fan_out, &input.merge) {
        println!("{} ({}) || {} ({})", a.node_id, a.branch, b.node_id, b.branch);
    }
    println!(
        "Concurrent nodes: {}",
        classifier.classify(&input.fan_out, &input.merge).join(", ")
    );
    0
}

fn load_flow(path: &str) -> FlowDefinition {
    let json = fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read flow file '{}': {}", path, e)));
    FlowDefinition::from_json(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load flow: {}", e)))
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
