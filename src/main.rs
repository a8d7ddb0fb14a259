use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use regex::Regex;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cib;
mod model;
mod observe;
mod query;
mod report;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "crm-status")]
#[command(about = "Pacemaker resource status from the CIB", long_about = None)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    /// Debug verbosity (0-3); RUST_LOG overrides it.
    #[arg(short, long, global = true, default_value_t = 0,
          value_parser = clap::value_parser!(u8).range(0..=3))]
    debug: u8,

    /// Monitor rc-code that means "running" (repeatable; default 0 and 8).
    #[arg(long = "running-rc", global = true)]
    running_rc: Vec<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Read the CIB from a file instead of querying Pacemaker.
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Program that prints the live CIB.
    #[arg(long, global = true, default_value = cib::loader::DEFAULT_QUERY_PROGRAM)]
    cibadmin: String,

    /// Argument passed to the query program (repeatable; default --query).
    #[arg(long = "query-arg", global = true, allow_hyphen_values = true)]
    query_args: Vec<String>,
}

impl SourceArgs {
    fn source(&self) -> cib::Source {
        if let Some(path) = &self.file {
            return cib::Source::File(path.clone());
        }
        let mut cmd = cib::QueryCommand {
            program: self.cibadmin.clone(),
            ..Default::default()
        };
        if !self.query_args.is_empty() {
            cmd.args = self.query_args.clone();
        }
        cib::Source::External(cmd)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Health-check one resource: exit 0 if started or promoted, 1 otherwise,
    /// 2 if the node or resource is unknown.
    Status {
        #[arg(short, long)]
        node: String,

        #[arg(short, long)]
        resource: String,

        /// Also list the resource agent and its operation history.
        #[arg(short, long)]
        verbose: bool,
    },
    /// Print decoded nodes, resources and operations as JSON.
    Dump {
        /// Only nodes whose id matches this regex.
        #[arg(short, long)]
        node: Option<String>,

        /// Only resources whose id matches this regex.
        #[arg(short, long)]
        resource: Option<String>,

        #[arg(long)]
        pretty: bool,
    },
    /// Print the OCF return code table.
    RcCodes,
}

fn init_logging(debug: u8) {
    let default = match debug {
        0 => "warn",
        1 => "warn,crm_status=debug",
        _ => "warn,crm_status=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_nodes(cli: &Cli) -> Result<model::NodeMap> {
    let source = cli.source.source();
    tracing::debug!(?source, "loading CIB");

    let doc = source
        .load(&cib::ProcessRunner)
        .context("could not get CIB")?;

    let observer: &dyn observe::Observer = if tracing::enabled!(tracing::Level::DEBUG) {
        &observe::TracingObserver
    } else {
        &observe::NullObserver
    };
    let mut ctx = cib::DecodeContext::new(observer);
    if !cli.running_rc.is_empty() {
        ctx = ctx.with_running_codes(model::RunningCodes::new(cli.running_rc.clone()));
    }

    let nodes = cib::decode(&doc, &ctx);
    tracing::debug!(nodes = nodes.len(), "decoded CIB");
    Ok(nodes)
}

fn print_history(res: &model::Resource) {
    println!("  agent: {}", res.agent());
    for op in &res.ops {
        let operation = match op.interval_ms() {
            Some(ms) if ms > 0 => format!("{} every {}ms", op.operation().unwrap_or("?"), ms),
            _ => op.operation().unwrap_or("?").to_string(),
        };
        let rc = op.rc_code().unwrap_or("?");
        println!(
            "  * [{}] {} rc={} ({})",
            op.call_id(),
            operation,
            rc,
            model::ocf_rc_description(rc)
        );
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match &cli.cmd {
        Commands::Status {
            node,
            resource,
            verbose,
        } => {
            let nodes = load_nodes(&cli)?;
            match query::status_of(&nodes, node, resource) {
                Ok(status) => {
                    println!(
                        "Resource \"{}\" on node \"{}\" has status \"{}\"",
                        resource, node, status
                    );
                    if *verbose {
                        print_history(query::resource_of(&nodes, node, resource)?);
                    }
                    if status.is_healthy() {
                        return Ok(ExitCode::SUCCESS);
                    }
                    return Ok(ExitCode::from(1));
                }
                Err(e) if e.is_not_found() => {
                    eprintln!("{}", e);
                    return Ok(ExitCode::from(2));
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Dump {
            node,
            resource,
            pretty,
        } => {
            let node_re = node
                .as_deref()
                .map(Regex::new)
                .transpose()
                .context("bad --node pattern")?;
            let resource_re = resource
                .as_deref()
                .map(Regex::new)
                .transpose()
                .context("bad --resource pattern")?;

            let nodes = load_nodes(&cli)?;
            let nodes = report::filter_nodes(&nodes, node_re.as_ref(), resource_re.as_ref());
            let json = if *pretty {
                serde_json::to_string_pretty(&nodes)?
            } else {
                serde_json::to_string(&nodes)?
            };
            println!("{}", json);
        }
        Commands::RcCodes => {
            for (code, meaning) in report::rc_table() {
                println!("{}  {}", code, meaning);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
