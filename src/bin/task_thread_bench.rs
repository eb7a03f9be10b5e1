use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use task_thread_bench::cache::CacheStore;
use task_thread_bench::executor::Executor;
use task_thread_bench::report::Reporter;
use task_thread_bench::{ModeTable, DEFAULT_VERSIONS};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "task-thread-bench")]
#[command(about = "Task vs thread allocation benchmark across runtime versions (markdown tables)")]
struct Args {
    /// Re-run benchmarks even when cached results exist.
    #[arg(long, default_value_t = false)]
    force: bool,

    /// Runtime versions (container image tags) to benchmark. Repeatable;
    /// defaults to the built-in version matrix.
    #[arg(long = "version", value_name = "IMAGE")]
    versions: Vec<String>,

    /// Directory holding cached benchmark results.
    #[arg(long, value_name = "DIR", default_value = "results")]
    results: PathBuf,

    /// Host directory mounted read-only into the container; probe scripts
    /// live here. Defaults to the current directory.
    #[arg(long, value_name = "DIR")]
    workspace: Option<PathBuf>,

    /// Container engine binary.
    #[arg(long, default_value = "docker")]
    engine: String,

    /// Interpreter used to launch the probe inside the container.
    #[arg(long, default_value = "ruby")]
    interpreter: String,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .try_init();
}

fn run(args: &Args) -> task_thread_bench::error::Result<()> {
    let workspace = match &args.workspace {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };

    let cache = CacheStore::new(&args.results);
    let executor = Executor::new(workspace)
        .with_engine(&args.engine)
        .with_interpreter(&args.interpreter);
    let modes = ModeTable::default();

    let versions: Vec<String> = if args.versions.is_empty() {
        DEFAULT_VERSIONS.iter().map(|v| v.to_string()).collect()
    } else {
        args.versions.clone()
    };

    let reporter = Reporter::new(&cache, &executor, &modes, args.force);
    let blocks = reporter.render(&versions)?;

    // Tables go to stdout; all progress went to stderr via tracing.
    println!("# Task vs Thread Allocation Benchmark");
    for block in blocks {
        println!();
        print!("{block}");
    }
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
