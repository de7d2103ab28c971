use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use daoweave_codegen::orchestrator::DEFAULT_WORKERS;
use daoweave_codegen::{
    BuildConfig, BuildOrchestrator, BuildReport, ContractLocator, FileSink,
    MemorySink, SourceIndex,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "daoweave")]
#[command(about = "daoweave - generate data-access implementations from contract traits", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Provider, Mapper and Impl files for every contract under src/
    Generate {
        /// Source directory to scan and write into (env: DAOWEAVE_SRC)
        #[arg(short, long)]
        src: Option<PathBuf>,
        /// Number of parallel workers (env: DAOWEAVE_WORKERS)
        #[arg(short, long)]
        workers: Option<usize>,
        /// Print the files that would be written without writing them
        #[arg(long)]
        dry_run: bool,
    },
    /// List the contracts and entities found under src/
    Scan {
        /// Source directory to scan (env: DAOWEAVE_SRC)
        #[arg(short, long)]
        src: Option<PathBuf>,
        /// Print the full descriptors as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();
    run_cli(cli).await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run_cli(cli: Cli) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match cli.command {
        Commands::Generate {
            src,
            workers,
            dry_run,
        } => {
            let src = resolve_src(src);
            let config = BuildConfig::new(&src).with_workers(resolve_workers(workers));
            println!(">> Scanning {}...", src.display());
            if dry_run {
                let orchestrator = BuildOrchestrator::new(config, MemorySink::new());
                let report = orchestrator.run().await?;
                print_dry_run(orchestrator.sink(), &src)?;
                print_report(&report);
                println!("[OK] Dry run complete. No files written.");
            } else {
                let orchestrator = BuildOrchestrator::new(config, FileSink);
                let report = orchestrator.run().await?;
                print_report(&report);
                if !report.generated.is_empty() {
                    println!(
                        "[INFO] Declare the generated modules (`mod provider;`, `mod proxy;`, ...) if they are new."
                    );
                }
            }
        }
        Commands::Scan { src, json } => {
            let src = resolve_src(src);
            let index = ContractLocator::new(&src).locate()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&index)?);
            } else {
                print!("{}", render_scan(&index));
            }
        }
    }
    Ok(())
}

fn resolve_src(arg: Option<PathBuf>) -> PathBuf {
    arg.or_else(|| std::env::var("DAOWEAVE_SRC").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("src"))
}

fn resolve_workers(arg: Option<usize>) -> usize {
    arg.or_else(|| {
        std::env::var("DAOWEAVE_WORKERS")
            .ok()
            .and_then(|value| value.trim().parse().ok())
    })
    .filter(|workers| *workers > 0)
    .unwrap_or(DEFAULT_WORKERS)
}

fn print_dry_run(sink: &MemorySink, src: &Path) -> Result<(), daoweave_codegen::GenError> {
    for artifact in sink.artifacts() {
        let path = FileSink::target_path(&artifact, src)?;
        println!("[DRY RUN] {} -> {}", artifact.type_name, path.display());
    }
    Ok(())
}

fn print_report(report: &BuildReport) {
    for name in &report.excluded {
        println!("[INFO] {} already implemented; skipped", name);
    }
    if !report.skipped.is_empty() {
        println!(
            "[WARN] {} contract(s) without an output module: {}",
            report.skipped.len(),
            report.skipped.join(", ")
        );
    }
}

fn render_scan(index: &SourceIndex) -> String {
    let mut out = String::new();
    if index.contracts.is_empty() && index.entities.is_empty() {
        out.push_str("[WARN] No #[dao_proxy] contracts or #[derive(Entity)] structs found.\n");
        return out;
    }
    out.push_str(&format!("Entities ({}):\n", index.entities.len()));
    for entity in &index.entities {
        out.push_str(&format!(
            "  {} -> {} ({} fields)\n",
            entity.type_path(),
            entity.table.as_deref().unwrap_or("<no table>"),
            entity.fields.len()
        ));
    }
    out.push_str(&format!("Contracts ({}):\n", index.contracts.len()));
    for contract in &index.contracts {
        out.push_str(&format!(
            "  {} -> {} ({} declared methods)\n",
            contract.type_path(),
            contract.output.as_deref().unwrap_or("<no output>"),
            contract.methods.len()
        ));
    }
    out
}
