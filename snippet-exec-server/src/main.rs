use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use snippet_exec::{ExecutorConfig, NamingMode};
use snippet_exec_server::{create_app, create_service, run_server};
use std::{io::Read, net::SocketAddr, path::PathBuf, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML file with executor settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Compiler binary
    #[arg(long, global = true)]
    compiler: Option<String>,

    /// Runtime binary
    #[arg(long, global = true)]
    runtime: Option<String>,

    /// Execution deadline in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Directory for per-request workspaces
    #[arg(long, global = true)]
    temp_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve executions over HTTP
    Serve {
        /// Server address to listen on
        #[arg(short, long, default_value = "0.0.0.0:3000")]
        addr: SocketAddr,
    },
    /// Handle a single event and print the response
    Invoke {
        /// JSON event file, or `-` for stdin
        #[arg(default_value = "-")]
        event: String,

        /// How the class name is chosen
        #[arg(long, value_enum, default_value_t = Variant::Derived)]
        variant: Variant,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Variant {
    Fixed,
    Derived,
}

impl From<Variant> for NamingMode {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::Fixed => NamingMode::Fixed,
            Variant::Derived => NamingMode::Derived,
        }
    }
}

impl Args {
    fn executor_config(&self) -> anyhow::Result<ExecutorConfig> {
        let mut config = match &self.config {
            Some(path) => ExecutorConfig::load(path)?,
            None => ExecutorConfig::default(),
        };
        if let Some(compiler) = &self.compiler {
            config = config.with_compiler(compiler.clone());
        }
        if let Some(runtime) = &self.runtime {
            config = config.with_runtime(runtime.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_execution_timeout(Duration::from_secs(secs));
        }
        if let Some(temp_dir) = &self.temp_dir {
            config = config.with_temp_root(temp_dir.clone());
        }
        Ok(config)
    }
}

fn read_event(source: &str) -> anyhow::Result<Vec<u8>> {
    if source == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read event from stdin")?;
        Ok(buf)
    } else {
        std::fs::read(source).with_context(|| format!("Failed to read event file {}", source))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `invoke` output stays parseable.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = args.executor_config()?;

    match args.command {
        Command::Serve { addr } => {
            let app = create_app(config)?;
            run_server(app, addr).await?;
        }
        Command::Invoke { event, variant } => {
            let service = create_service(config)?;
            let bytes = read_event(&event)?;
            let response = service.handle_bytes(bytes, variant.into()).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
