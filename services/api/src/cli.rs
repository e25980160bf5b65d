use crate::demo::{run_demo, run_quote, run_verify, DemoArgs, QuoteArgs, VerifyArgs};
use crate::server;
use batho_pele::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Batho Pele Intake",
    about = "Run the Batho Pele patient intake service and its front-desk tools",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Validate one identity document and show the resulting classification
    Verify(VerifyArgs),
    /// Quote a standard treatment plan for a cost tier
    Quote(QuoteArgs),
    /// Walk through intake, referral, treatment and invoicing with sample patients
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Verify(args) => run_verify(args),
        Command::Quote(args) => run_quote(args),
        Command::Demo(args) => run_demo(args),
    }
}
