use crate::demo::{
    run_basedata_check, run_demo, run_results_report, BasedataCheckArgs, DemoArgs,
    ResultsReportArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use exam_results::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Exam Results Office",
    about = "Run the exams office service or inspect entries and results from the command line",
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
    /// Summarise candidate results, optionally merged with an external CSV export
    Results {
        #[command(subcommand)]
        command: ResultsCommand,
    },
    /// Check basedata files before upload
    Basedata {
        #[command(subcommand)]
        command: BasedataCommand,
    },
    /// Walk through entries, placeholder resolution, results, and the embargo on demo data
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ResultsCommand {
    /// Print the results overview and the filtered candidate list
    Report(ResultsReportArgs),
}

#[derive(Subcommand, Debug)]
enum BasedataCommand {
    /// Report which files would be accepted
    Check(BasedataCheckArgs),
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
        Command::Results {
            command: ResultsCommand::Report(args),
        } => run_results_report(args),
        Command::Basedata {
            command: BasedataCommand::Check(args),
        } => run_basedata_check(args),
        Command::Demo(args) => run_demo(args),
    }
}
