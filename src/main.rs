use angprep::core::rewrite;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "angprep")]
#[command(about = "Interactive beam-parameter editor for the angCorr.C macro")]
#[command(version, long_about = None)]
struct Cli {}

fn main() {
    let _cli = Cli::parse();

    // Diagnostics on stderr; prompts and the summary own stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    rewrite::finish_with_exit(rewrite::run());
}
