use clap::Parser;
use gurubell_app::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    gurubell_app::init_tracing();
    gurubell_app::run(cli).await
}
