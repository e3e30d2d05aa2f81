use anyhow::Result;
use anonprobe::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    anonprobe::init_tracing();
    let cli = Cli::parse();
    let code = anonprobe::run(cli).await?;
    std::process::exit(code)
}
