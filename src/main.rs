use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    study_bot::cli::run_cli().await
}
