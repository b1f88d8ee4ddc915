use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    interpose_cli::cli::app::run().await
}
