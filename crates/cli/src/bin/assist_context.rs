use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    assist_cli::main_entry().await
}
