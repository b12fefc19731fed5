use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    tenant_console::cli::run().await
}
