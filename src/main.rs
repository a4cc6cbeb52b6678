#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dissertation_hub::run().await {
        eprintln!("dissertation-hub fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
