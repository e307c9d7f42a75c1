#[tokio::main]
async fn main() {
    medsight::init_tracing();
    if let Err(e) = medsight::run().await {
        tracing::error!("fatal: {e}");
        std::process::exit(1);
    }
}
