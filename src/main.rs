#[tokio::main]
async fn main() {
    if let Err(e) = salon_scheduler_lib::run().await {
        eprintln!("salon-scheduler: {e}");
        std::process::exit(1);
    }
}
