#[tokio::main]
async fn main() {
    if let Err(e) = showcase::run().await {
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}
