use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = sherpa::cli::run().await {
        eprintln!("{e}");
        process::exit(1);
    }
}
