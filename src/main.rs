use colored::Colorize;

#[tokio::main]
async fn main() {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    if let Err(err) = product_finder::run().await {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(product_finder::exit_code(&err));
    }
}
