use colored::Colorize;
use sitemapper::commands::command_argument_builder;
use sitemapper::handlers::handle_crawl;

#[tokio::main]
async fn main() {
    let matches = command_argument_builder().get_matches();

    if let Err(e) = handle_crawl(&matches).await {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
