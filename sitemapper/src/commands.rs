use crate::CLAP_STYLING;
use clap::arg;

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("sitemapper")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sitemapper")
        .about("Crawl a site breadth-first and print its sitemap.xml")
        .styles(CLAP_STYLING)
        .arg(
            arg!(--"origin" <URL>)
                .required(true)
                .help("The origin URL for the sitemap"),
        )
        .arg(
            arg!(-d --"depth" <DEPTH>)
                .required(false)
                .help("The maximum crawl (search) depth")
                .value_parser(clap::value_parser!(usize))
                .default_value("5"),
        )
        .arg(
            arg!(--"cross-site" [BOOL])
                .required(false)
                .help("Follow links to external sites")
                .value_parser(clap::value_parser!(bool))
                .num_args(0..=1)
                .default_value("false")
                .default_missing_value("true"),
        )
        .arg(
            arg!(-t --"concurrency" <NUM_WORKERS>)
                .required(false)
                .help("Maximum number of pages fetched at the same time")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("16"),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help("Request timeout in seconds")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("10"),
        )
        .arg(
            arg!(-o --"out" <PATH>)
                .required(false)
                .help("Write the sitemap to a file (default: stdout)"),
        )
        .arg(
            arg!(--"lastmod")
                .required(false)
                .help("Include a <lastmod> element with each page's discovery time")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-v --"verbose" "Log every request and skipped link to stderr")
                .required(false)
                .conflicts_with("quiet"),
        )
        .arg(arg!(-q --"quiet" "Suppress progress and non-essential output").required(false))
}
