use crate::CLAP_STYLING;
use clap::{arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("crawlspace")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("crawlspace")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("scan")
                .about(
                    "Scan a single page for email addresses in its visible text. No \
                crawling, no context capture.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The page to scan"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save addresses to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl a whole site breadth-first, same domain only, and harvest \
                email addresses with their visible-text context.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The seed URL to crawl from"),
                )
                .arg(
                    arg!(-m --"max-pages" <NUM>)
                        .required(false)
                        .help("Stop after visiting this many pages")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("50"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Per-request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, tsv")
                        .value_parser(["text", "json", "tsv"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"api-url" <URL>)
                        .required(false)
                        .help("Subscription backend base URL; when set, a valid --token is required")
                        .requires("token"),
                )
                .arg(
                    arg!(--"token" <TOKEN>)
                        .required(false)
                        .help("Subscription bearer token, verified against --api-url"),
                ),
        )
        .subcommand(
            command!("license")
                .about("Query the subscription backend")
                .subcommand_required(true)
                .subcommand(
                    command!("verify")
                        .about("Check whether a bearer token is still valid")
                        .arg(
                            arg!(--"api-url" <URL>)
                                .required(true)
                                .help("Subscription backend base URL"),
                        )
                        .arg(
                            arg!(--"token" <TOKEN>)
                                .required(true)
                                .help("The bearer token to verify"),
                        ),
                )
                .subcommand(
                    command!("status")
                        .about("Look up a customer's subscription")
                        .arg(
                            arg!(--"api-url" <URL>)
                                .required(true)
                                .help("Subscription backend base URL"),
                        )
                        .arg(
                            arg!(--"customer-id" <ID>)
                                .required(true)
                                .help("The customer id to look up"),
                        ),
                ),
        )
}
