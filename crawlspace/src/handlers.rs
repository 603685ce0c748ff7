use clap::ArgMatches;
use colored::Colorize;
use crawlspace_core::crawl::{execute_crawl, execute_scan, CrawlOptions};
use crawlspace_core::license::{check_subscription, verify_token};
use crawlspace_core::report::{generate_report, write_report, ReportFormat};
use std::path::PathBuf;
use url::Url;

/// Parse a seed argument as a URL, trying to add http:// if needed
pub fn normalize_seed_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    // Try to parse as-is
    if let Ok(url) = Url::parse(raw)
        && url.host_str().is_some()
    {
        return Some(raw.to_string());
    }

    // Try adding http://
    let with_scheme = format!("http://{}", raw);
    if let Ok(url) = Url::parse(&with_scheme)
        && url.host_str().is_some()
    {
        return Some(with_scheme);
    }

    None
}

fn resolve_seed_or_exit(raw: &str) -> String {
    match normalize_seed_url(raw) {
        Some(url) => url,
        None => {
            eprintln!("{} Invalid URL: {}", "✗".red().bold(), raw);
            std::process::exit(1);
        }
    }
}

pub async fn handle_scan(args: &ArgMatches) {
    let raw_url = args.get_one::<String>("url").unwrap();
    let timeout = *args.get_one::<u64>("timeout").unwrap();
    let output = args.get_one::<PathBuf>("output");

    let url = resolve_seed_or_exit(raw_url);
    println!("{} Scanning {}", "→".blue(), url.bright_white());

    match execute_scan(&url, timeout).await {
        Ok(addresses) => {
            if addresses.is_empty() {
                println!("{} No email addresses found.", "•".yellow());
                return;
            }

            println!(
                "{} Found {} address(es):\n",
                "✓".green().bold(),
                addresses.len()
            );
            for address in &addresses {
                println!("  {}", address);
            }

            if let Some(path) = output {
                let content = addresses.join("\n") + "\n";
                match write_report(path, &content) {
                    Ok(()) => println!("\n{} Saved to {}", "✓".green().bold(), path.display()),
                    Err(e) => {
                        eprintln!("{} {}", "✗".red().bold(), e);
                        std::process::exit(1);
                    }
                }
            }
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}

pub async fn handle_crawl(args: &ArgMatches) {
    let raw_url = args.get_one::<String>("url").unwrap();
    let max_pages = *args.get_one::<usize>("max-pages").unwrap();
    let timeout = *args.get_one::<u64>("timeout").unwrap();
    let format = args.get_one::<String>("format").unwrap();
    let output = args.get_one::<PathBuf>("output");
    let api_url = args.get_one::<String>("api-url");
    let token = args.get_one::<String>("token");

    let url = resolve_seed_or_exit(raw_url);
    let format = ReportFormat::from_str(format).expect("clap restricts format values");

    // Site-wide crawling is the gated feature: when a backend is configured,
    // refuse to start without a token it accepts.
    if let Some(api_url) = api_url {
        let token = token.expect("clap enforces --token with --api-url");
        match verify_token(api_url, token).await {
            Ok(true) => {
                println!("{} Subscription token verified", "✓".green().bold());
            }
            Ok(false) => {
                eprintln!(
                    "{} Premium subscription required: token was rejected",
                    "✗".red().bold()
                );
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("{} {}", "✗".red().bold(), e);
                std::process::exit(1);
            }
        }
    }

    let base_domain = Url::parse(&url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| url.clone());
    println!(
        "{} Crawling {} (up to {} pages)\n",
        "→".blue(),
        base_domain.bright_white(),
        max_pages
    );

    let options = CrawlOptions {
        url,
        max_pages,
        timeout_secs: timeout,
        show_progress_bar: output.is_none(),
    };

    match execute_crawl(options).await {
        Ok(result) => {
            let report = match generate_report(&result, &format) {
                Ok(report) => report,
                Err(e) => {
                    eprintln!("{} {}", "✗".red().bold(), e);
                    std::process::exit(1);
                }
            };

            match output {
                Some(path) => match write_report(path, &report) {
                    Ok(()) => println!(
                        "{} Report saved to {} ({} addresses)",
                        "✓".green().bold(),
                        path.display(),
                        result.matches.len()
                    ),
                    Err(e) => {
                        eprintln!("{} {}", "✗".red().bold(), e);
                        std::process::exit(1);
                    }
                },
                None => {
                    println!();
                    print!("{}", report);
                }
            }
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}

pub async fn handle_license_verify(args: &ArgMatches) {
    let api_url = args.get_one::<String>("api-url").unwrap();
    let token = args.get_one::<String>("token").unwrap();

    match verify_token(api_url, token).await {
        Ok(true) => println!("{} Token is valid", "✓".green().bold()),
        Ok(false) => {
            println!("{} Token is not valid", "✗".red().bold());
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}

pub async fn handle_license_status(args: &ArgMatches) {
    let api_url = args.get_one::<String>("api-url").unwrap();
    let customer_id = args.get_one::<String>("customer-id").unwrap();

    match check_subscription(api_url, customer_id).await {
        Ok(status) => {
            if status.subscribed {
                println!("{} Subscription active", "✓".green().bold());
                if let Some(expires_at) = status.expires_at {
                    println!("  expires: {}", expires_at.bright_white());
                }
            } else {
                println!("{} No active subscription", "•".yellow());
            }
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}
