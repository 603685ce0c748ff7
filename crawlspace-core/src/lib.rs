pub mod crawl;
pub mod license;
pub mod report;

use colored::Colorize;

pub fn print_banner() {
    println!();
    println!(
        "  {} {}",
        "crawlspace".bright_cyan().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
    println!(
        "  {}",
        "same-domain email harvesting crawler".bright_black()
    );
    println!();
}
