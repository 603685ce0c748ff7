use commands::command_argument_builder;
use crawlspace::handlers;
use crawlspace_core::print_banner;

mod commands;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    match chosen_command.subcommand() {
        Some(("scan", primary_command)) => handlers::handle_scan(primary_command).await,
        Some(("crawl", primary_command)) => handlers::handle_crawl(primary_command).await,
        Some(("license", primary_command)) => match primary_command.subcommand() {
            Some(("verify", secondary_command)) => {
                handlers::handle_license_verify(secondary_command).await
            }
            Some(("status", secondary_command)) => {
                handlers::handle_license_status(secondary_command).await
            }
            _ => unreachable!("clap should ensure we don't get here"),
        },
        _ => unreachable!("clap should ensure we don't get here"),
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
