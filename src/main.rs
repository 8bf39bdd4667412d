mod cli;
mod client;
mod commands;
mod config;
mod error;
mod output;
mod table;

use clap::Parser;
use cli::{Cli, Commands};
use client::Session;
use commands::{
    handle_identity_command,
    handle_image_command,
    handle_keys_command,
    handle_kube_command,
    handle_network_command,
    handle_vm_command,
};
use error::CliResult;
use log::LevelFilter;
use output::print_error;

fn main() {
    let cli = Cli::parse();

    pretty_env_logger::formatted_timed_builder()
        .filter_level(match cli.debug {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .init();

    let result = run(&cli);

    if let Err(e) = result {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> CliResult<()> {
    let session = Session::open(cli.profile.as_deref())?;
    match &cli.command {
        Commands::Vm(cmd) => handle_vm_command(cmd, &session),
        Commands::Image(cmd) => handle_image_command(cmd, &session),
        Commands::Sshkey(cmd) => handle_keys_command(cmd, &session),
        Commands::Network(cmd) => handle_network_command(cmd, &session),
        Commands::Kube(cmd) => handle_kube_command(cmd, &session),
        Commands::Identity(cmd) => handle_identity_command(cmd, &session),
    }
}
