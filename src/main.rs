//! cmux - CLI entry point
//!
//! Sends raw protocol commands to a running cmux instance, either one at a
//! time or from an interactive prompt, and reports which socket would be used.

use clap::{Parser, Subcommand};
use cmux_client::config::{loader::ConfigLoader, xdg};
use cmux_client::{logging, Client, CommandChannel, Commands as _, LocatorConfig, SocketLocator};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Command-line client for the cmux control socket
#[derive(Parser)]
#[command(name = "cmux")]
#[command(version, about = "Command-line client for the cmux control socket")]
struct Cli {
    /// Socket path (skips automatic resolution)
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    /// Configuration file (default: $XDG_CONFIG_HOME/cmux/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the cmux CLI
#[derive(Subcommand)]
enum Commands {
    /// Send one command line and print the response
    Exec {
        /// Command name, e.g. `list_tabs`
        command: String,

        /// Command arguments, joined with spaces
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Read commands from stdin until `quit`, `exit` or EOF
    Repl,

    /// Print the socket path and bundle id that would be used
    Resolve,

    /// Check that the server answers
    Ping,

    /// Inspect the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Actions for the config subcommand
#[derive(Subcommand)]
enum ConfigAction {
    /// Print the configuration file path
    Path,
    /// Validate the configuration file
    Validate,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Commands::Config { action } = &cli.command {
        return run_config_command(action, cli.config.as_deref());
    }

    let config = match ConfigLoader::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {e}");
            return ExitCode::FAILURE;
        }
    };
    logging::init(config.log.level);

    let timeouts = match config.timeouts.to_timeouts() {
        Ok(timeouts) => timeouts,
        Err(e) => {
            eprintln!("Config error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let locator = SocketLocator::new(LocatorConfig::from_env().merge_file(&config.socket));

    if let Commands::Resolve = cli.command {
        let path = cli.socket.unwrap_or_else(|| locator.resolve());
        println!("{}", path.display());
        println!("{}", locator.bundle_id());
        return ExitCode::SUCCESS;
    }

    let client = match cli.socket {
        Some(path) => Client::at(path),
        None => Client::with_locator(&locator),
    };
    let mut client = client.with_timeouts(timeouts);

    let result = client.connect().and_then(|()| match cli.command {
        Commands::Exec { command, args } => {
            let response = client.execute(&command_line(&command, &args))?;
            println!("{response}");
            Ok(true)
        }
        Commands::Repl => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            run_repl(&mut client, stdin.lock(), &mut stdout.lock())?;
            Ok(true)
        }
        Commands::Ping => {
            let alive = client.ping()?;
            if alive {
                println!("PONG");
            }
            Ok(alive)
        }
        Commands::Resolve | Commands::Config { .. } => Ok(true),
    });
    client.close();

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            eprintln!("Error: server did not answer PONG");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_config_command(action: &ConfigAction, path: Option<&Path>) -> ExitCode {
    match action {
        ConfigAction::Path => {
            let path = path.map(Path::to_path_buf).unwrap_or_else(xdg::config_path);
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        ConfigAction::Validate => {
            let result = ConfigLoader::load(path).and_then(|config| {
                config.timeouts.to_timeouts()?;
                Ok(config)
            });
            match result {
                Ok(config) => {
                    println!("Configuration is valid");
                    println!("{config:#?}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Config error: {e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

/// Joins a command name and its arguments into one protocol line.
fn command_line(command: &str, args: &[String]) -> String {
    let mut line = command.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

/// Interactive loop: each non-blank line is sent raw and the reply printed.
fn run_repl<C, R, W>(channel: &mut C, input: R, out: &mut W) -> cmux_client::Result<()>
where
    C: CommandChannel,
    R: BufRead,
    W: Write,
{
    writeln!(out, "cmux (type 'help' for commands, 'quit' to exit)")?;
    let mut lines = input.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let line = line?;
        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }
        if line.is_empty() {
            continue;
        }
        let response = channel.execute(line)?;
        writeln!(out, "{response}")?;
    }
    Ok(())
}
