use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::path::{Path, PathBuf};

use cppconsole::logging::{init_logging, LogConfig};

mod cli;

#[derive(Parser)]
#[command(name = "cppconsole")]
#[command(about = "Interactive console that compiles and runs C++ one line at a time", long_about = None)]
struct Cli {
    #[arg(help = "Project main file, temporarily replaced by the console's program on each build")]
    project_main: Option<PathBuf>,

    #[arg(help = "Project executable produced by the project build")]
    project_artifact: Option<PathBuf>,

    #[arg(
        short = 'm',
        value_name = "PATH",
        help = "Project makefile directory or makefile (defaults to '.')"
    )]
    make: Option<PathBuf>,

    #[arg(long, value_name = "TOKEN", help = "Line prefix that places code at file scope")]
    static_prefix: Option<String>,

    #[arg(long, value_name = "FILE", help = "Settings file (defaults to cpp_console.yml)")]
    settings: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose debug output")]
    verbose: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_logging(&LogConfig::from_verbose(cli.verbose));

    let options = cli::StartupOptions {
        project_main: cli.project_main,
        project_artifact: cli.project_artifact,
        build_override: cli.make,
        static_prefix: cli.static_prefix,
        settings: cli.settings,
    };

    let startup = match cli::StartupConfig::resolve(options, Path::new(".")) {
        Ok(startup) => startup,
        Err(e) => {
            println!("cppconsole: *** {}", e);
            Cli::command().print_help()?;
            std::process::exit(1);
        }
    };

    let config = cli::Config {
        verbose: cli.verbose,
    };

    cli::run_console(startup, &config)
}
