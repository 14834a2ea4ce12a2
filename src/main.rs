use anyhow::Result;
use autopilot::build::build_site;
use autopilot::config::Config;
use autopilot::fetch;
use autopilot::wikipedia::Client;
use clap::{crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("autopilot=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = App::new("autopilot")
        .version(crate_version!())
        .about("Writes a daily post and rebuilds the index listing")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("directory")
                .short("C")
                .long("directory")
                .takes_value(true)
                .help("Where to start looking for autopilot.yaml (default: current directory)"),
        )
        .subcommand(
            SubCommand::with_name("fetch")
                .about("Fetches today's featured content and writes it as a post")
                .arg(
                    Arg::with_name("once")
                        .long("once")
                        .help("Run a single time (accepted for scheduler compatibility)"),
                ),
        )
        .subcommand(
            SubCommand::with_name("build").about("Rebuilds the latest-posts listing of the index page"),
        )
        .get_matches();

    if let Err(e) = run(&matches) {
        eprintln!("ERROR: {:#}", e);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let directory = match matches.value_of("directory") {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };
    let config = Config::from_directory(&directory)?;

    match matches.subcommand() {
        ("fetch", Some(_)) => {
            let client = Client::new(&config)?;
            let today = chrono::Local::now().date_naive();
            let outcome = fetch::run(&config, &client, today)?;
            println!("Wrote post: {}", outcome.path.display());
            Ok(())
        }
        ("build", Some(_)) => Ok(build_site(&config)?),
        // `SubcommandRequiredElseHelp` exits before we get here.
        _ => Ok(()),
    }
}
