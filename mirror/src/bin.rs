use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
    process::exit,
    sync::{atomic::AtomicBool, Arc},
};

use anyhow::{Context as AnyhowContext, Result};
use env_logger::Env;
use structopt::StructOpt;

use mirror::context::Context;
use mirror::run;

#[derive(StructOpt, Debug)]
#[structopt(name = "mirror", about = "One-way periodic folder mirroring")]
struct Opt {
    /// Path to the source folder
    #[structopt(parse(from_os_str))]
    source: PathBuf,

    /// Path to the replica folder
    #[structopt(parse(from_os_str))]
    replica: PathBuf,

    /// Synchronization interval in seconds
    interval: u64,

    /// Path to the log file
    #[structopt(parse(from_os_str))]
    log_file: PathBuf,
}

impl Opt {
    fn to_context(&self) -> Context {
        Context::new(
            self.source.clone(),
            self.replica.clone(),
            self.interval,
            self.log_file.clone(),
        )
    }
}

/// Prompt until the source folder exists or the user declines.
fn ensure_source_folder_exists(source: &PathBuf) -> Result<()> {
    while !source.exists() {
        eprintln!("Error: Source folder '{}' does not exist.", source.display());
        print!("Would you like to create it? (y/n): ");
        io::stdout().flush().context("Flush stdout")?;
        let mut answer = String::new();
        io::stdin()
            .read_line(&mut answer)
            .context("Read answer from stdin")?;
        if answer.trim().eq_ignore_ascii_case("y") {
            fs::create_dir_all(source)
                .context(format!("Create source folder {}", source.display()))?;
            println!(
                "Source folder '{}' has been created. Starting synchronization...",
                source.display()
            );
        } else {
            println!("Exiting. Please create the source folder and run again.");
            exit(1);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let opt = Opt::from_args();

    ensure_source_folder_exists(&opt.source)?;

    let context = opt.to_context();
    let stop_signal = Arc::new(AtomicBool::new(false));
    run::run(context, stop_signal)?;
    log::info!("Exit application");
    Ok(())
}
