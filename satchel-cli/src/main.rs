use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use satchel::Collection;

#[derive(Parser, Debug)]
#[clap(name = "satchel", about, version)]
struct Args {
    /// Increase output logging verbosity.
    #[clap(short, long)]
    verbose: bool,

    /// Root directory to search for template files.
    #[clap(short, long, default_value = ".")]
    root: PathBuf,

    /// File name pattern(s) to read into the collection.
    #[clap(short, long = "pattern")]
    patterns: Vec<String>,

    /// Re-check files for changes on every lookup.
    #[clap(short, long)]
    dynamic: bool,

    /// JSON file with the data to render the template with.
    #[clap(long)]
    data: Option<PathBuf>,

    /// Which template to render. When omitted, lists the collection instead.
    name: Option<String>,
}

fn main() {
    let args = Args::parse();
    simple_logger::init_with_level(if args.verbose {
        log::Level::Debug
    } else {
        log::Level::Info
    })
    .unwrap();

    if let Err(e) = run(&args) {
        log::error!("Failed: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let patterns = if args.patterns.is_empty() {
        vec!["*.html".to_string()]
    } else {
        args.patterns.clone()
    };
    let collection = Collection::new(&args.root, &patterns, args.dynamic)?;

    match &args.name {
        Some(name) => {
            let data = match &args.data {
                Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
                None => serde_json::Value::Null,
            };
            print!("{}", collection.render(name, &data)?);
        }
        None => {
            for name in collection.templates().keys() {
                println!("{}", name);
            }
        }
    }
    Ok(())
}
