use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use autoprefixer_bridge::context::ProcessorConfig;
use autoprefixer_bridge::{EngineSource, Options, Processor};
use clap::Parser;
use serde_json::Value;
use tracing::Level;

/// Add vendor prefixes to a stylesheet.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input CSS file. Reads stdin when omitted.
    input: Option<PathBuf>,
    /// Write CSS here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Source path used for config discovery and error messages
    #[arg(long)]
    from: Option<String>,
    /// Emit a source map next to the output (`<output>.map`)
    #[arg(long)]
    map: bool,
    /// Browser query; repeat for several. Disables browserslist discovery.
    #[arg(short, long = "browsers")]
    browsers: Vec<String>,
    /// Engine script (the prefixer's JavaScript bundle)
    #[arg(long, env = "AUTOPREFIXER_JS")]
    engine: PathBuf,
    /// Print `{"css": ..., "map": ...}` as JSON instead of plain CSS
    #[arg(long, conflicts_with = "output")]
    json: bool,
    /// Print selected browsers and prefixes, then exit
    #[arg(long)]
    info: bool,
    /// More logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("autoprefix: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = ProcessorConfig::new(EngineSource::File(args.engine.clone()));

    // explicit browsers go into the constructor so `--info` sees them too
    let mut params = Options::new();
    if !args.browsers.is_empty() {
        let list = args.browsers.iter().cloned().map(Value::String).collect();
        params.insert("browsers".into(), Value::Array(list));
    }
    let mut processor = Processor::with_config(params, config);

    if args.info {
        println!("{}", processor.info()?);
        return Ok(());
    }

    let css = match &args.input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let mut opts = Options::new();
    let from = args
        .from
        .clone()
        .or_else(|| args.input.as_ref().map(|p| p.display().to_string()));
    if let Some(from) = from {
        opts.insert("from".into(), Value::String(from));
    }
    if let Some(output) = &args.output {
        opts.insert("to".into(), Value::String(output.display().to_string()));
    }
    if args.map {
        opts.insert("map".into(), Value::Bool(true));
    }

    let result = processor.process(&css, &opts)?;

    match &args.output {
        Some(output) => {
            std::fs::write(output, &result.css)?;
            if let Some(map) = &result.map {
                let mut map_path = output.clone().into_os_string();
                map_path.push(".map");
                std::fs::write(map_path, map)?;
            }
        }
        None if args.json => println!("{}", serde_json::to_string_pretty(&result)?),
        None => print!("{result}"),
    }
    Ok(())
}
