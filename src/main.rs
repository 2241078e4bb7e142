use ormgen::config::GeneratorConfig;
use ormgen::factory::ModelFactory;
use ormgen::serializer;
use std::env;
use std::fs;
use std::path::Path;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ormgen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <schema.json> [options]", args[0]);
        eprintln!();
        eprintln!("Options:");
        eprintln!("  -c, --config <file>   Generator configuration (JSON)");
        eprintln!("  -o, --output <file>   Output file (default: stdout)");
        process::exit(1);
    }

    let input_path = &args[1];
    let mut output_path: Option<String> = None;
    let mut config_path: Option<String> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--output" => {
                i += 1;
                if i < args.len() {
                    output_path = Some(args[i].clone());
                }
            }
            "-c" | "--config" => {
                i += 1;
                if i < args.len() {
                    config_path = Some(args[i].clone());
                }
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let config = match config_path {
        Some(path) => {
            let source = match fs::read_to_string(&path) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Failed to read {}: {}", path, e);
                    process::exit(1);
                }
            };
            let parsed = serde_json::from_str::<serde_json::Value>(&source)
                .map_err(ormgen::ModelError::from)
                .and_then(|tree| GeneratorConfig::from_tree(&tree));
            match parsed {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Config error in {}: {}", path, e);
                    process::exit(1);
                }
            }
        }
        None => GeneratorConfig::default(),
    };

    let mut schema = match ModelFactory::default().load(Path::new(input_path)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Build error: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = ormgen::finalize_with(&mut schema, &config) {
        eprintln!("Finalize error: {}", e);
        process::exit(1);
    }

    let dump = serializer::serialize(&schema);

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &dump) {
                eprintln!("Failed to write {}: {}", path, e);
                process::exit(1);
            }
        }
        None => print!("{}", dump),
    }
}
