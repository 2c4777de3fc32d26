use anyhow::{bail, Context, Result};
use ast::ProgramData;
use config::{load_config, Config};
use std::{env, fs, path::Path};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

/// Usage: `cli <input.js> [output.js]`
///
/// Options are read from `config.json` in the working directory when it
/// exists. The result goes to stdout unless an output path is given.
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let filename = match args.get(1) {
        Some(filename) => filename,
        None => bail!("usage: cli <input.js> [output.js]"),
    };
    let path = Path::new(filename);

    let config_file = Path::new("config.json");
    let config = if config_file.exists() {
        load_config(config_file)?
    } else {
        Config::default()
    };

    let src = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut program_data = ProgramData::default();
    let mut program = parser::parse_program(&src, &mut program_data)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let changed = compiler::optimize(&mut program, &mut program_data, &config.options);
    info!(changed, "optimized {}", path.display());

    let out = codegen::print_program(
        &program,
        codegen::Config {
            minify: config.minify,
        },
    );
    match args.get(2) {
        Some(out_path) => fs::write(out_path, out).context("Failed to write file"),
        None => {
            print!("{}", out);
            Ok(())
        }
    }
}
