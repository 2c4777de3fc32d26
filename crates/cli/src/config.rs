use anyhow::{Context, Error, Result};
use compiler::Options;
use serde::Deserialize;
use serde_json::error::Category;
use std::{fs::read_to_string, path::Path};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub options: Options,
    /// Print the result without insignificant whitespace.
    #[serde(default)]
    pub minify: bool,
}

pub fn load_config(path: &Path) -> Result<Config> {
    fn convert_json_err(e: serde_json::Error) -> Error {
        let line = e.line();
        let column = e.column();

        let msg = match e.classify() {
            Category::Io => "io error",
            Category::Syntax => "syntax error",
            Category::Data => "unmatched data",
            Category::Eof => "unexpected eof",
        };
        Error::new(e).context(format!(
            "Failed to deserialize config (json) file: {}: {}:{}",
            msg, line, column
        ))
    }

    let content = read_to_string(path).context("Failed to read config file")?;

    serde_json::from_str::<Config>(&content).map_err(convert_json_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config() {
        let config: Config = serde_json::from_str(
            r#"{ "minify": true, "options": { "noNativeOverwrites": true, "passes": { "tailCalls": false } } }"#,
        )
        .unwrap();
        assert!(config.minify);
        assert!(config.options.no_native_overwrites);
        assert!(!config.options.no_global_property_reads);
        assert!(!config.options.passes.tail_calls);
        assert!(config.options.passes.fold_constants);
        assert_eq!(config.options.max_iterations, 100);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<Config>(r#"{ "options": { "inline": true } }"#).is_err());
    }
}
