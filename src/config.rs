use log::{debug, warn};
use std::collections::HashMap;
use std::env;

/// How decoded nearables are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

/// How much of each input line is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    /// Walk every AD structure in the line
    Advertisement,
    /// Decode only the structure at the start of the line
    Structure,
}

#[derive(Debug, Clone)]
pub struct DecoderConfig {
    pub output: OutputFormat,
    pub mode: DecodeMode,
    /// Display names keyed by (major, minor)
    pub names: HashMap<(u16, u16), String>,
}

impl DecoderConfig {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // Load environment variables
        dotenv::dotenv().ok();

        let output = match env::var("NEARABLE_OUTPUT") {
            Ok(value) => parse_output(&value)?,
            Err(_) => OutputFormat::Json,
        };

        let mode = match env::var("NEARABLE_MODE") {
            Ok(value) => parse_mode(&value)?,
            Err(_) => DecodeMode::Advertisement,
        };

        let names = match env::var("NEARABLE_NAMES") {
            Ok(value) => parse_names(&value),
            Err(_) => HashMap::new(),
        };

        debug!(
            "Configuration: output={:?}, mode={:?}, {} named nearables",
            output,
            mode,
            names.len()
        );

        Ok(DecoderConfig {
            output,
            mode,
            names,
        })
    }

    pub fn name_for(&self, major: u16, minor: u16) -> Option<&str> {
        self.names.get(&(major, minor)).map(String::as_str)
    }
}

pub fn parse_output(value: &str) -> Result<OutputFormat, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "json" => Ok(OutputFormat::Json),
        "text" => Ok(OutputFormat::Text),
        other => Err(format!(
            "Invalid NEARABLE_OUTPUT '{}', expected 'json' or 'text'",
            other
        )),
    }
}

pub fn parse_mode(value: &str) -> Result<DecodeMode, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "advertisement" => Ok(DecodeMode::Advertisement),
        "structure" => Ok(DecodeMode::Structure),
        other => Err(format!(
            "Invalid NEARABLE_MODE '{}', expected 'advertisement' or 'structure'",
            other
        )),
    }
}

/// Parse `major:minor=name` pairs separated by commas
pub fn parse_names(value: &str) -> HashMap<(u16, u16), String> {
    let mut names = HashMap::new();

    for pair in value.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }

        let Some((ids, name)) = pair.split_once('=') else {
            warn!("Failed to split pair: '{}'", pair);
            continue;
        };

        let name = name.trim();
        let ids: Option<(u16, u16)> = ids.trim().split_once(':').and_then(|(major, minor)| {
            Some((major.trim().parse().ok()?, minor.trim().parse().ok()?))
        });

        match ids {
            Some(ids) if !name.is_empty() => {
                names.insert(ids, name.to_string());
            }
            _ => warn!("Ignoring invalid nearable name: '{}'", pair),
        }
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_output_and_mode() {
        assert_eq!(parse_output("json"), Ok(OutputFormat::Json));
        assert_eq!(parse_output(" TEXT "), Ok(OutputFormat::Text));
        assert!(parse_output("csv").is_err());

        assert_eq!(parse_mode("advertisement"), Ok(DecodeMode::Advertisement));
        assert_eq!(parse_mode("Structure"), Ok(DecodeMode::Structure));
        assert!(parse_mode("all").is_err());
    }

    #[test]
    fn parses_names() {
        let names = parse_names("1:2=kitchen, 300:65535 = fridge door");
        assert_eq!(names.len(), 2);
        assert_eq!(names[&(1, 2)], "kitchen");
        assert_eq!(names[&(300, 65535)], "fridge door");
    }

    #[test]
    fn skips_invalid_names() {
        let names = parse_names("1:2,3=x,4:70000=y,5:6=,7:8=ok,,");
        assert_eq!(names.len(), 1);
        assert_eq!(names[&(7, 8)], "ok");
    }

    #[test]
    fn looks_up_names() {
        let config = DecoderConfig {
            output: OutputFormat::Json,
            mode: DecodeMode::Advertisement,
            names: parse_names("1:2=kitchen"),
        };

        assert_eq!(config.name_for(1, 2), Some("kitchen"));
        assert_eq!(config.name_for(2, 1), None);
    }
}
