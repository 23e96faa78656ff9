use log::{debug, error, info, warn};
use time::OffsetDateTime;
use tokio::io::{AsyncBufReadExt, BufReader};

use nearable_decoder::config::{DecodeMode, DecoderConfig, OutputFormat};
use nearable_decoder::models::{DecodeSummary, DecodedRecord};
use nearable_decoder::utils::{format_datetime, parse_hex, render_json, render_text};
use nearable_decoder::{decode, decode_advertisement, DecodeError};

/// Decode one input line and print every nearable found in it
fn process_line(line: &str, config: &DecoderConfig, summary: &mut DecodeSummary) {
    let bytes = match parse_hex(line) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Line {}: {}", summary.lines, e);
            summary.malformed += 1;
            return;
        }
    };

    let received_at = OffsetDateTime::now_utc();
    let results: Vec<Result<DecodedRecord, DecodeError>> = match config.mode {
        DecodeMode::Structure => vec![decode(&bytes)],
        DecodeMode::Advertisement => {
            let decoded = decode_advertisement(&bytes);
            decoded
                .records
                .into_iter()
                .map(Ok)
                .chain(decoded.error.map(Err))
                .collect()
        }
    };

    for result in results {
        match result {
            Ok(DecodedRecord::Nearable {
                bytes_consumed,
                nearable,
            }) => {
                summary.nearables += 1;
                let name = config.name_for(nearable.major, nearable.minor);

                match config.output {
                    OutputFormat::Json => {
                        match render_json(&nearable, bytes_consumed, name, &received_at) {
                            Ok(json) => println!("{}", json),
                            Err(e) => error!("Failed to serialize nearable {}: {}", nearable.uuid, e),
                        }
                    }
                    OutputFormat::Text => println!("{}", render_text(&nearable, name, &received_at)),
                }
            }
            Ok(DecodedRecord::Unrecognized { bytes_consumed }) => {
                summary.unrecognized += 1;
                debug!(
                    "Line {}: skipped {} byte structure",
                    summary.lines, bytes_consumed
                );
            }
            Err(e) => {
                summary.malformed += 1;
                warn!("Line {}: {}", summary.lines, e);
            }
        }
    }
}

async fn main_loop(
    config: &DecoderConfig,
    summary: &mut DecodeSummary,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "Reading hex-encoded advertisements from stdin at: {}",
        format_datetime(&OffsetDateTime::now_utc())
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        summary.lines += 1;
        process_line(line, config, summary);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match DecoderConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    let mut summary = DecodeSummary::default();

    // Run main loop until stdin closes or Ctrl+C
    tokio::select! {
        result = main_loop(&config, &mut summary) => {
            match result {
                Ok(_) => info!("Input closed"),
                Err(e) => error!("Fatal error: {}", e),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Program terminated by user. Exiting gracefully.");
        }
    }

    info!("Summary:");
    info!("  Lines read: {}", summary.lines);
    info!("  Nearables decoded: {}", summary.nearables);
    info!("  Unrecognized structures: {}", summary.unrecognized);
    info!("  Malformed inputs: {}", summary.malformed);

    if summary.lines > 0 && summary.nearables == 0 {
        warn!("No nearables found in the input!");
    }

    Ok(())
}
