// CLI entry point: analyze one audio file and print the records.

use std::path::PathBuf;
use std::process::ExitCode;

use log::error;

use voice_sentiment::{AnalysisRecord, Pipeline, PipelineConfig};

struct CliArgs {
    input: PathBuf,
    json: bool,
}

fn parse_args() -> Result<CliArgs, String> {
    let mut input = None;
    let mut json = false;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "-h" | "--help" => return Err(String::new()),
            other if other.starts_with('-') => {
                return Err(format!("unknown flag: {}", other));
            }
            path => {
                if input.replace(PathBuf::from(path)).is_some() {
                    return Err("expected exactly one input file".to_string());
                }
            }
        }
    }

    match input {
        Some(input) => Ok(CliArgs { input, json }),
        None => Err("missing input audio file".to_string()),
    }
}

fn print_usage() {
    eprintln!("Usage: voice-sentiment [--json] <audio-file>");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  RECOGNITION_API_URL   speech-recognition endpoint");
    eprintln!("  RECOGNITION_API_KEY   bearer token for the endpoint");
    eprintln!("  HF_TOKEN              access token for gated model downloads");
    eprintln!("  VOICE_SENTIMENT_WORKERS     concurrent turn workers");
    eprintln!("  VOICE_SENTIMENT_MODELS_DIR  model cache directory");
}

fn print_records(records: &[AnalysisRecord]) {
    for record in records {
        println!("{}", record);
        println!("{}", "-".repeat(30));
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            if !msg.is_empty() {
                eprintln!("error: {}", msg);
                eprintln!();
            }
            print_usage();
            return ExitCode::from(2);
        }
    };

    let config = PipelineConfig::from_env();

    let result = async {
        let pipeline = Pipeline::from_config(config).await?;
        pipeline.run(&args.input).await
    }
    .await;

    match result {
        Ok(records) => {
            if args.json {
                match serde_json::to_string_pretty(&records) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        error!("Failed to serialize records: {}", e);
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                print_records(&records);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Pipeline failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
