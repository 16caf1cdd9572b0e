use crate::config::{Config, OutputFormat, Overrides};
use crate::demo::DemoCall;
use anyhow::{Context, Result};
use clap::{Arg, ArgGroup, ArgMatches, Command};
use clearsign_erc7730::{
    CalldataDecoder, DescriptorCache, DescriptorSource, Erc7730Formatter, FormattedTransaction,
    ReviewSession,
};
use std::convert::Infallible;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Intent line followed by one `label: value` line per field
pub fn render_text(tx: &FormattedTransaction) -> String {
    let mut out = format!("{}\n[{}()]\n", tx.intent, tx.function_name);
    for field in &tx.fields {
        out.push_str(&format!("{}: {}\n", field.label, field.value));
    }
    out
}

/// Every review screen in order, each under its `[i/n]` position
pub fn render_review(session: &ReviewSession) -> String {
    let total = session.screen_count();
    session
        .screens()
        .enumerate()
        .map(|(i, screen)| format!("[{}/{total}]\n{screen}\n", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn command() -> Command {
    Command::new("clearsign")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Renders EVM calldata as ERC-7730 clear-signing fields")
        .arg(
            Arg::new("descriptor")
                .short('D')
                .long("descriptor")
                .value_name("PATH_OR_URL")
                .help("ERC-7730 descriptor file or http(s) URL"),
        )
        .arg(
            Arg::new("calldata")
                .short('c')
                .long("calldata")
                .value_name("HEX")
                .help("Transaction input data, with or without 0x"),
        )
        .arg(
            Arg::new("example")
                .short('e')
                .long("example")
                .value_name("NAME")
                .help("Format a generated example call instead of --calldata")
                .value_parser(DemoCall::NAMES),
        )
        .group(
            ArgGroup::new("input")
                .args(["calldata", "example"])
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FORMAT")
                .help("Output format")
                .value_parser(OutputFormat::NAMES),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("TOML config file; command-line flags take precedence")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log at debug level unless RUST_LOG is set")
                .action(clap::ArgAction::SetTrue),
        )
}

fn overrides(matches: &ArgMatches) -> Result<Overrides> {
    Ok(Overrides {
        descriptor: matches.get_one::<String>("descriptor").cloned(),
        output: matches
            .get_one::<String>("output")
            .map(|s| s.parse::<OutputFormat>())
            .transpose()?,
        verbose: matches.get_flag("verbose"),
    })
}

/// app cli
pub struct Cli;
impl Cli {
    /// Parses the command line, formats the transaction and prints it
    pub async fn execute() -> Result<()> {
        let matches = command().get_matches();

        let config = Config::resolve(
            matches.get_one::<PathBuf>("config").map(PathBuf::as_path),
            overrides(&matches)?,
        )?;
        init_tracing(&config.log_level);
        debug!(?config, "resolved configuration");

        let source: DescriptorSource = config
            .descriptor
            .parse()
            .unwrap_or_else(|never: Infallible| match never {});
        let cache = DescriptorCache::new(source);
        let descriptor = cache.load().await?;

        let calldata = match matches.get_one::<String>("example") {
            Some(name) => {
                let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default();
                name.parse::<DemoCall>()?.encode(&descriptor, now)?
            }
            None => matches
                .get_one::<String>("calldata")
                .cloned()
                .context("Either --calldata or --example is required")?,
        };

        let call = CalldataDecoder::from_descriptor(&descriptor).decode_hex(&calldata)?;
        debug!(signature = %call.signature(), "decoded calldata");
        let tx = Erc7730Formatter::new(descriptor).format_call(&call);

        match config.output {
            OutputFormat::Text => print!("{}", render_text(&tx)),
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&tx)
                    .context("Failed to serialize output as JSON")?;
                println!("{json}");
            }
            OutputFormat::Review => print!("{}", render_review(&ReviewSession::new(tx))),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clearsign_erc7730::FormattedField;

    fn transaction() -> FormattedTransaction {
        FormattedTransaction {
            intent: "Transfer tokens".to_string(),
            function_name: "simpleTransfer".to_string(),
            fields: vec![
                FormattedField {
                    label: "Token".to_string(),
                    value: "USDC Token".to_string(),
                    raw_value: None,
                    format: Some("addressName".to_string()),
                },
                FormattedField {
                    label: "Amount".to_string(),
                    value: "100".to_string(),
                    raw_value: None,
                    format: Some("tokenAmount".to_string()),
                },
            ],
        }
    }

    #[test]
    fn test_command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn test_calldata_or_example_required() {
        assert!(command().try_get_matches_from(["clearsign"]).is_err());
        assert!(
            command()
                .try_get_matches_from(["clearsign", "-c", "0x00", "-e", "swap"])
                .is_err()
        );
        assert!(
            command()
                .try_get_matches_from(["clearsign", "--example", "mint"])
                .is_err()
        );
    }

    #[test]
    fn test_overrides_from_flags() {
        let matches = command()
            .try_get_matches_from(["clearsign", "-e", "swap", "-o", "json", "-v"])
            .unwrap();
        let overrides = overrides(&matches).unwrap();
        assert_eq!(overrides.descriptor, None);
        assert_eq!(overrides.output, Some(OutputFormat::Json));
        assert!(overrides.verbose);
    }

    #[test]
    fn test_render_text() {
        assert_eq!(
            render_text(&transaction()),
            "Transfer tokens\n[simpleTransfer()]\nToken: USDC Token\nAmount: 100\n"
        );
    }

    #[test]
    fn test_render_review() {
        let session = ReviewSession::new(transaction());
        assert_eq!(
            render_review(&session),
            "[1/3]\n> REVIEW TRANSACTION\nTransfer tokens\n[simpleTransfer()]\n\n\
             [2/3]\n> Token\nUSDC Token\n\n\
             [3/3]\n> Amount\n100\n"
        );
    }
}
