// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info, warn};
use prost::Message;

use pxapi::config::{self, ConfigSource, OutputFormat, ToolConfig};
use pxapi::proto::{RowBatchData, UuidProto};
use pxapi::utils::crypto::{self, DecryptionKey, EncryptionKey};
use pxapi::utils::uuid as pxuuid;
use pxapi::{PxType, decode_batch, decode_schema_bytes};

#[derive(Parser, Debug)]
#[command(name = "pxctl")]
#[command(about = "Inspect and convert result schemas, Vis specs and encrypted batches", long_about = None)]
struct Args {
    /// Configuration file (defaults to $PXCTL_CONFIG, then /etc/pxapi/pxctl.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured output format
    #[arg(short, long, global = true)]
    output: Option<Format>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Format {
    Json,
    Pretty,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => OutputFormat::Json,
            Format::Pretty => OutputFormat::Pretty,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every registered PXType
    Types,
    /// Decode a binary schema message and print its columns
    Schema { file: PathBuf },
    /// Decode a binary row batch against a binary schema
    Batch { schema: PathBuf, batch: PathBuf },
    #[command(subcommand)]
    Vis(VisCommand),
    #[command(subcommand)]
    Uuid(UuidCommand),
    #[command(subcommand)]
    Crypto(CryptoCommand),
}

#[derive(Subcommand, Debug)]
enum VisCommand {
    /// Parse and validate a Vis JSON document
    Check { file: PathBuf },
    /// Convert a Vis JSON document to protobuf
    Encode {
        input: PathBuf,
        #[arg(value_name = "OUT")]
        out: PathBuf,
    },
    /// Convert a protobuf Vis to JSON
    Decode { input: PathBuf },
}

#[derive(Subcommand, Debug)]
enum UuidCommand {
    /// Split a UUID into its protobuf halves
    ToProto { uuid: String },
    /// Join protobuf halves back into a UUID
    FromProto { high: u64, low: u64 },
}

#[derive(Subcommand, Debug)]
enum CryptoCommand {
    /// Encrypt a file into a compact JWE
    Encrypt {
        input: PathBuf,
        /// Public JWK or PEM (defaults to key_file from the configuration)
        #[arg(short, long)]
        key: Option<PathBuf>,
    },
    /// Decrypt a compact JWE
    Decrypt {
        input: PathBuf,
        /// Private JWK or PEM (defaults to key_file from the configuration)
        #[arg(short, long)]
        key: Option<PathBuf>,
        /// Write the plaintext here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate a private key and print it as a JWK
    Keygen {
        /// RSA modulus size
        #[arg(long, default_value_t = 2048)]
        bits: usize,
        /// Generate a 256-bit direct key instead of RSA
        #[arg(long)]
        direct: bool,
        /// Print PKCS#8 PEM instead of JWK (RSA only)
        #[arg(long)]
        pem: bool,
    },
    /// Print the public JWK matching a private key
    Public { key: PathBuf },
}

fn read(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn key_path<'a>(flag: Option<&'a Path>, config: &'a ToolConfig) -> Result<&'a Path> {
    match flag.or(config.key_file.as_deref()) {
        Some(path) => Ok(path),
        None => bail!("no key given: pass --key or set key_file in the configuration"),
    }
}

#[allow(clippy::print_stdout)]
fn emit<T: serde::Serialize>(format: OutputFormat, value: &T, pretty: impl FnOnce()) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(value)?),
        OutputFormat::Pretty => pretty(),
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn run_types(format: OutputFormat) -> Result<()> {
    let rows: Vec<serde_json::Value> = PxType::ALL
        .iter()
        .map(|t| {
            serde_json::json!({
                "tag": t.tag(),
                "name": t.name(),
                "wire": t.wire_primitive().map(|p| p.as_str()),
                "semantic": t.semantic().map(|s| s.as_str()),
            })
        })
        .collect();
    emit(format, &rows, || {
        for t in PxType::ALL {
            let wire = t.wire_primitive().map_or("-", |p| p.as_str());
            let semantic = t.semantic().map_or("-", |s| s.as_str());
            println!("{:>5}  {:<16} {:<8} {}", t.tag(), t.name(), wire, semantic);
        }
    })
}

#[allow(clippy::print_stdout)]
fn run_schema(file: &Path, format: OutputFormat) -> Result<()> {
    let schema = decode_schema_bytes(&read(file)?)
        .with_context(|| format!("decoding schema {}", file.display()))?;
    let columns: Vec<serde_json::Value> = schema
        .columns()
        .iter()
        .map(|c| {
            serde_json::json!({
                "name": c.name(),
                "type": c.px_type(),
                "nullable": c.is_nullable(),
                "description": c.description(),
            })
        })
        .collect();
    let doc = serde_json::json!({ "table": schema.table_name(), "columns": columns });
    emit(format, &doc, || {
        println!("table {}", schema.table_name());
        for (i, c) in schema.columns().iter().enumerate() {
            let nullable = if c.is_nullable() { " nullable" } else { "" };
            println!("  {i:>3} {:<24} {}{nullable}", c.name(), c.px_type());
        }
    })
}

#[allow(clippy::print_stdout)]
fn run_batch(schema: &Path, batch: &Path, format: OutputFormat) -> Result<()> {
    let schema = Arc::new(
        decode_schema_bytes(&read(schema)?)
            .with_context(|| format!("decoding schema {}", schema.display()))?,
    );
    let message = RowBatchData::decode(read(batch)?.as_slice())
        .with_context(|| format!("decoding batch {}", batch.display()))?;
    let rows = decode_batch(&schema, &message)?;
    emit(format, &rows, || {
        for row in &rows {
            let cells: Vec<String> = row
                .datums()
                .iter()
                .map(|d| d.value().to_string())
                .collect();
            println!("{}", cells.join("\t"));
        }
    })
}

#[allow(clippy::print_stdout)]
fn run_vis(command: VisCommand, config: &ToolConfig, format: OutputFormat) -> Result<()> {
    let codec = config.vis_codec();
    match command {
        VisCommand::Check { file } => {
            let vis = codec.from_json(&read_text(&file)?)?;
            let problems = pxapi::vis::validate_all(&vis);
            if !problems.is_empty() {
                for problem in &problems {
                    println!("{problem}");
                }
                bail!("{} has {} problems", file.display(), problems.len());
            }
            println!(
                "{}: ok ({} variables, {} widgets, {} global funcs)",
                file.display(),
                vis.variables.len(),
                vis.widgets.len(),
                vis.global_funcs.len()
            );
        }
        VisCommand::Encode { input, out } => {
            let vis = codec.from_json(&read_text(&input)?)?;
            let bytes = codec.encode(&vis)?;
            std::fs::write(&out, &bytes).with_context(|| format!("writing {}", out.display()))?;
            info!("wrote {} bytes to {}", bytes.len(), out.display());
        }
        VisCommand::Decode { input } => {
            let vis = codec.decode(&read(&input)?)?;
            let json = match format {
                OutputFormat::Json => codec.to_json(&vis)?,
                OutputFormat::Pretty => codec.to_json_pretty(&vis)?,
            };
            println!("{json}");
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn run_uuid(command: UuidCommand, format: OutputFormat) -> Result<()> {
    match command {
        UuidCommand::ToProto { uuid } => {
            let proto = pxuuid::proto_from_str(&uuid)?;
            let doc = serde_json::json!({ "highBits": proto.high_bits, "lowBits": proto.low_bits });
            emit(format, &doc, || {
                println!("high_bits: {}\nlow_bits:  {}", proto.high_bits, proto.low_bits);
            })
        }
        UuidCommand::FromProto { high, low } => {
            let proto = UuidProto {
                data: Vec::new(),
                high_bits: high,
                low_bits: low,
            };
            let text = pxuuid::proto_to_string(&proto)?;
            emit(format, &text, || println!("{text}"))
        }
    }
}

#[allow(clippy::print_stdout)]
fn run_crypto(command: CryptoCommand, config: &ToolConfig) -> Result<()> {
    match command {
        CryptoCommand::Encrypt { input, key } => {
            let path = key_path(key.as_deref(), config)?;
            let key = EncryptionKey::parse(&read_text(path)?)
                .with_context(|| format!("loading key {}", path.display()))?;
            println!("{}", crypto::encrypt(&read(&input)?, &key)?);
        }
        CryptoCommand::Decrypt { input, key, out } => {
            let path = key_path(key.as_deref(), config)?;
            let key = DecryptionKey::parse(&read_text(path)?)
                .with_context(|| format!("loading key {}", path.display()))?;
            let plaintext = crypto::decrypt(&read_text(&input)?, &key)?;
            match out {
                Some(out) => std::fs::write(&out, &plaintext)
                    .with_context(|| format!("writing {}", out.display()))?,
                None => println!("{}", String::from_utf8_lossy(&plaintext)),
            }
        }
        CryptoCommand::Keygen { bits, direct, pem } => {
            let key = if direct {
                DecryptionKey::generate_direct()
            } else {
                debug!("generating {bits}-bit RSA key");
                DecryptionKey::generate_rsa(bits)?
            };
            let text = if pem { key.to_pem()? } else { key.to_jwk_json()? };
            println!("{text}");
        }
        CryptoCommand::Public { key } => {
            let private = DecryptionKey::parse(&read_text(&key)?)
                .with_context(|| format!("loading key {}", key.display()))?;
            println!("{}", private.public_key().to_jwk_json()?);
        }
    }
    Ok(())
}

#[allow(clippy::print_stderr)]
fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("pxctl: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let (config, source) = config::load(args.config.as_deref())?;
    px_log::init(&config.log_config()?).context("initializing logging")?;
    debug!("pxctl {} starting", env!("CARGO_PKG_VERSION"));
    match &source {
        ConfigSource::File(path) => debug!("loaded configuration from {}", path.display()),
        ConfigSource::Defaults(reason) => warn!("{reason}"),
    }

    let format = args.output.map_or(config.output, OutputFormat::from);
    match args.command {
        Command::Types => run_types(format),
        Command::Schema { file } => run_schema(&file, format),
        Command::Batch { schema, batch } => run_batch(&schema, &batch, format),
        Command::Vis(command) => run_vis(command, &config, format),
        Command::Uuid(command) => run_uuid(command, format),
        Command::Crypto(command) => run_crypto(command, &config),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("pxctl").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_command_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_top_level_commands() {
        assert!(matches!(parse(&["types"]).command, Command::Types));
        assert!(matches!(
            parse(&["schema", "s.pb"]).command,
            Command::Schema { file } if file == Path::new("s.pb")
        ));
        assert!(matches!(
            parse(&["batch", "s.pb", "b.pb"]).command,
            Command::Batch { schema, batch } if schema == Path::new("s.pb") && batch == Path::new("b.pb")
        ));
    }

    #[test]
    fn test_vis_encode_with_global_output() {
        let args = parse(&["-o", "json", "vis", "encode", "in.json", "out.pb"]);
        assert!(matches!(args.output, Some(Format::Json)));
        match args.command {
            Command::Vis(VisCommand::Encode { input, out }) => {
                assert_eq!(input, Path::new("in.json"));
                assert_eq!(out, Path::new("out.pb"));
            }
            other => panic!("unexpected command {other:?}"),
        }

        // global flags may also follow the subcommand
        let args = parse(&["vis", "encode", "in.json", "out.pb", "--output", "pretty"]);
        assert!(matches!(args.output, Some(Format::Pretty)));
        assert!(matches!(args.command, Command::Vis(VisCommand::Encode { .. })));
    }

    #[test]
    fn test_parse_vis_commands() {
        assert!(matches!(
            parse(&["vis", "check", "v.json"]).command,
            Command::Vis(VisCommand::Check { .. })
        ));
        assert!(matches!(
            parse(&["-c", "cfg.yaml", "vis", "decode", "v.pb"]).command,
            Command::Vis(VisCommand::Decode { .. })
        ));
        assert!(Args::try_parse_from(["pxctl", "vis", "encode", "only-input.json"]).is_err());
    }

    #[test]
    fn test_parse_uuid_commands() {
        assert!(matches!(
            parse(&["uuid", "to-proto", "123e4567-e89b-12d3-a456-426614174000"]).command,
            Command::Uuid(UuidCommand::ToProto { .. })
        ));
        assert!(matches!(
            parse(&["uuid", "from-proto", "1", "2"]).command,
            Command::Uuid(UuidCommand::FromProto { high: 1, low: 2 })
        ));
        assert!(Args::try_parse_from(["pxctl", "uuid", "from-proto", "1", "-2"]).is_err());
    }

    #[test]
    fn test_parse_crypto_commands() {
        assert!(matches!(
            parse(&["crypto", "encrypt", "in.bin", "-k", "pub.jwk"]).command,
            Command::Crypto(CryptoCommand::Encrypt { key: Some(_), .. })
        ));
        assert!(matches!(
            parse(&["crypto", "decrypt", "in.jwe", "--out", "plain.bin"]).command,
            Command::Crypto(CryptoCommand::Decrypt { key: None, out: Some(_), .. })
        ));
        assert!(matches!(
            parse(&["crypto", "keygen"]).command,
            Command::Crypto(CryptoCommand::Keygen { bits: 2048, direct: false, pem: false })
        ));
        assert!(matches!(
            parse(&["crypto", "keygen", "--direct"]).command,
            Command::Crypto(CryptoCommand::Keygen { direct: true, .. })
        ));
        assert!(matches!(
            parse(&["crypto", "public", "priv.jwk"]).command,
            Command::Crypto(CryptoCommand::Public { .. })
        ));
    }

    #[test]
    fn test_vis_encode_writes_protobuf() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("vis.json");
        let out = dir.path().join("vis.pb");
        std::fs::write(
            &input,
            r#"{"widgets":[{"name":"w","func":{"name":"f"}}]}"#,
        )
        .unwrap();

        let command = VisCommand::Encode {
            input,
            out: out.clone(),
        };
        run_vis(command, &ToolConfig::default(), OutputFormat::Json).unwrap();

        let vis = pxapi::Vis::decode(std::fs::read(&out).unwrap().as_slice()).unwrap();
        assert_eq!(vis.widgets[0].name, "w");
    }
}
