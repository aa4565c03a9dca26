use crate::config::{VerifyConfig, DEFAULT_MAX_LENGTH};
use crate::error::ItemIdError;
use crate::layout::{parse_item_id, IdBody};
use crate::selector::{decode_identifier, encode_identifier};
use crate::source::{collect_identifiers, LineSource};
use crate::transforms::framing;
use crate::verify::verify_batch;
use clap::{Parser, Subcommand};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(author, version, about, long_about = "Encode, decode and verify compressed item identifiers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encodes a raw payload file as a base64 identifier
    Encode {
        /// File holding the raw payload bytes
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },
    /// Decodes a base64 identifier to its payload
    Decode {
        /// Base64 identifier
        id: String,

        /// Write the payload here instead of printing it as hex
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Maximum decompressed payload length
        #[arg(long, default_value_t = DEFAULT_MAX_LENGTH)]
        max_length: usize,
    },
    /// Prints the fields of a base64 identifier
    Inspect {
        /// Base64 identifier
        id: String,

        /// Maximum decompressed payload length
        #[arg(long, default_value_t = DEFAULT_MAX_LENGTH)]
        max_length: usize,
    },
    /// Checks that every identifier in a file round-trips through the codec
    Verify {
        /// File with one base64 identifier per line
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Number of threads to use (default: all available cores)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Maximum decompressed payload length
        #[arg(long, default_value_t = DEFAULT_MAX_LENGTH)]
        max_length: usize,

        /// Hide the progress bar and per-identifier output
        #[arg(short, long)]
        quiet: bool,
    },
}

pub fn run() -> Result<(), ItemIdError> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Encode { input } => {
            let payload = fs::read(input)?;
            let encoded = encode_identifier(&payload);

            println!("Tag:        {}", encoded.tag);
            println!("Payload:    {} bytes", payload.len());
            println!("Stored:     {} bytes", encoded.len());
            println!("{}", framing::encode(&encoded.bytes));
        }
        Commands::Decode { id, output, max_length } => {
            let bytes = framing::decode(id)?;
            let decoded = decode_identifier(&bytes, *max_length)?;

            println!("Tag:        {}", decoded.tag);
            println!("Payload:    {} bytes", decoded.payload.len());
            match output {
                Some(path) => {
                    fs::write(path, &decoded.payload)?;
                    println!("Written to {}", path.display());
                }
                None => println!("{}", hex(&decoded.payload)),
            }
        }
        Commands::Inspect { id, max_length } => {
            let parsed = parse_item_id(id, *max_length)?;
            let layout = &parsed.layout;

            println!("Compression:      {}", parsed.compression);
            println!("Storage Type:     {}", layout.storage_type);
            match &layout.body {
                IdBody::Mailbox { moniker, instruction, store_id } => {
                    match layout.moniker_str() {
                        Some(text) => println!("Moniker:          {}", text),
                        None => println!("Moniker:          {}", hex(moniker)),
                    }
                    println!("Instruction:      {:?}", instruction);
                    println!("Store Id:         {}", hex(store_id));
                }
                IdBody::Store { store_id } => {
                    println!("Store Id:         {}", hex(store_id));
                }
                IdBody::PublicFolderItem { instruction, store_id, folder_id } => {
                    println!("Instruction:      {:?}", instruction);
                    println!("Store Id:         {}", hex(store_id));
                    println!("Folder Id:        {}", hex(folder_id));
                }
            }
            for (i, attachment) in layout.attachment_ids.iter().enumerate() {
                println!("Attachment {:<5} {}", i, hex(attachment));
            }
        }
        Commands::Verify { input, threads, max_length, quiet } => {
            println!("Verifying identifiers from {}...", input.display());
            let config = VerifyConfig {
                max_length: *max_length,
                threads: threads.unwrap_or_else(num_cpus::get),
                show_progress: !*quiet,
            };

            let mut source = LineSource::new(BufReader::new(File::open(input)?));
            let ids = collect_identifiers(&mut source)?;

            let start = Instant::now();
            let (stats, reports) = verify_batch(&ids, &config, |_| {})?;
            let duration = start.elapsed();

            if !*quiet {
                for report in reports.iter().filter(|r| !r.passed()) {
                    let reason = match &report.outcome {
                        Ok(verdict) => verdict.describe(),
                        Err(e) => e.to_string(),
                    };
                    println!("  #{:<6} {}  {}", report.index, report.id, reason);
                }
            }

            println!("  Identifiers:      {}", stats.total);
            println!("  Passed:           {}", stats.passed);
            println!("  Failed:           {}", stats.failed);
            println!("  Rejected:         {}", stats.rejected);
            println!("  Compressed:       {}", stats.compressed);
            println!("  Uncompressed:     {}", stats.uncompressed);
            println!("  Elapsed Time:     {:.2?}", duration);

            if !stats.all_passed() {
                return Err(ItemIdError::VerificationFailed(format!(
                    "{} of {} identifiers did not round-trip",
                    stats.total - stats.passed,
                    stats.total
                )));
            }
        }
    }

    Ok(())
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
