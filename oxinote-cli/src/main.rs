//! OxiNote CLI - encrypted notes from the command line
//!
//! Decrypts and creates `ENC0`, legacy RC2 and JSON envelope notes, and
//! exposes the underlying hashes and key derivation.

mod commands;
mod utils;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use commands::{
    DecryptOptions, EncryptOptions, HashAlgorithm, ModeArg, NoteFormat, cmd_decrypt, cmd_derive,
    cmd_encrypt, cmd_hash, cmd_inspect,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "oxinote")]
#[command(author, version, about = "Encrypted notes - Pure Rust note cipher toolkit")]
#[command(long_about = "
OxiNote reads and writes encrypted notes.
Supported containers: ENC0 (AES), legacy RC2, JSON envelopes (CCM, OCB2, GCM)

The password is read from OXINOTE_PASSWORD when set, otherwise prompted.

Examples:
  oxinote decrypt note.txt
  oxinote decrypt --cipher RC2 old-note.txt
  oxinote encrypt --format envelope --mode gcm plain.txt
  oxinote inspect --json note.txt
  oxinote hash --algorithm sha512 file.bin
  oxinote derive --salt 0001020304050607 --iterations 50000
  oxinote completions bash
")]
struct Cli {
    /// Log container and key-derivation details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decrypt a note
    #[command(alias = "d")]
    Decrypt {
        /// Note file (stdin if omitted or "-")
        input: Option<PathBuf>,

        /// Cipher tag stored with the note (AES or RC2); sniffed if omitted
        #[arg(short, long)]
        cipher: Option<String>,

        /// Key length stored with the note
        #[arg(short, long)]
        key_length: Option<usize>,

        /// Password
        #[arg(long, env = "OXINOTE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Encrypt text into a note
    #[command(alias = "e")]
    Encrypt {
        /// Plaintext file (stdin if omitted or "-")
        input: Option<PathBuf>,

        /// Container format
        #[arg(short, long, value_enum, default_value = "current")]
        format: NoteFormat,

        /// Envelope chaining mode
        #[arg(short, long, value_enum)]
        mode: Option<ModeArg>,

        /// Envelope PBKDF2 iterations
        #[arg(long)]
        iter: Option<u32>,

        /// Envelope key size in bits
        #[arg(long)]
        ks: Option<usize>,

        /// Envelope tag size in bits
        #[arg(long)]
        ts: Option<usize>,

        /// Envelope associated data
        #[arg(long)]
        adata: Option<String>,

        /// Password
        #[arg(long, env = "OXINOTE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Show a note's framing without decrypting it
    #[command(alias = "i")]
    Inspect {
        /// Note file (stdin if omitted or "-")
        input: Option<PathBuf>,

        /// Cipher tag stored with the note; sniffed if omitted
        #[arg(short, long)]
        cipher: Option<String>,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Hash a file
    Hash {
        /// Input file (stdin if omitted or "-")
        input: Option<PathBuf>,

        /// Digest algorithm
        #[arg(short, long, value_enum, default_value = "sha256")]
        algorithm: HashAlgorithm,
    },

    /// Derive a key with PBKDF2-HMAC-SHA256
    Derive {
        /// Salt as hex
        #[arg(short, long, default_value = "")]
        salt: String,

        /// Iteration count
        #[arg(short, long, default_value_t = 50_000)]
        iterations: u32,

        /// Key length in bits
        #[arg(short, long, default_value_t = 256)]
        length: usize,

        /// Show a progress bar
        #[arg(short, long)]
        progress: bool,

        /// Password
        #[arg(long, env = "OXINOTE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Print a shell completion script
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Decrypt {
            input,
            cipher,
            key_length,
            password,
        } => cmd_decrypt(&DecryptOptions {
            input: input.as_deref(),
            cipher: cipher.as_deref(),
            key_length,
            password,
        }),
        Commands::Encrypt {
            input,
            format,
            mode,
            iter,
            ks,
            ts,
            adata,
            password,
        } => cmd_encrypt(&EncryptOptions {
            input: input.as_deref(),
            format,
            mode,
            iter,
            ks,
            ts,
            adata,
            password,
        }),
        Commands::Inspect {
            input,
            cipher,
            json,
        } => cmd_inspect(input.as_deref(), cipher.as_deref(), json),
        Commands::Hash { input, algorithm } => cmd_hash(input.as_deref(), algorithm),
        Commands::Derive {
            salt,
            iterations,
            length,
            progress,
            password,
        } => cmd_derive(&salt, iterations, length, progress, password),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "oxinote", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
