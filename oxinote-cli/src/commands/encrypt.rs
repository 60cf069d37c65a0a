//! Encrypt command implementation.

use crate::utils::{password, read_text};
use clap::ValueEnum;
use oxinote_container::envelope::{self, Params, Secret};
use oxinote_container::{current, legacy};
use oxinote_random::SystemRandom;
use std::path::Path;

/// Output container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum NoteFormat {
    /// ENC0 container (AES-CBC + HMAC-SHA256)
    #[default]
    Current,
    /// Legacy RC2 container
    Legacy,
    /// JSON envelope
    Envelope,
}

/// Envelope chaining mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Counter with CBC-MAC
    Ccm,
    /// Offset codebook, version 2
    Ocb2,
    /// Galois/counter mode
    Gcm,
}

impl ModeArg {
    fn name(self) -> &'static str {
        match self {
            ModeArg::Ccm => "ccm",
            ModeArg::Ocb2 => "ocb2",
            ModeArg::Gcm => "gcm",
        }
    }
}

/// Options for encrypting a note.
pub struct EncryptOptions<'a> {
    pub input: Option<&'a Path>,
    pub format: NoteFormat,
    pub mode: Option<ModeArg>,
    pub iter: Option<u32>,
    pub ks: Option<usize>,
    pub ts: Option<usize>,
    pub adata: Option<String>,
    pub password: Option<String>,
}

impl EncryptOptions<'_> {
    fn params(&self) -> Params {
        Params {
            iter: self.iter,
            ks: self.ks,
            ts: self.ts,
            mode: self.mode.map(|m| m.name().to_string()),
            adata: self.adata.clone(),
            ..Params::default()
        }
    }

    fn has_envelope_params(&self) -> bool {
        self.mode.is_some()
            || self.iter.is_some()
            || self.ks.is_some()
            || self.ts.is_some()
            || self.adata.is_some()
    }
}

pub fn cmd_encrypt(options: &EncryptOptions) -> Result<(), Box<dyn std::error::Error>> {
    if options.format != NoteFormat::Envelope && options.has_envelope_params() {
        return Err("--mode, --iter, --ks, --ts and --adata need --format envelope".into());
    }

    let text = read_text(options.input)?;
    let password = password(options.password.clone(), true)?;

    let note = match options.format {
        NoteFormat::Current => current::encrypt(&password, &text, &mut SystemRandom)?,
        NoteFormat::Legacy => {
            tracing::warn!("legacy notes use RC2 with an unsalted MD5 key");
            legacy::encrypt(&password, &text)?
        }
        NoteFormat::Envelope => envelope::encrypt(
            &Secret::from(password.as_str()),
            &text,
            &options.params(),
        )?,
    };

    println!("{}", note);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(format: NoteFormat) -> EncryptOptions<'static> {
        EncryptOptions {
            input: None,
            format,
            mode: None,
            iter: None,
            ks: None,
            ts: None,
            adata: None,
            password: Some("pw".to_string()),
        }
    }

    #[test]
    fn test_params_from_flags() {
        let mut opts = options(NoteFormat::Envelope);
        opts.mode = Some(ModeArg::Ocb2);
        opts.ks = Some(256);
        let params = opts.params();
        assert_eq!(params.mode.as_deref(), Some("ocb2"));
        assert_eq!(params.ks, Some(256));
        assert_eq!(params.iter, None);
    }

    #[test]
    fn test_envelope_flags_need_envelope_format() {
        let mut opts = options(NoteFormat::Current);
        opts.ts = Some(128);
        let err = cmd_encrypt(&opts).unwrap_err();
        assert!(err.to_string().contains("--format envelope"));
    }
}
