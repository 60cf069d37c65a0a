//! Decrypt command implementation.

use super::is_envelope;
use crate::utils::{password, read_text};
use oxinote_container::envelope::{self, Secret};
use oxinote_container::{CipherTag, dispatch};
use std::path::Path;

/// Options for decrypting a note.
pub struct DecryptOptions<'a> {
    pub input: Option<&'a Path>,
    pub cipher: Option<&'a str>,
    pub key_length: Option<usize>,
    pub password: Option<String>,
}

pub fn cmd_decrypt(options: &DecryptOptions) -> Result<(), Box<dyn std::error::Error>> {
    let note = read_text(options.input)?;
    let password = password(options.password.clone(), false)?;

    let text = if is_envelope(&note) {
        envelope::decrypt(&Secret::from(password.as_str()), &note)?
    } else {
        let tag = match options.cipher {
            Some(name) => CipherTag::from_name(name)?,
            None => CipherTag::sniff(&note),
        };
        dispatch::decrypt_tagged(tag, options.key_length, &password, &note)?
    };

    println!("{}", text);
    Ok(())
}
