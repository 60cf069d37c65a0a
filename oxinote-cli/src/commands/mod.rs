//! Command implementations for OxiNote CLI.

pub mod decrypt;
pub mod derive;
pub mod encrypt;
pub mod hash;
pub mod inspect;

pub use decrypt::{DecryptOptions, cmd_decrypt};
pub use derive::cmd_derive;
pub use encrypt::{EncryptOptions, ModeArg, NoteFormat, cmd_encrypt};
pub use hash::{HashAlgorithm, cmd_hash};
pub use inspect::cmd_inspect;

/// Whether `text` looks like a JSON envelope rather than base64.
pub(crate) fn is_envelope(text: &str) -> bool {
    text.trim_start().starts_with('{')
}
