//! Inspect command implementation.

use super::is_envelope;
use crate::utils::read_text;
use oxinote_container::envelope::{Field, Params};
use oxinote_container::{CipherTag, inspect};
use oxinote_core::codec::hex;
use std::path::Path;

pub fn cmd_inspect(
    input: Option<&Path>,
    cipher: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let note = read_text(input)?;

    if is_envelope(&note) {
        return inspect_envelope(&Params::decode(&note)?, json);
    }

    let tag = cipher.map(CipherTag::from_name).transpose()?;
    let report = inspect(tag, &note)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Format: {}", report.format);
    println!("Size: {} bytes", report.size);
    if let Some(salt) = &report.salt {
        println!("Salt: {}", salt);
    }
    if let Some(hmac_salt) = &report.hmac_salt {
        println!("HMAC salt: {}", hmac_salt);
    }
    if let Some(iv) = &report.iv {
        println!("IV: {}", iv);
    }
    if let Some(iterations) = report.iterations {
        println!("PBKDF2 iterations: {}", iterations);
    }
    println!("Payload: {} bytes", report.payload);

    Ok(())
}

fn inspect_envelope(params: &Params, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let bits = |b: &Option<oxinote_core::BitArray>| b.as_ref().map(hex::from_bits);
    let extra: serde_json::Map<String, serde_json::Value> = params
        .extra
        .iter()
        .map(|(name, field)| {
            let value = match field {
                Field::Number(n) => serde_json::Value::from(*n),
                Field::Text(t) => serde_json::Value::from(t.as_str()),
            };
            (name.clone(), value)
        })
        .collect();
    let report = serde_json::json!({
        "format": "envelope",
        "v": params.v,
        "cipher": params.cipher,
        "mode": params.mode,
        "iter": params.iter,
        "ks": params.ks,
        "ts": params.ts,
        "adata": params.adata,
        "iv": bits(&params.iv),
        "salt": bits(&params.salt),
        "ct_bits": params.ct.as_ref().map(|ct| ct.bit_length()),
        "extra": extra,
    });

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Format: envelope");
    if let serde_json::Value::Object(fields) = &report {
        for (name, value) in fields {
            if name == "format" || value.is_null() {
                continue;
            }
            println!("{}: {}", name, value);
        }
    }
    Ok(())
}
