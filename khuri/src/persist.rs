//! Saving and restoring evaluators.
//!
//! State is written as RON, optionally deflated and base64 encoded. Restoring
//! accepts RON, JSON and the compressed form.

use std::io::{Read, Write};

use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

pub fn encode<T: Serialize>(value: &T) -> Result<String> {
    ron::to_string(value).map_err(|e| Error::Encode(e.to_string()))
}

pub fn encode_compressed<T: Serialize>(value: &T) -> Result<String> {
    let str = encode(value)?;
    let mut enc = flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::best());
    enc.write_all(str.as_bytes())
        .map_err(|e| Error::Encode(e.to_string()))?;
    let data = enc.finish().map_err(|e| Error::Encode(e.to_string()))?;
    Ok(base64::engine::general_purpose::URL_SAFE.encode(data))
}

pub fn decode<T: DeserializeOwned>(input: &str) -> Result<T> {
    let input = input.trim();

    if let Ok(value) = ron::from_str(input) {
        return Ok(value);
    }
    log::info!("Could not decode RON, trying JSON");
    if let Ok(value) = serde_json::from_str(input) {
        return Ok(value);
    }
    log::info!("Could not decode JSON, trying base64");

    let data = base64::engine::general_purpose::URL_SAFE
        .decode(input)
        .map_err(|e| {
            log::warn!("Could not decode base64");
            Error::Decode(e.to_string())
        })?;

    let mut dec = flate2::write::DeflateDecoder::new(Vec::new());
    dec.write_all(&data[..])
        .map_err(|e| Error::Decode(format!("could not deflate: {e}")))?;
    let data = dec
        .finish()
        .map_err(|e| Error::Decode(format!("could not deflate: {e}")))?;
    let input = String::from_utf8(data)
        .map_err(|_| Error::Decode("resulting data is not a string".to_owned()))?;
    ron::from_str(&input).map_err(|e| {
        log::warn!("Could not decode RON");
        Error::Decode(e.to_string())
    })
}

/// Write the compressed state of `value` to `writer`.
pub fn save<T: Serialize>(value: &T, mut writer: impl Write) -> Result<()> {
    let encoded = encode_compressed(value)?;
    writer
        .write_all(encoded.as_bytes())
        .map_err(|e| Error::Encode(e.to_string()))
}

/// Restore a value from a stream in any of the accepted formats.
pub fn load<T: DeserializeOwned>(mut reader: impl Read) -> Result<T> {
    let mut input = String::new();
    reader
        .read_to_string(&mut input)
        .map_err(|e| Error::Decode(e.to_string()))?;
    decode(&input)
}
