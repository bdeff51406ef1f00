use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;
use sha2::{Digest, Sha256, Sha512};

use crate::{SkillArgs, SkillDefinition, SkillError, SkillOutput};

pub const ENCODE_NAME: &str = "base64_encode";
pub const DECODE_NAME: &str = "base64_decode";
pub const HASH_NAME: &str = "generate_hash";

const HASH_ALGORITHMS: [&str; 3] = ["md5", "sha256", "sha512"];

pub fn encode_definition() -> SkillDefinition {
    SkillDefinition::new(
        ENCODE_NAME,
        "Encode a string to base64",
        json!({
            "type": "object",
            "properties": {"text": {"type": "string", "description": "Text to encode"}},
            "required": ["text"]
        }),
    )
}

pub fn decode_definition() -> SkillDefinition {
    SkillDefinition::new(
        DECODE_NAME,
        "Decode a base64 string",
        json!({
            "type": "object",
            "properties": {
                "encoded": {"type": "string", "description": "Base64 encoded string to decode"}
            },
            "required": ["encoded"]
        }),
    )
}

pub fn hash_definition() -> SkillDefinition {
    SkillDefinition::new(
        HASH_NAME,
        "Generate cryptographic hash (MD5, SHA256, SHA512) for a given string",
        json!({
            "type": "object",
            "properties": {
                "text": {"type": "string", "description": "Text to hash"},
                "algorithm": {
                    "type": "string",
                    "enum": HASH_ALGORITHMS,
                    "description": "Hash algorithm to use"
                }
            },
            "required": ["text", "algorithm"]
        }),
    )
}

pub fn encode(args: &SkillArgs) -> Result<SkillOutput, SkillError> {
    let text = args
        .required_str("text")
        .map_err(|error| error.with_hint("Please provide the text you want to encode."))?;

    Ok(SkillOutput::Json(json!({
        "original": text,
        "encoded": STANDARD.encode(text.as_bytes()),
    })))
}

pub fn decode(args: &SkillArgs) -> Result<SkillOutput, SkillError> {
    let encoded = args.required_str("encoded").map_err(|error| {
        error.with_hint("Please provide the base64 encoded string you want to decode.")
    })?;

    let bytes = STANDARD.decode(encoded).map_err(|err| {
        SkillError::invalid_arguments("Invalid base64 string")
            .with_hint("The provided string is not valid base64 encoded data.")
            .with_context("field", "encoded")
            .with_context("error", err.to_string())
    })?;

    Ok(SkillOutput::Json(json!({
        "encoded": encoded,
        "decoded": String::from_utf8_lossy(&bytes),
    })))
}

pub fn hash(args: &SkillArgs) -> Result<SkillOutput, SkillError> {
    let text = args
        .required_str("text")
        .map_err(|error| error.with_hint("Please provide the text you want to hash."))?;
    let algorithm = args
        .required_str("algorithm")
        .map_err(|error| {
            error.with_hint("Please specify a hash algorithm: 'md5', 'sha256', or 'sha512'.")
        })?
        .to_lowercase();

    let digest = match algorithm.as_str() {
        "md5" => format!("{:x}", md5::compute(text.as_bytes())),
        "sha256" => hex::encode(Sha256::digest(text.as_bytes())),
        "sha512" => hex::encode(Sha512::digest(text.as_bytes())),
        _ => {
            return Err(SkillError::invalid_arguments(format!(
                "Unsupported algorithm '{algorithm}'"
            ))
            .with_hint("Please use one of: 'md5', 'sha256', or 'sha512'.")
            .with_context("field", "algorithm")
            .with_context("provided", algorithm.as_str())
            .with_context("supported", HASH_ALGORITHMS.to_vec()));
        }
    };

    Ok(SkillOutput::Json(json!({
        "text": text,
        "algorithm": algorithm,
        "hash": digest,
    })))
}
