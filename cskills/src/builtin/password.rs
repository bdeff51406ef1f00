use rand::Rng;
use serde_json::{Value, json};

use crate::{SkillArgs, SkillDefinition, SkillError, SkillOutput};

pub const NAME: &str = "generate_password";

const DEFAULT_LENGTH: i64 = 16;
const MIN_LENGTH: i64 = 8;
const MAX_LENGTH: i64 = 128;

const LETTERS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

pub fn definition() -> SkillDefinition {
    SkillDefinition::new(
        NAME,
        "Generate a secure random password",
        json!({
            "type": "object",
            "properties": {
                "length": {"type": "number", "description": "Password length (8-128, default 16)"},
                "include_symbols": {"type": "boolean", "description": "Include symbols (default true)"},
                "include_numbers": {"type": "boolean", "description": "Include digits (default true)"}
            }
        }),
    )
}

pub fn generate(args: &SkillArgs) -> Result<SkillOutput, SkillError> {
    let length = args
        .optional_i64("length")
        .unwrap_or(DEFAULT_LENGTH)
        .clamp(MIN_LENGTH, MAX_LENGTH) as usize;
    let include_symbols = flag(args, "include_symbols");
    let include_numbers = flag(args, "include_numbers");

    let mut charset = String::from(LETTERS);
    if include_numbers {
        charset.push_str(DIGITS);
    }
    if include_symbols {
        charset.push_str(SYMBOLS);
    }
    let charset = charset.as_bytes();

    let mut rng = rand::thread_rng();
    let password = (0..length)
        .map(|_| charset[rng.gen_range(0..charset.len())] as char)
        .collect::<String>();

    Ok(SkillOutput::Json(json!({
        "password": password,
        "length": length,
        "include_symbols": include_symbols,
        "include_numbers": include_numbers,
    })))
}

fn flag(args: &SkillArgs, key: &str) -> bool {
    args.get(key).and_then(Value::as_bool).unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn password(args: SkillArgs) -> String {
        let SkillOutput::Json(value) = generate(&args).expect("password") else {
            panic!("password output should be JSON");
        };
        value["password"].as_str().expect("password string").to_string()
    }

    #[test]
    fn length_defaults_and_clamps() {
        assert_eq!(password(SkillArgs::new()).len(), 16);
        assert_eq!(password(SkillArgs::new().with("length", 3)).len(), 8);
        assert_eq!(password(SkillArgs::new().with("length", 500)).len(), 128);
        assert_eq!(password(SkillArgs::new().with("length", 24)).len(), 24);
    }

    #[test]
    fn disabled_classes_never_appear() {
        let letters_only = password(
            SkillArgs::new()
                .with("length", 128)
                .with("include_symbols", false)
                .with("include_numbers", false),
        );
        assert!(letters_only.chars().all(|c| c.is_ascii_alphabetic()), "{letters_only}");
    }
}
