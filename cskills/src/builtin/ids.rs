use serde_json::json;
use uuid::Uuid;

use crate::{SkillDefinition, SkillError, SkillOutput};

pub const NAME: &str = "generate_uuid";

pub fn definition() -> SkillDefinition {
    SkillDefinition::without_parameters(NAME, "Generate a random UUID (v4)")
}

pub fn generate() -> Result<SkillOutput, SkillError> {
    Ok(SkillOutput::Json(json!({ "uuid": Uuid::new_v4().to_string() })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_distinct_v4_uuids() {
        let first = generate().expect("uuid");
        let second = generate().expect("uuid");
        assert_ne!(first, second);

        let SkillOutput::Json(value) = first else {
            panic!("uuid output should be JSON");
        };
        let parsed = Uuid::parse_str(value["uuid"].as_str().expect("uuid string")).expect("parse");
        assert_eq!(parsed.get_version_num(), 4);
    }
}
