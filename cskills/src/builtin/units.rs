use serde_json::json;

use crate::{SkillArgs, SkillDefinition, SkillError, SkillOutput};

pub const NAME: &str = "convert_units";

const LENGTH_TO_METERS: &[(&str, f64)] = &[
    ("m", 1.0),
    ("km", 1000.0),
    ("cm", 0.01),
    ("mm", 0.001),
    ("ft", 0.3048),
    ("in", 0.0254),
    ("yd", 0.9144),
    ("mi", 1609.34),
];

const WEIGHT_TO_KILOGRAMS: &[(&str, f64)] = &[
    ("kg", 1.0),
    ("g", 0.001),
    ("mg", 0.000001),
    ("lb", 0.453592),
    ("oz", 0.0283495),
];

const VOLUME_TO_LITERS: &[(&str, f64)] = &[
    ("l", 1.0),
    ("liter", 1.0),
    ("ml", 0.001),
    ("gallon", 3.78541),
    ("quart", 0.946353),
    ("pint", 0.473176),
    ("cup", 0.236588),
    ("fl oz", 0.0295735),
];

const UNIT_HINT: &str = "(e.g., 'm', 'km', 'ft', 'kg', 'lb', 'celsius', 'fahrenheit')";

const FACTOR_TABLES: &[(&str, &[(&str, f64)])] = &[
    ("length", LENGTH_TO_METERS),
    ("weight", WEIGHT_TO_KILOGRAMS),
    ("volume", VOLUME_TO_LITERS),
];

pub fn definition() -> SkillDefinition {
    let unit_examples =
        "(e.g., 'm', 'km', 'ft', 'mi', 'kg', 'lb', 'celsius', 'fahrenheit', 'liter', 'gallon')";
    SkillDefinition::new(
        NAME,
        "Convert between different units of measurement (length, weight, temperature, volume)",
        json!({
            "type": "object",
            "properties": {
                "value": {"type": "number", "description": "The numeric value to convert"},
                "from_unit": {"type": "string", "description": format!("Source unit {unit_examples}")},
                "to_unit": {"type": "string", "description": format!("Target unit {unit_examples}")}
            },
            "required": ["value", "from_unit", "to_unit"]
        }),
    )
}

pub fn convert(args: &SkillArgs) -> Result<SkillOutput, SkillError> {
    let value = args
        .required_f64("value")
        .map_err(|error| error.with_hint("Please provide a numeric value to convert."))?;
    let from_unit = args
        .required_str("from_unit")
        .map_err(|error| error.with_hint(format!("Please specify the source unit {UNIT_HINT}.")))?
        .to_lowercase();
    let to_unit = args
        .required_str("to_unit")
        .map_err(|error| error.with_hint(format!("Please specify the target unit {UNIT_HINT}.")))?
        .to_lowercase();

    let (converted, category) = convert_value(value, &from_unit, &to_unit)?;
    Ok(SkillOutput::Json(json!({
        "value": converted,
        "from_value": value,
        "from_unit": from_unit,
        "to_unit": to_unit,
        "category": category,
    })))
}

fn convert_value(
    value: f64,
    from_unit: &str,
    to_unit: &str,
) -> Result<(f64, &'static str), SkillError> {
    for (category, table) in FACTOR_TABLES {
        let Some(from_factor) = factor(table, from_unit) else {
            continue;
        };
        let Some(to_factor) = factor(table, to_unit) else {
            let valid = table
                .iter()
                .map(|(unit, _)| *unit)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(SkillError::invalid_arguments(format!(
                "Invalid target unit '{to_unit}' for {category} conversion"
            ))
            .with_hint(format!("Valid {category} units: {valid}"))
            .with_context("field", "to_unit")
            .with_context("provided", to_unit)
            .with_context("category", *category));
        };
        return Ok((value * from_factor / to_factor, *category));
    }

    match (temperature_scale(from_unit), temperature_scale(to_unit)) {
        (Some(from), Some(to)) => {
            let celsius = match from {
                Scale::Celsius => value,
                Scale::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
            };
            let converted = match to {
                Scale::Celsius => celsius,
                Scale::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
            };
            Ok((converted, "temperature"))
        }
        _ => Err(SkillError::invalid_arguments(format!(
            "Unsupported unit conversion from '{from_unit}' to '{to_unit}'"
        ))
        .with_hint(
            "Please ensure both units are of the same type (length, weight, temperature, or volume).",
        )
        .with_context("from_unit", from_unit)
        .with_context("to_unit", to_unit)),
    }
}

fn factor(table: &[(&str, f64)], unit: &str) -> Option<f64> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == unit)
        .map(|(_, factor)| *factor)
}

#[derive(Clone, Copy)]
enum Scale {
    Celsius,
    Fahrenheit,
}

/// Matches by substring so "degrees fahrenheit" is accepted.
fn temperature_scale(unit: &str) -> Option<Scale> {
    if unit.contains("fahrenheit") {
        Some(Scale::Fahrenheit)
    } else if unit.contains("celsius") {
        Some(Scale::Celsius)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    fn run(value: f64, from: &str, to: &str) -> Result<Value, SkillError> {
        let args = SkillArgs::new()
            .with("value", value)
            .with("from_unit", from)
            .with("to_unit", to);
        convert(&args).map(|output| match output {
            SkillOutput::Json(value) => value,
            SkillOutput::Text(text) => Value::String(text),
        })
    }

    #[test]
    fn converts_within_each_factor_table() {
        let miles = run(5.0, "KM", "mi").expect("length");
        assert_eq!(miles["category"], "length");
        assert_eq!(miles["from_unit"], "km");
        let value = miles["value"].as_f64().expect("number");
        assert!((value - 3.10686).abs() < 1e-4);

        let pounds = run(2.0, "kg", "lb").expect("weight");
        assert!((pounds["value"].as_f64().expect("number") - 4.40925).abs() < 1e-4);

        let cups = run(1.0, "fl oz", "cup").expect("volume");
        assert_eq!(cups["category"], "volume");
    }

    #[test]
    fn converts_temperatures_both_ways() {
        let boiling = run(100.0, "celsius", "fahrenheit").expect("c to f");
        assert_eq!(boiling["value"], 212.0);
        assert_eq!(boiling["category"], "temperature");

        let freezing = run(32.0, "fahrenheit", "celsius").expect("f to c");
        assert_eq!(freezing["value"], 0.0);
    }

    #[test]
    fn mismatched_categories_are_validation_errors() {
        let error = run(1.0, "km", "kg").expect_err("length to weight");
        assert_eq!(error.message, "Invalid target unit 'kg' for length conversion");
        assert_eq!(
            error.hint.as_deref(),
            Some("Valid length units: m, km, cm, mm, ft, in, yd, mi")
        );

        let error = run(1.0, "parsec", "km").expect_err("unknown unit");
        assert_eq!(error.to_model_payload()["error_type"], "validation_error");
        assert_eq!(error.context["from_unit"], "parsec");

        let error = run(1.0, "celsius", "km").expect_err("temperature to length");
        assert_eq!(error.kind, crate::SkillErrorKind::InvalidArguments);
    }
}
