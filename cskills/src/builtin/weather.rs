//! `get_weather`: current conditions and a short forecast from wttr.in.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};

use crate::{
    SkillArgs, SkillConfigSource, SkillContext, SkillDefinition, SkillError, SkillFuture,
    SkillHandler, SkillOutput,
};

pub const NAME: &str = "get_weather";
pub const CONFIG_SECTION: &str = "weather";
pub const DEFAULT_ZIP_KEY: &str = "default_zip_code";
pub const CONFIG_COMMAND: &str = "celadon config --set-weather-zip <zip>";
pub const DEFAULT_BASE_URL: &str = "https://wttr.in";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const ZIP_HINT: &str = "Please provide a valid 5-digit US zip code";

pub fn definition() -> SkillDefinition {
    SkillDefinition::new(
        NAME,
        "Get current weather and forecast for a location. Uses default zip code if not specified. User can provide zip code in the prompt to override default.",
        json!({
            "type": "object",
            "properties": {
                "zip_code": {
                    "type": ["string", "integer"],
                    "description": "Optional zip code (5 digits). If not provided, uses default zip code from configuration. User can specify zip code in their message to override default."
                },
                "days": {
                    "type": "integer",
                    "description": "Number of days for forecast (1-3, default: 1 for current weather)"
                }
            },
            "required": []
        }),
    )
}

pub struct WeatherSkill {
    client: reqwest::Client,
    config: Arc<dyn SkillConfigSource>,
    base_url: String,
}

impl WeatherSkill {
    pub fn new(config: Arc<dyn SkillConfigSource>) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: Arc<dyn SkillConfigSource>) -> Self {
        Self {
            client,
            config,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn fetch(&self, zip_code: &str, days: u8) -> Result<SkillOutput, SkillError> {
        let url = forecast_url(&self.base_url, zip_code, days);
        let response = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|err| {
                SkillError::network("Failed to connect to weather service")
                    .with_hint("Please check your internet connection and try again.")
                    .with_context("error", err.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SkillError::upstream(format!(
                "Weather API returned error (status {})",
                status.as_u16()
            ))
            .with_hint("The weather service may be temporarily unavailable. Please try again later.")
            .with_context("status_code", status.as_u16())
            .with_context("response", body));
        }

        let mut report = response.json::<Value>().await.map_err(|err| {
            SkillError::upstream("Failed to parse weather API response")
                .with_hint("The weather service returned invalid data. Please try again.")
                .with_context("error", err.to_string())
        })?;

        let Some(fields) = report.as_object_mut() else {
            return Err(SkillError::upstream("Failed to parse weather API response")
                .with_hint("The weather service returned invalid data. Please try again.")
                .with_context("error", "expected a JSON object"));
        };
        fields.insert("zip_code".to_string(), Value::String(zip_code.to_string()));
        fields.insert("requested_days".to_string(), Value::from(days));

        Ok(SkillOutput::Json(report))
    }
}

impl std::fmt::Debug for WeatherSkill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherSkill")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl SkillHandler for WeatherSkill {
    fn call<'a>(
        &'a self,
        args: SkillArgs,
        _context: &'a SkillContext,
    ) -> SkillFuture<'a, Result<SkillOutput, SkillError>> {
        Box::pin(async move {
            let zip_code = resolve_zip_code(&args, self.config.as_ref())?;
            validate_zip_code(&zip_code)?;
            let days = forecast_days(&args);
            self.fetch(&zip_code, days).await
        })
    }
}

/// Argument first (string or number), then the configured default.
///
/// An unreadable config section is treated as empty.
pub fn resolve_zip_code(
    args: &SkillArgs,
    config: &dyn SkillConfigSource,
) -> Result<String, SkillError> {
    match args.get("zip_code") {
        Some(Value::String(zip)) if !zip.is_empty() => return Ok(zip.clone()),
        Some(Value::Number(number)) => {
            if let Some(zip) = number.as_f64() {
                return Ok(format!("{zip:.0}"));
            }
        }
        _ => {}
    }

    config
        .section(CONFIG_SECTION)
        .ok()
        .and_then(|section| section.get(DEFAULT_ZIP_KEY).map(ToString::to_string))
        .ok_or_else(|| SkillError::missing_setting(NAME, "zip_code", CONFIG_COMMAND))
}

pub fn validate_zip_code(zip_code: &str) -> Result<(), SkillError> {
    let invalid = |message: &str| {
        SkillError::invalid_arguments(message)
            .with_hint(ZIP_HINT)
            .with_context("field", "zip_code")
            .with_context("provided", zip_code)
    };

    if zip_code.chars().count() != 5 {
        return Err(invalid("Zip code must be exactly 5 digits"));
    }
    if !zip_code.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("Zip code must contain only digits"));
    }
    Ok(())
}

/// Defaults to 1; clamped to 1..=3.
pub fn forecast_days(args: &SkillArgs) -> u8 {
    args.optional_i64("days")
        .map(|days| days.clamp(1, 3) as u8)
        .unwrap_or(1)
}

pub fn forecast_url(base_url: &str, zip_code: &str, days: u8) -> String {
    if days > 1 {
        format!("{base_url}/{zip_code}?format=j1&days={days}")
    } else {
        format!("{base_url}/{zip_code}?format=j1")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SkillErrorKind, StaticSkillConfig};

    #[test]
    fn argument_zip_wins_over_the_configured_default() {
        let config = StaticSkillConfig::new().with_value(CONFIG_SECTION, DEFAULT_ZIP_KEY, "10001");

        let from_args = resolve_zip_code(&SkillArgs::new().with("zip_code", "94103"), &config)
            .expect("argument zip");
        assert_eq!(from_args, "94103");

        let numeric = resolve_zip_code(&SkillArgs::new().with("zip_code", 2139), &config)
            .expect("numeric zip");
        assert_eq!(numeric, "2139");

        let fallback = resolve_zip_code(&SkillArgs::new().with("zip_code", ""), &config)
            .expect("default zip");
        assert_eq!(fallback, "10001");
    }

    #[test]
    fn missing_zip_everywhere_is_a_configuration_error() {
        let error = resolve_zip_code(&SkillArgs::new(), &StaticSkillConfig::new())
            .expect_err("no zip anywhere");

        assert_eq!(error.kind, SkillErrorKind::Configuration);
        let payload = error.to_model_payload();
        assert_eq!(payload["error_type"], "config_error");
        assert_eq!(payload["config_command"], CONFIG_COMMAND);
        assert_eq!(payload["field"], "zip_code");
    }

    #[test]
    fn zip_codes_must_be_five_ascii_digits() {
        assert!(validate_zip_code("94103").is_ok());
        assert_eq!(
            validate_zip_code("2139").expect_err("short").message,
            "Zip code must be exactly 5 digits"
        );
        assert_eq!(
            validate_zip_code("9410a").expect_err("letters").message,
            "Zip code must contain only digits"
        );
    }

    #[test]
    fn days_are_clamped_and_shape_the_url() {
        assert_eq!(forecast_days(&SkillArgs::new()), 1);
        assert_eq!(forecast_days(&SkillArgs::new().with("days", 7)), 3);
        assert_eq!(forecast_days(&SkillArgs::new().with("days", -2)), 1);

        assert_eq!(
            forecast_url(DEFAULT_BASE_URL, "94103", 1),
            "https://wttr.in/94103?format=j1"
        );
        assert_eq!(
            forecast_url(DEFAULT_BASE_URL, "94103", 3),
            "https://wttr.in/94103?format=j1&days=3"
        );
    }

    #[tokio::test]
    async fn handler_reports_missing_zip_before_any_request() {
        let skill = WeatherSkill::new(Arc::new(StaticSkillConfig::new()))
            .with_base_url("http://127.0.0.1:9");

        let error = skill
            .call(SkillArgs::new(), &SkillContext::new("session-1"))
            .await
            .expect_err("missing zip");
        assert_eq!(error.kind, SkillErrorKind::Configuration);
    }
}
