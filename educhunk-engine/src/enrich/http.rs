use super::{Enricher, EnrichmentContext, EnrichmentError};
use crate::config::EnrichmentConfig;
use educhunk_core::EnrichmentResult;
use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Serialize)]
struct EnrichmentRequest<'a> {
    text: &'a str,
    subject: Option<&'a str>,
    grade: Option<u8>,
}

/// Enricher backed by a JSON-over-HTTP service
#[derive(Debug, Clone)]
pub struct HttpEnricher {
    client: Client,
    endpoint: String,
    token: Option<String>,
    max_retries: u32,
}

impl HttpEnricher {
    /// Create a client for the configured endpoint
    ///
    /// The bearer token, if any, is read from the environment once here.
    pub fn new(config: &EnrichmentConfig) -> Result<Self, EnrichmentError> {
        let endpoint = config
            .endpoint
            .clone()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| EnrichmentError::Configuration("endpoint is not set".into()))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("educhunk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EnrichmentError::Configuration(e.to_string()))?;

        let token = config
            .token_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|t| !t.trim().is_empty());

        Ok(Self {
            client,
            endpoint,
            token,
            max_retries: config.max_retries,
        })
    }

    /// Endpoint the client posts to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn attempt(&self, request: &EnrichmentRequest<'_>) -> Result<EnrichmentResult, EnrichmentError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().map_err(classify)?;
        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::Rejected {
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(classify)?;
        parse_response(&body)
    }
}

impl Enricher for HttpEnricher {
    fn enrich(
        &self,
        text: &str,
        context: &EnrichmentContext,
    ) -> Result<Option<EnrichmentResult>, EnrichmentError> {
        let request = EnrichmentRequest {
            text,
            subject: context.subject.as_deref(),
            grade: context.grade,
        };

        let mut attempt = 0;
        loop {
            match self.attempt(&request) {
                Ok(result) if result.is_empty() => return Ok(None),
                Ok(result) => return Ok(Some(result)),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    log::debug!("enrichment attempt {attempt} failed ({e}), retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

fn classify(err: reqwest::Error) -> EnrichmentError {
    if err.is_timeout() {
        EnrichmentError::Timeout
    } else {
        EnrichmentError::Transport(err.to_string())
    }
}

/// Read an enrichment object from a response body
///
/// The object may be wrapped in markdown fences or surrounded by prose.
/// Missing or mistyped fields count as not provided.
pub(crate) fn parse_response(body: &str) -> Result<EnrichmentResult, EnrichmentError> {
    let trimmed = body.trim();
    let unfenced = if trimmed.starts_with("```") {
        trimmed
            .lines()
            .skip(1)
            .take_while(|l| !l.starts_with("```"))
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        trimmed.to_string()
    };

    let json_text = match (unfenced.find('{'), unfenced.rfind('}')) {
        (Some(start), Some(end)) if start < end => &unfenced[start..=end],
        _ => {
            return Err(EnrichmentError::Malformed(
                "no JSON object in response".into(),
            ))
        }
    };

    let value: Value =
        serde_json::from_str(json_text).map_err(|e| EnrichmentError::Malformed(e.to_string()))?;
    let Value::Object(object) = value else {
        return Err(EnrichmentError::Malformed("response is not an object".into()));
    };

    Ok(EnrichmentResult {
        concepts: string_list(&object, &["concepts", "key_concepts"]),
        objectives: string_list(&object, &["objectives", "learning_objectives"]),
        misconceptions: string_list(&object, &["misconceptions", "common_misconceptions"]),
        difficulty: ["difficulty", "difficulty_level"]
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
    })
}

fn string_list(object: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .find_map(|key| object.get(*key).and_then(Value::as_array))
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_json() {
        let body = r#"{"concepts": ["force", "friction"], "difficulty": "beginner"}"#;
        let result = parse_response(body).unwrap();
        assert_eq!(result.concepts, vec!["force", "friction"]);
        assert_eq!(result.difficulty.as_deref(), Some("beginner"));
        assert!(result.objectives.is_empty());
    }

    #[test]
    fn test_parse_fenced_json() {
        let body = "```json\n{\"objectives\": [\"Define force\"]}\n```";
        let result = parse_response(body).unwrap();
        assert_eq!(result.objectives, vec!["Define force"]);
    }

    #[test]
    fn test_parse_ignores_mistyped_fields() {
        let body = r#"{"concepts": "force", "misconceptions": [1, "heavier falls faster"], "difficulty": 3}"#;
        let result = parse_response(body).unwrap();
        assert!(result.concepts.is_empty());
        assert_eq!(result.misconceptions, vec!["heavier falls faster"]);
        assert!(result.difficulty.is_none());
    }

    #[test]
    fn test_parse_alias_fields_and_prose() {
        let body = "Here you go: {\"key_concepts\": [\"pressure\"], \"difficulty_level\": \"advanced\"} Thanks";
        let result = parse_response(body).unwrap();
        assert_eq!(result.concepts, vec!["pressure"]);
        assert_eq!(result.difficulty.as_deref(), Some("advanced"));
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        assert!(matches!(
            parse_response("not json"),
            Err(EnrichmentError::Malformed(_))
        ));
        assert!(matches!(
            parse_response("{broken"),
            Err(EnrichmentError::Malformed(_))
        ));
    }

    #[test]
    fn test_missing_endpoint_is_configuration_error() {
        let config = EnrichmentConfig {
            enabled: true,
            ..EnrichmentConfig::default()
        };
        assert!(matches!(
            HttpEnricher::new(&config),
            Err(EnrichmentError::Configuration(_))
        ));
    }
}
