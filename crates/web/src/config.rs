//! Registry configuration.
//!
//! [`DispatchConfig`] holds the plain settings and can be read from any serde format;
//! [`RegistryBuilder`] combines it with the pluggable collaborators of a [`Registry`].

use crate::classify::{ErrorClassifier, default_classifier};
use crate::inject::Injector;
use crate::logger::{DispatchLogger, TracingLogger};
use crate::registry::Registry;
use http::StatusCode;
use mime::Mime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use switchyard_http::protocol::{Body, mime_defaults};

pub(crate) type ErrorBody = Arc<dyn Fn(StatusCode) -> Body + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// The request mime assumed for non-`GET` handlers without `consumes`.
    #[serde(with = "mime_str")]
    pub default_in: Mime,
    /// The response mime assumed for handlers without `produces`.
    #[serde(with = "mime_str")]
    pub default_out: Mime,
    /// Whether `*` route segments are wildcards.
    pub wildcards: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { default_in: mime_defaults::default_in(), default_out: mime_defaults::default_out(), wildcards: true }
    }
}

mod mime_str {
    use mime::Mime;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(mime: &Mime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(mime.as_ref())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Mime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(|e| D::Error::custom(format!("invalid mime type {raw:?}: {e}")))
    }
}

/// Builds a [`Registry`].
///
/// Unset collaborators default to [`TracingLogger`], the default classifier rules,
/// [`Body::error_page`] and an empty [`Injector`].
pub struct RegistryBuilder {
    config: DispatchConfig,
    logger: Arc<dyn DispatchLogger>,
    classifier: Arc<dyn ErrorClassifier>,
    error_body: ErrorBody,
    injector: Injector,
}

impl RegistryBuilder {
    pub(crate) fn new() -> Self {
        Self {
            config: DispatchConfig::default(),
            logger: Arc::new(TracingLogger),
            classifier: default_classifier(),
            error_body: Arc::new(Body::error_page),
            injector: Injector::new(),
        }
    }

    #[must_use]
    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn default_in(mut self, mime: Mime) -> Self {
        self.config.default_in = mime;
        self
    }

    #[must_use]
    pub fn default_out(mut self, mime: Mime) -> Self {
        self.config.default_out = mime;
        self
    }

    #[must_use]
    pub fn wildcards(mut self, enabled: bool) -> Self {
        self.config.wildcards = enabled;
        self
    }

    #[must_use]
    pub fn logger(mut self, logger: impl DispatchLogger + 'static) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    #[must_use]
    pub fn classifier(mut self, classifier: impl ErrorClassifier + 'static) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    /// The body of `404` and classified error responses. `405` answers stay bodiless.
    #[must_use]
    pub fn error_body<F>(mut self, f: F) -> Self
    where
        F: Fn(StatusCode) -> Body + Send + Sync + 'static,
    {
        self.error_body = Arc::new(f);
        self
    }

    /// The values available to [`Registry::register_injected`].
    #[must_use]
    pub fn injector(mut self, injector: Injector) -> Self {
        self.injector = injector;
        self
    }

    pub fn build(self) -> Registry {
        Registry::from_parts(self.config, self.logger, self.classifier, self.error_body, self.injector)
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder").field("config", &self.config).field("injector", &self.injector).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DispatchConfig::default();
        assert_eq!(config.default_in, mime::APPLICATION_WWW_FORM_URLENCODED);
        assert_eq!(config.default_out, mime::TEXT_HTML);
        assert!(config.wildcards);
    }

    #[test]
    fn partial_json() {
        let config: DispatchConfig = serde_json::from_str(r#"{"default_out": "application/json"}"#).unwrap();
        assert_eq!(config.default_out, mime::APPLICATION_JSON);
        assert_eq!(config.default_in, mime::APPLICATION_WWW_FORM_URLENCODED);
        assert!(config.wildcards);

        let config: DispatchConfig = serde_json::from_str(r#"{"wildcards": false}"#).unwrap();
        assert!(!config.wildcards);
    }

    #[test]
    fn invalid_mime_is_rejected() {
        let err = serde_json::from_str::<DispatchConfig>(r#"{"default_in": "not a mime"}"#).unwrap_err();
        assert!(err.to_string().contains("invalid mime type"));
    }

    #[test]
    fn serializes_mime_as_string() {
        let json = serde_json::to_value(DispatchConfig::default()).unwrap();
        assert_eq!(json["default_out"], "text/html");
        assert_eq!(json["default_in"], "application/x-www-form-urlencoded");
    }

    #[test]
    fn builder_overrides_config() {
        let builder = RegistryBuilder::default().default_out(mime::TEXT_PLAIN).wildcards(false);
        assert_eq!(builder.config.default_out, mime::TEXT_PLAIN);
        assert!(!builder.config.wildcards);

        let builder = builder.config(DispatchConfig::default());
        assert!(builder.config.wildcards);
    }
}
