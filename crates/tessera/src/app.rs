//! Assembling a pipeline from configuration.

use std::sync::Arc;

use tessera_action::{ActionHandler, JsonResponder, Responder, Validator};
use tessera_config::{PipelineSettings, TesseraConfig};
use tessera_core::{Container, ErrorLogger, Token};
use tessera_extract::FieldExtractor;
use tessera_middleware::stages::{ErrorNormalizationMiddleware, RequestIdMiddleware};
use tessera_middleware::{Middleware, Pipeline, PipelineBuilder, RequestHandler};

/// Token the configured [`JsonResponder`] is registered under.
pub const JSON_RESPONDER: &str = "json";

/// Builds the standard pipeline:
///
/// ```text
/// RequestId → ErrorNormalization → (your stages) → ActionHandler → fallback
/// ```
///
/// The pipeline settings decide whether incoming request ids are trusted,
/// whether internal failure messages reach clients, and how large a body
/// the extractor reads. A [`JsonResponder`] honouring the same settings is
/// registered under [`JSON_RESPONDER`].
///
/// # Example
///
/// ```
/// use tessera::App;
/// use tessera_config::TesseraConfig;
///
/// let pipeline = App::from_config(&TesseraConfig::production()).build();
/// assert_eq!(
///     pipeline.stage_names(),
///     vec!["request_id", "error_normalization", "action_handler"]
/// );
/// ```
pub struct App {
    settings: PipelineSettings,
    container: Container,
    logger: Option<Arc<dyn ErrorLogger>>,
    pipeline: PipelineBuilder,
}

impl App {
    /// Starts an app with `settings`.
    #[must_use]
    pub fn new(settings: PipelineSettings) -> Self {
        let normalizer = ErrorNormalizationMiddleware::new()
            .expose_internal_errors(settings.expose_internal_errors)
            .internal_error_message(&settings.internal_error_message);

        let pipeline = Pipeline::builder()
            .stage(RequestIdMiddleware::with_trust(settings.trust_request_id))
            .stage(normalizer.clone())
            .error_normalization(normalizer);

        let mut container = Container::new();
        container.register::<dyn Responder>(
            JSON_RESPONDER,
            Arc::new(
                JsonResponder::new()
                    .expose_internal_errors(settings.expose_internal_errors)
                    .internal_error_message(&settings.internal_error_message),
            ),
        );

        Self {
            settings,
            container,
            logger: None,
            pipeline,
        }
    }

    /// Starts an app with the pipeline section of `config`.
    #[must_use]
    pub fn from_config(config: &TesseraConfig) -> Self {
        Self::new(config.pipeline.clone())
    }

    /// Returns the settings the app was built with.
    #[must_use]
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Returns a field extractor honouring the configured body limit.
    ///
    /// Pass it to [`FieldRules::with_extractor`](tessera_action::FieldRules::with_extractor)
    /// so validators read input under the same limit.
    #[must_use]
    pub fn extractor(&self) -> FieldExtractor {
        FieldExtractor::new().with_max_body_size(self.settings.max_body_size)
    }

    /// Registers a validator under `token`.
    #[must_use]
    pub fn validator(mut self, token: impl Into<Token>, validator: Arc<dyn Validator>) -> Self {
        self.container.register::<dyn Validator>(token, validator);
        self
    }

    /// Registers a responder under `token`, replacing any earlier one.
    #[must_use]
    pub fn responder(mut self, token: impl Into<Token>, responder: Arc<dyn Responder>) -> Self {
        self.container.register::<dyn Responder>(token, responder);
        self
    }

    /// Gives access to the service container for other registrations.
    pub fn container_mut(&mut self) -> &mut Container {
        &mut self.container
    }

    /// Sets the logger unexpected action failures are reported to.
    ///
    /// Defaults to [`TracingLogger`](tessera_core::TracingLogger).
    #[must_use]
    pub fn logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Adds a stage that runs before the action handler, such as the
    /// router that attaches the matched action.
    #[must_use]
    pub fn stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.pipeline = self.pipeline.stage(middleware);
        self
    }

    /// Sets the handler for requests that carry no action.
    #[must_use]
    pub fn fallback<H: RequestHandler>(mut self, handler: H) -> Self {
        self.pipeline = self.pipeline.fallback(handler);
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        let container = Arc::new(self.container);
        let handler = match self.logger {
            Some(logger) => ActionHandler::with_logger(container, logger),
            None => ActionHandler::new(container),
        };
        self.pipeline.stage(handler).build()
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("settings", &self.settings)
            .field("custom_logger", &self.logger.is_some())
            .finish_non_exhaustive()
    }
}
