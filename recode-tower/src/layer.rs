use std::sync::Arc;

use recode::{CharsetLabel, ConverterConfig, EncodingRegistry, SourceDecoder};
use recode_http::Recoder;
use smol_str::SmolStr;
use tower::Layer;

use crate::service::RecodeService;

/// Tower [`Layer`] that transcodes response bodies to UTF-8.
///
/// Cloning is cheap: all clones, and every service they produce, share one
/// [`Recoder`].
#[derive(Debug, Clone, Default)]
pub struct Recode {
    recoder: Arc<Recoder>,
}

impl Recode {
    /// Creates a layer for `config` with the default encoding registry.
    pub fn new(config: ConverterConfig) -> Self {
        Self {
            recoder: Arc::new(Recoder::new(config)),
        }
    }

    /// Starts building a layer.
    pub fn builder() -> RecodeBuilder {
        RecodeBuilder::default()
    }

    /// The recoder shared by services of this layer.
    pub fn recoder(&self) -> &Recoder {
        &self.recoder
    }
}

impl<S> Layer<S> for Recode {
    type Service = RecodeService<S>;

    fn layer(&self, upstream: S) -> Self::Service {
        RecodeService::new(upstream, Arc::clone(&self.recoder))
    }
}

/// Builder for [`Recode`].
///
/// Starts from [`ConverterConfig::default`] and the default [`EncodingRegistry`].
#[derive(Debug, Default)]
pub struct RecodeBuilder {
    config: ConverterConfig,
    registry: Option<EncodingRegistry>,
}

impl RecodeBuilder {
    /// Sets the encoding assumed for bodies that are not UTF-8.
    pub fn source_encoding(mut self, source_encoding: impl Into<SmolStr>) -> Self {
        self.config.source_encoding = source_encoding.into();
        self
    }

    /// Sets the charset written to `Content-Type`.
    pub fn charset_label(mut self, charset_label: CharsetLabel) -> Self {
        self.config.charset_label = charset_label;
        self
    }

    /// Replaces the whole configuration.
    pub fn config(self, config: ConverterConfig) -> Self {
        RecodeBuilder { config, ..self }
    }

    /// Replaces the encoding registry.
    pub fn registry(self, registry: EncodingRegistry) -> Self {
        RecodeBuilder {
            registry: Some(registry),
            ..self
        }
    }

    /// Adds a decoder to the registry, starting from the default one if none was set.
    pub fn register<D>(mut self, name: impl Into<SmolStr>, decoder: D) -> Self
    where
        D: SourceDecoder + 'static,
    {
        self.registry
            .get_or_insert_with(EncodingRegistry::default)
            .register(name, decoder);
        self
    }

    /// Builds the layer.
    pub fn build(self) -> Recode {
        let recoder = match self.registry {
            Some(registry) => Recoder::with_registry(self.config, registry),
            None => Recoder::new(self.config),
        };
        Recode {
            recoder: Arc::new(recoder),
        }
    }
}
