//! Extractor registry and dispatcher.

use super::context::ExtractionContext;
use super::extractor::document::SwaggerDocumentExtractor;
use super::{Extractor, ExtractorRegistration, Section, Source, Target};
use crate::error::Result;
use crate::schema::Swagger;
use log::debug;
use std::fmt;
use std::sync::OnceLock;

/// Holds the registered extractors and drives extraction requests
pub struct SwaggerEngine {
    registrations: Vec<ExtractorRegistration>,
    /// Dispatch order as indices into `registrations`, rebuilt after each registration
    sorted: OnceLock<Vec<usize>>,
}

/// Flatten registrations into dispatch order.
///
/// Sections are concatenated in the order their first extractor was
/// registered; inside a section, extractors run by ascending priority and
/// registrations sharing a priority keep their registration order.
pub fn sort_registrations(registrations: &[ExtractorRegistration]) -> Vec<usize> {
    let mut sections: Vec<&Section> = Vec::new();
    for registration in registrations {
        if !sections.contains(&&registration.section) {
            sections.push(&registration.section);
        }
    }

    let mut order = Vec::with_capacity(registrations.len());
    for section in sections {
        let mut indices: Vec<usize> = registrations
            .iter()
            .enumerate()
            .filter(|(_, registration)| &registration.section == section)
            .map(|(index, _)| index)
            .collect();
        indices.sort_by_key(|&index| registrations[index].priority);
        order.extend(indices);
    }
    order
}

impl SwaggerEngine {
    /// Engine with the document bootstrap extractor registered
    pub fn new() -> Self {
        let mut engine = Self::empty();
        engine.register(SwaggerDocumentExtractor, -1, Section::Bootstrap);
        engine
    }

    /// Engine with no extractor at all
    pub fn empty() -> Self {
        Self {
            registrations: Vec::new(),
            sorted: OnceLock::new(),
        }
    }

    /// Register at priority 0 in [`Section::Default`]
    pub fn register_default<E>(&mut self, extractor: E)
    where
        E: Extractor + 'static,
    {
        self.register(extractor, 0, Section::Default);
    }

    /// Lower priorities run first within a section
    pub fn register<E>(&mut self, extractor: E, priority: i32, section: Section)
    where
        E: Extractor + 'static,
    {
        self.register_boxed(Box::new(extractor), priority, section);
    }

    pub fn register_boxed(&mut self, extractor: Box<dyn Extractor>, priority: i32, section: Section) {
        debug!(
            "Registering extractor {} (section {}, priority {})",
            extractor.name(),
            section,
            priority
        );
        self.registrations.push(ExtractorRegistration {
            extractor,
            section,
            priority,
        });
        self.sorted.take();
    }

    /// Drop every registration
    pub fn reset(&mut self) {
        self.registrations.clear();
        self.sorted.take();
    }

    pub fn registrations(&self) -> &[ExtractorRegistration] {
        &self.registrations
    }

    /// Extractors in dispatch order
    pub fn sorted_extractors(&self) -> impl Iterator<Item = &dyn Extractor> {
        let order = self.sorted.get_or_init(|| sort_registrations(&self.registrations));
        order
            .iter()
            .map(move |&index| self.registrations[index].extractor.as_ref())
    }

    /// Fresh root context bound to this engine
    pub fn root_context(&self) -> ExtractionContext<'_> {
        ExtractionContext::new(self)
    }

    /// Run every applicable extractor, in order, against `target`
    pub fn extract(
        &self,
        source: &Source<'_>,
        target: &mut Target<'_>,
        context: &mut ExtractionContext<'_>,
    ) -> Result<()> {
        for extractor in self.sorted_extractors() {
            if !extractor.can_extract(source, target, context) {
                continue;
            }
            debug!("Running extractor {} on {}", extractor.name(), target.kind());
            extractor.extract(source, target, context)?;
        }
        Ok(())
    }

    /// Extract into `target` with a fresh root context
    pub fn extract_into(&self, source: &Source<'_>, target: &mut Target<'_>) -> Result<()> {
        let mut context = self.root_context();
        self.extract(source, target, &mut context)
    }

    /// Extract into a fresh document with a fresh root context
    pub fn extract_document(&self, source: &Source<'_>) -> Result<Swagger> {
        let mut swagger = Swagger::new();
        self.extract_into(source, &mut Target::Document(&mut swagger))?;
        Ok(swagger)
    }
}

impl Default for SwaggerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SwaggerEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwaggerEngine")
            .field("registrations", &self.registrations)
            .finish()
    }
}
