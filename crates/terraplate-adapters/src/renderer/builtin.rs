//! Renderer over the compiled-in template bodies.

use tracing::instrument;

use terraplate_core::{
    application::ports::TemplateRenderer,
    domain::{RenderContext, ServiceType},
    error::TerraplateResult,
};

use crate::builtin_templates::builtin_template;

/// Renders the templates shipped with Terraplate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinRenderer;

impl BuiltinRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateRenderer for BuiltinRenderer {
    #[instrument(skip(self, context), fields(%service))]
    fn render(
        &self,
        service: ServiceType,
        template: &str,
        context: &RenderContext,
    ) -> TerraplateResult<Option<String>> {
        builtin_template(service, template)
            .map(|body| super::render_strict(template, body, context))
            .transpose()
    }
}
