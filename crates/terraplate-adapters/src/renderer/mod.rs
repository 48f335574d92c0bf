//! Template renderers.
//!
//! Both renderers substitute `{{VARIABLE}}` placeholders through
//! [`RenderContext`] and refuse output that still contains one.

mod builtin;
mod directory;

pub use builtin::BuiltinRenderer;
pub use directory::DirectoryRenderer;

use terraplate_core::{
    application::ApplicationError,
    domain::{RenderContext, unresolved_placeholder},
    error::TerraplateResult,
};

/// Render `body` and reject any placeholder left unresolved.
fn render_strict(template: &str, body: &str, context: &RenderContext) -> TerraplateResult<String> {
    let rendered = context.render(body);
    match unresolved_placeholder(&rendered) {
        Some(name) => Err(ApplicationError::RenderFailed {
            template: template.to_string(),
            reason: format!("unresolved variable {{{{{name}}}}}"),
        }
        .into()),
        None => Ok(rendered),
    }
}
