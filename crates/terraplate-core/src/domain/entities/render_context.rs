use std::collections::HashMap;

/// Context for template rendering.
///
/// A **Value Object** holding every variable a template may reference.
/// Transformations create new instances (see `with_variable`).
///
/// ## Variable Naming Convention
///
/// All variables are `SCREAMING_SNAKE_CASE` and referenced as `{{NAME}}`.
///
/// ## Standard Variables
///
/// | Variable | Example | Source |
/// |----------|---------|--------|
/// | `PROJECT_NAME` | "shop" | Manifest |
/// | `REGION` | "us-east-1" | Manifest |
/// | `ENVIRONMENT` | "dev" | Generator, per environment |
/// | `SERVICE` | "lambda" | Service type |
/// | `INSTANCE_NAME` | "my-func" | Instance |
/// | `MODULE_NAME` | "my_func" | Derived from instance |
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    variables: HashMap<String, String>,
}

impl RenderContext {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self::default().with_variable("PROJECT_NAME", project_name)
    }

    /// Add a variable, consuming self and returning a new context.
    ///
    /// A later value for the same key replaces the earlier one.
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Render a template string by replacing `{{VARIABLE}}` placeholders.
    ///
    /// Unknown placeholders are left in place; use [`unresolved_placeholder`]
    /// on the output to detect them.
    pub fn render(&self, template: &str) -> String {
        let mut result = template.to_string();
        for (key, value) in &self.variables {
            let placeholder = format!("{{{{{key}}}}}");
            result = result.replace(&placeholder, value);
        }
        result
    }
}

/// The first `{{NAME}}` placeholder left in `rendered`, if any.
///
/// Only `SCREAMING_SNAKE_CASE` names count, so literal braces elsewhere in a
/// file are not reported.
pub fn unresolved_placeholder(rendered: &str) -> Option<&str> {
    let mut rest = rendered;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            return None;
        };
        let name = &after[..end];
        if !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        {
            return Some(name);
        }
        rest = &after[end + 2..];
    }
    None
}
