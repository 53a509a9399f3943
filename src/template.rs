//! Template rendering for [`crate::job::ConversionJob::Template`] jobs.
//!
//! Templates use Tera syntax and are rendered against an arbitrary JSON
//! model before the HTML reaches the engine. Rendering happens inside the
//! per-job isolation boundary: a bad template or a model that doesn't
//! match it fails that one job, never the batch.

use crate::error::JobError;
use serde_json::Value;
use tera::{Context, Tera};

/// Render template text against a JSON model, producing HTML.
///
/// Non-object models (arrays, scalars, null) are exposed to the template
/// as a `model` variable, since a Tera context requires named top-level
/// keys. Object models map their keys directly.
pub fn render(source: &str, model: &Value) -> Result<String, JobError> {
    let context = match model {
        Value::Object(_) => {
            Context::from_value(model.clone()).map_err(|e| JobError::TemplateRender {
                detail: e.to_string(),
            })?
        }
        other => {
            let mut ctx = Context::new();
            ctx.insert("model", other);
            ctx
        }
    };

    Tera::one_off(source, &context, true).map_err(|e| JobError::TemplateRender {
        detail: flatten_tera_error(&e),
    })
}

/// Tera nests the actual cause under `source()`; surface the full chain
/// so a failed outcome carries the reason, not just "failed to render".
fn flatten_tera_error(e: &tera::Error) -> String {
    use std::error::Error;
    let mut msg = e.to_string();
    let mut cause = e.source();
    while let Some(c) = cause {
        msg.push_str(": ");
        msg.push_str(&c.to_string());
        cause = c.source();
    }
    msg
}
