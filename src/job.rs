//! Conversion jobs: the unit of work submitted to the batch driver.
//!
//! A job is immutable once constructed. The three variants mirror the
//! three kinds of source the engine accepts: literal markup, a remote
//! page, and a template rendered against a data model before conversion.

use serde_json::Value;

/// One unit of conversion work.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionJob {
    /// Literal HTML markup, converted as-is.
    InlineHtml(String),

    /// An http/https URL; the engine fetches and renders the page itself.
    RemoteUrl(String),

    /// Template text rendered against `model` (Tera syntax), then
    /// converted like inline markup.
    Template {
        source: String,
        /// Opaque data model. Any JSON value works; objects are the
        /// common case.
        model: Value,
    },
}

impl ConversionJob {
    /// Job from literal HTML markup.
    pub fn inline(html: impl Into<String>) -> Self {
        ConversionJob::InlineHtml(html.into())
    }

    /// Job from a remote URL. The URL scheme is validated at conversion
    /// time, not here — a bad URL is that job's failure, never a panic.
    pub fn url(url: impl Into<String>) -> Self {
        ConversionJob::RemoteUrl(url.into())
    }

    /// Job from template text and a data model.
    pub fn template(source: impl Into<String>, model: Value) -> Self {
        ConversionJob::Template {
            source: source.into(),
            model,
        }
    }

    /// One template, many models: a batch of [`ConversionJob::Template`]
    /// jobs sharing the same source, in model order.
    pub fn template_batch(
        source: impl Into<String>,
        models: impl IntoIterator<Item = Value>,
    ) -> Vec<Self> {
        let source = source.into();
        models
            .into_iter()
            .map(|model| ConversionJob::Template {
                source: source.clone(),
                model,
            })
            .collect()
    }

    /// Short label for logs and progress lines.
    pub fn kind(&self) -> &'static str {
        match self {
            ConversionJob::InlineHtml(_) => "inline-html",
            ConversionJob::RemoteUrl(_) => "url",
            ConversionJob::Template { .. } => "template",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn template_batch_preserves_model_order() {
        let jobs = ConversionJob::template_batch(
            "<p>{{ n }}</p>",
            vec![json!({"n": 1}), json!({"n": 2}), json!({"n": 3})],
        );
        assert_eq!(jobs.len(), 3);
        for (i, job) in jobs.iter().enumerate() {
            match job {
                ConversionJob::Template { model, .. } => {
                    assert_eq!(model["n"], json!(i + 1));
                }
                other => panic!("expected template job, got {}", other.kind()),
            }
        }
    }

    #[test]
    fn template_batch_of_zero_models_is_empty() {
        let jobs = ConversionJob::template_batch("<p></p>", Vec::new());
        assert!(jobs.is_empty());
    }

    #[test]
    fn kind_labels() {
        assert_eq!(ConversionJob::inline("<p/>").kind(), "inline-html");
        assert_eq!(ConversionJob::url("https://example.com").kind(), "url");
        assert_eq!(
            ConversionJob::template("{{ x }}", serde_json::Value::Null).kind(),
            "template"
        );
    }
}
