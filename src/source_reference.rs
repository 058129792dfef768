use std::sync::Arc;

use miette::{MietteError, NamedSource, SourceCode, SpanContents};

/// A script's text plus the name it is reported under, shared between every
/// diagnostic rendered for that script.
#[derive(Clone, Debug)]
pub struct SourceReference(Arc<SourceReferenceInner>);

#[derive(Debug)]
struct SourceReferenceInner {
    named_source: NamedSource,
}

impl SourceReference {
    pub fn new(name: impl AsRef<str>, source: impl Into<String>) -> Self {
        SourceReference(Arc::new(SourceReferenceInner {
            named_source: NamedSource::new(name, source.into()),
        }))
    }
}

impl SourceCode for SourceReference {
    fn read_span<'a>(
        &'a self,
        span: &miette::SourceSpan,
        context_lines_before: usize,
        context_lines_after: usize,
    ) -> Result<Box<dyn SpanContents<'a> + 'a>, MietteError> {
        self.0
            .named_source
            .read_span(span, context_lines_before, context_lines_after)
    }
}
