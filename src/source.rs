use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceSpan {
    offset: usize,
    length: usize,
}

impl SourceSpan {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }
    pub fn range(start: usize, end: usize) -> Self {
        Self {
            offset: start,
            length: end.saturating_sub(start),
        }
    }
    pub fn start(&self) -> usize {
        self.offset
    }
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
    /// Smallest span covering both `self` and `other`.
    pub fn to(&self, other: SourceSpan) -> Self {
        Self::range(self.start().min(other.start()), self.end().max(other.end()))
    }
}

impl From<Range<usize>> for SourceSpan {
    fn from(range: Range<usize>) -> Self {
        Self::range(range.start, range.end)
    }
}

impl From<&SourceSpan> for miette::SourceSpan {
    fn from(span: &SourceSpan) -> Self {
        Self::new(span.offset.into(), span.length.into())
    }
}
impl From<SourceSpan> for miette::SourceSpan {
    fn from(span: SourceSpan) -> Self {
        Self::from(&span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn covering_span() {
        let left = SourceSpan::new(4, 2);
        let right = SourceSpan::from(10..13);
        let joined = left.to(right);
        assert_eq!(joined.start(), 4);
        assert_eq!(joined.end(), 13);
        assert_eq!(right.to(left), joined);
    }
}
