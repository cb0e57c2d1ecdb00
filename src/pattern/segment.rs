use regex::Regex;
use std::sync::Arc;

/// One compiled segment of a pattern.
#[derive(Clone, Debug)]
pub enum Segment {
    Literal(String),
    Parameter(ParameterSegment),
}

/// A `:name` segment and its attributes, as produced by the parser.
#[derive(Clone, Debug)]
pub struct ParameterSegment {
    pub name: String,
    /// Source text of the regex constraint, if any (kept for branch
    /// deduplication, which compares by source rather than by compiled
    /// `Regex`, since `Regex` has no `PartialEq`).
    pub regex_source: Option<String>,
    pub regex: Option<Arc<Regex>>,
    pub multi: bool,
    pub stage: i32,
}

impl PartialEq for ParameterSegment {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.multi == other.multi && self.regex_source == other.regex_source
    }
}

impl Eq for ParameterSegment {}
