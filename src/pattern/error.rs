use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern {pattern:?} must start with '/'")]
    MissingLeadingSlash { pattern: String },

    #[error("pattern {pattern:?} must not start with a parameter")]
    ParameterAtStart { pattern: String },

    #[error(
        "pattern {pattern:?} has adjacent parameters but the left one ({left_name:?}) carries no regex constraint"
    )]
    AdjacentParametersWithoutRegex { pattern: String, left_name: String },

    #[error("pattern {pattern:?} has a parameter with an empty name at byte {index}")]
    EmptyParameterName { pattern: String, index: usize },

    #[error("pattern {pattern:?} has an unterminated regex constraint")]
    UnterminatedRegexConstraint { pattern: String },

    #[error("pattern {pattern:?} has an empty regex constraint")]
    EmptyRegexConstraint { pattern: String },

    #[error("pattern {pattern:?} has an invalid regex constraint {source:?}: {error}")]
    RegexConstraintInvalid {
        pattern: String,
        source: String,
        error: String,
    },

    #[error("pattern {pattern:?} has unconsumed input {remainder:?} at end of parsing")]
    UnconsumedInput { pattern: String, remainder: String },

    #[error(
        "pattern {pattern:?} has multi-parameter {name:?} without a regex constraint followed by more path"
    )]
    MultiWithoutRegexNotLast { pattern: String, name: String },

    #[error("pattern {pattern:?} ends with a dangling escape character")]
    TrailingEscape { pattern: String },
}
