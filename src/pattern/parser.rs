use crate::pattern::error::PatternError;
use crate::pattern::segment::{ParameterSegment, Segment};
use regex::Regex;
use std::sync::Arc;

pub fn parse(pattern: &str) -> Result<Vec<Segment>, PatternError> {
    if !pattern.starts_with('/') {
        return Err(PatternError::MissingLeadingSlash {
            pattern: pattern.to_string(),
        });
    }

    let mut parser = PatternParser::new(pattern);
    let segments = parser.parse_segments()?;
    validate(pattern, &segments)?;

    if parser.index != parser.chars.len() {
        return Err(PatternError::UnconsumedInput {
            pattern: pattern.to_string(),
            remainder: pattern[parser.current_byte_index()..].to_string(),
        });
    }

    Ok(segments)
}

fn validate(pattern: &str, segments: &[Segment]) -> Result<(), PatternError> {
    if matches!(segments.first(), Some(Segment::Parameter(_))) {
        return Err(PatternError::ParameterAtStart {
            pattern: pattern.to_string(),
        });
    }

    for window in segments.windows(2) {
        if let [Segment::Parameter(left), Segment::Parameter(_)] = window {
            if left.regex.is_none() {
                return Err(PatternError::AdjacentParametersWithoutRegex {
                    pattern: pattern.to_string(),
                    left_name: left.name.clone(),
                });
            }
        }
    }

    let last_index = segments.len().saturating_sub(1);
    for (index, segment) in segments.iter().enumerate() {
        if let Segment::Parameter(param) = segment {
            if param.multi && param.regex.is_none() && index != last_index {
                return Err(PatternError::MultiWithoutRegexNotLast {
                    pattern: pattern.to_string(),
                    name: param.name.clone(),
                });
            }
        }
    }

    Ok(())
}

struct PatternParser<'a> {
    pattern: &'a str,
    chars: Vec<(usize, char)>,
    index: usize,
}

impl<'a> PatternParser<'a> {
    fn new(pattern: &'a str) -> Self {
        Self {
            pattern,
            chars: pattern.char_indices().collect(),
            index: 0,
        }
    }

    fn parse_segments(&mut self) -> Result<Vec<Segment>, PatternError> {
        let mut segments = Vec::new();
        while self.peek().is_some() {
            if self.peek() == Some(':') {
                segments.push(Segment::Parameter(self.parse_parameter()?));
            } else {
                segments.push(Segment::Literal(self.parse_literal()?));
            }
        }
        Ok(segments)
    }

    fn parse_literal(&mut self) -> Result<String, PatternError> {
        let mut literal = String::new();
        while let Some(ch) = self.peek() {
            if ch == ':' {
                break;
            }
            if ch == '\\' {
                self.next();
                match self.next() {
                    Some(escaped) => literal.push(escaped),
                    None => {
                        return Err(PatternError::TrailingEscape {
                            pattern: self.pattern.to_string(),
                        });
                    }
                }
            } else {
                self.next();
                literal.push(ch);
            }
        }
        Ok(literal)
    }

    fn parse_parameter(&mut self) -> Result<ParameterSegment, PatternError> {
        self.expect(':');

        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.next();
                name.push(ch);
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(PatternError::EmptyParameterName {
                pattern: self.pattern.to_string(),
                index: self.current_byte_index(),
            });
        }

        let stage = self.parse_stage();

        let (regex_source, regex) = if self.peek() == Some('(') {
            let raw = self.read_balanced_regex()?;
            if raw.is_empty() {
                return Err(PatternError::EmptyRegexConstraint {
                    pattern: self.pattern.to_string(),
                });
            }
            let anchored = format!("^(?:{raw})");
            let compiled = Regex::new(&anchored).map_err(|err| PatternError::RegexConstraintInvalid {
                pattern: self.pattern.to_string(),
                source: raw.clone(),
                error: err.to_string(),
            })?;
            (Some(raw), Some(Arc::new(compiled)))
        } else {
            (None, None)
        };

        let multi = if self.peek() == Some('+') {
            self.next();
            true
        } else {
            false
        };

        Ok(ParameterSegment {
            name,
            regex_source,
            regex,
            multi,
            stage,
        })
    }

    fn parse_stage(&mut self) -> i32 {
        if self.peek() != Some('$') {
            return 0;
        }
        self.next();

        let negative = if self.peek() == Some('-') {
            self.next();
            true
        } else {
            false
        };

        let mut digits = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                self.next();
                digits.push(ch);
            } else {
                break;
            }
        }

        let magnitude: i32 = digits.parse().unwrap_or(0);
        if negative { -magnitude } else { magnitude }
    }

    /// Reads the regex source between a `(` (already confirmed present
    /// but not yet consumed) and its matching `)`, tracking nesting
    /// depth and `\`-escaping the same way the literal scanner does.
    fn read_balanced_regex(&mut self) -> Result<String, PatternError> {
        self.expect('(');
        let mut depth = 1usize;
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch == '\\' {
                self.next();
                text.push('\\');
                match self.next() {
                    Some(escaped) => text.push(escaped),
                    None => {
                        return Err(PatternError::UnterminatedRegexConstraint {
                            pattern: self.pattern.to_string(),
                        });
                    }
                }
                continue;
            }
            match ch {
                '(' => {
                    depth += 1;
                    text.push(ch);
                    self.next();
                }
                ')' => {
                    self.next();
                    depth -= 1;
                    if depth == 0 {
                        return Ok(text);
                    }
                    text.push(')');
                }
                _ => {
                    text.push(ch);
                    self.next();
                }
            }
        }
        Err(PatternError::UnterminatedRegexConstraint {
            pattern: self.pattern.to_string(),
        })
    }

    fn expect(&mut self, expected: char) {
        let actual = self.next();
        debug_assert_eq!(Some(expected), actual);
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).map(|(_, ch)| *ch)
    }

    fn next(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.index += 1;
        }
        ch
    }

    fn current_byte_index(&self) -> usize {
        self.chars
            .get(self.index)
            .map(|(idx, _)| *idx)
            .unwrap_or(self.pattern.len())
    }
}
