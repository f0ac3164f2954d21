//! Tag query parsing.
//!
//! Every directory component below the mount root is a tag query. A
//! component is a disjunction of alternatives separated by ` or `:
//!
//! ```text
//! genre = rock or genre = jazz
//! year > 1999
//! code
//! ```
//!
//! A whole directory path is the conjunction of its components.

use regex::Regex;
use std::sync::OnceLock;

/// Separator between alternatives of one path component.
pub const OR_SEPARATOR: &str = " or ";

/// Comparison operator of a tag query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Gt,
    Eq,
    Ne,
}

impl Comparison {
    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "<" => Some(Comparison::Lt),
            ">" => Some(Comparison::Gt),
            "=" => Some(Comparison::Eq),
            "!=" => Some(Comparison::Ne),
            _ => None,
        }
    }

    /// SQL operator for this comparison.
    pub fn sql(&self) -> &'static str {
        match self {
            Comparison::Lt => "<",
            Comparison::Gt => ">",
            Comparison::Eq => "=",
            Comparison::Ne => "!=",
        }
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// Integer operand, compared against the tag sort value
    Number(i64),
    /// Text operand, compared against the tag value
    Text(String),
}

/// A single tag query alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagQuery {
    /// Every tag with this name, with or without a value
    Name(String),
    /// Tags with this name whose value or sort key satisfies the comparison
    Compare {
        name: String,
        op: Comparison,
        operand: Operand,
    },
}

fn comparison_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // `!=` is listed before `=` so the alternation never splits it.
        Regex::new(r"^(\w+)\s*(<|>|!=|=)\s*(.+)$").expect("comparison pattern is valid")
    })
}

impl TagQuery {
    /// Parse one alternative.
    ///
    /// Anything that is not a `name <op> operand` comparison is taken as a
    /// plain tag name.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();

        if let Some(captures) = comparison_pattern().captures(text) {
            let name = &captures[1];
            let op = Comparison::from_symbol(&captures[2]);
            let operand = captures[3].trim();

            if let Some(op) = op {
                let operand = match operand.parse::<i64>() {
                    Ok(n) => Operand::Number(n),
                    Err(_) => Operand::Text(operand.to_string()),
                };

                return TagQuery::Compare {
                    name: name.to_string(),
                    op,
                    operand,
                };
            }
        }

        TagQuery::Name(text.to_string())
    }

    /// Name of the tag this query looks at.
    pub fn name(&self) -> &str {
        match self {
            TagQuery::Name(name) => name,
            TagQuery::Compare { name, .. } => name,
        }
    }

    /// Whether this query can match anything at all.
    ///
    /// Ordering comparisons against text have no meaning and never match.
    pub fn is_satisfiable(&self) -> bool {
        !matches!(
            self,
            TagQuery::Compare {
                op: Comparison::Lt | Comparison::Gt,
                operand: Operand::Text(_),
                ..
            }
        )
    }
}

/// One path component: a disjunction of tag queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentQuery {
    pub alternatives: Vec<TagQuery>,
}

impl SegmentQuery {
    pub fn parse(segment: &str) -> Self {
        Self {
            alternatives: segment.split(OR_SEPARATOR).map(TagQuery::parse).collect(),
        }
    }
}

/// A full directory path: the conjunction of its components.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathQuery {
    pub segments: Vec<SegmentQuery>,
}

impl PathQuery {
    pub fn parse<S: AsRef<str>>(parts: &[S]) -> Self {
        Self {
            segments: parts
                .iter()
                .map(|part| SegmentQuery::parse(part.as_ref()))
                .collect(),
        }
    }

    /// An empty path matches every point.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Whether a path component is a query expression rather than a single
/// formatted tag, i.e. it uses `or` or an ordering/inequality operator.
///
/// `name = value` is the formatted form of a stored tag and therefore not
/// counted as an expression.
pub fn is_expression(segment: &str) -> bool {
    let query = SegmentQuery::parse(segment);
    if query.alternatives.len() > 1 {
        return true;
    }

    matches!(
        query.alternatives.first(),
        Some(TagQuery::Compare {
            op: Comparison::Lt | Comparison::Gt | Comparison::Ne,
            ..
        })
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_name() {
        assert_eq!(TagQuery::parse("code"), TagQuery::Name("code".to_string()));
        assert_eq!(
            TagQuery::parse("  music  "),
            TagQuery::Name("music".to_string())
        );
    }

    #[test]
    fn test_parse_text_equality() {
        assert_eq!(
            TagQuery::parse("language = rust"),
            TagQuery::Compare {
                name: "language".to_string(),
                op: Comparison::Eq,
                operand: Operand::Text("rust".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_numeric_comparisons() {
        assert_eq!(
            TagQuery::parse("year>2000"),
            TagQuery::Compare {
                name: "year".to_string(),
                op: Comparison::Gt,
                operand: Operand::Number(2000),
            }
        );
        assert_eq!(
            TagQuery::parse("width < 640"),
            TagQuery::Compare {
                name: "width".to_string(),
                op: Comparison::Lt,
                operand: Operand::Number(640),
            }
        );
    }

    #[test]
    fn test_parse_not_equal() {
        assert_eq!(
            TagQuery::parse("genre != pop"),
            TagQuery::Compare {
                name: "genre".to_string(),
                op: Comparison::Ne,
                operand: Operand::Text("pop".to_string()),
            }
        );
    }

    #[test]
    fn test_value_may_contain_operators() {
        assert_eq!(
            TagQuery::parse("magic = ASCII text, with CRLF"),
            TagQuery::Compare {
                name: "magic".to_string(),
                op: Comparison::Eq,
                operand: Operand::Text("ASCII text, with CRLF".to_string()),
            }
        );
    }

    #[test]
    fn test_ordering_against_text_is_unsatisfiable() {
        assert!(!TagQuery::parse("genre > rock").is_satisfiable());
        assert!(TagQuery::parse("genre != rock").is_satisfiable());
        assert!(TagQuery::parse("year > 1").is_satisfiable());
    }

    #[test]
    fn test_segment_alternatives() {
        let segment = SegmentQuery::parse("genre = rock or genre = jazz");
        assert_eq!(segment.alternatives.len(), 2);
        assert_eq!(segment.alternatives[1].name(), "genre");
    }

    #[test]
    fn test_path_query() {
        let query = PathQuery::parse(&["music", "year > 2000"]);
        assert_eq!(query.segments.len(), 2);
        assert!(!query.is_empty());
        assert!(PathQuery::parse::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_is_expression() {
        assert!(is_expression("year > 2000"));
        assert!(is_expression("genre != pop"));
        assert!(is_expression("a or b"));
        assert!(!is_expression("genre = rock"));
        assert!(!is_expression("code"));
    }
}
