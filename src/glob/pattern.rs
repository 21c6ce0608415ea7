use std::fmt;
use std::str::FromStr;

/// One element of a glob pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobToken {
    Literal(char),
    /// `?`: exactly one character
    AnyChar,
    /// `*`: any run of characters, including none
    AnyRun,
}

/// Wildcard structure of a pattern with the literal characters erased
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeToken {
    Literal,
    AnyChar,
    AnyRun,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlobShape(Vec<ShapeToken>);

impl GlobShape {
    pub fn tokens(&self) -> &[ShapeToken] {
        &self.0
    }

    pub fn wildcard_count(&self) -> usize {
        self.0
            .iter()
            .filter(|token| !matches!(token, ShapeToken::Literal))
            .count()
    }
}

/// A parsed glob pattern.
///
/// Patterns are normalised on construction: consecutive `*` collapse into
/// one, which never changes what the pattern matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlobPattern {
    source: String,
    tokens: Vec<GlobToken>,
}

impl GlobPattern {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut tokens: Vec<GlobToken> = Vec::with_capacity(source.len());
        for ch in source.chars() {
            let token = match ch {
                '*' => GlobToken::AnyRun,
                '?' => GlobToken::AnyChar,
                other => GlobToken::Literal(other),
            };
            if token == GlobToken::AnyRun && tokens.last() == Some(&GlobToken::AnyRun) {
                continue;
            }
            tokens.push(token);
        }
        Self { source, tokens }
    }

    /// The pattern text as written
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[GlobToken] {
        &self.tokens
    }

    /// Literal characters in pattern order
    pub fn literals(&self) -> impl Iterator<Item = char> + '_ {
        self.tokens.iter().filter_map(|token| match token {
            GlobToken::Literal(ch) => Some(*ch),
            GlobToken::AnyChar | GlobToken::AnyRun => None,
        })
    }

    pub fn shape(&self) -> GlobShape {
        GlobShape(
            self.tokens
                .iter()
                .map(|token| match token {
                    GlobToken::Literal(_) => ShapeToken::Literal,
                    GlobToken::AnyChar => ShapeToken::AnyChar,
                    GlobToken::AnyRun => ShapeToken::AnyRun,
                })
                .collect(),
        )
    }

    /// Whether two patterns accept exactly the same strings
    pub fn is_equivalent(&self, other: &Self) -> bool {
        self.tokens == other.tokens
    }

    /// Match `subject` with the generic backtracking matcher.
    pub fn matches_generic(&self, subject: &str) -> bool {
        let subject: Vec<char> = subject.chars().collect();
        match_tokens(&self.tokens, &subject)
    }
}

fn match_tokens(tokens: &[GlobToken], subject: &[char]) -> bool {
    match tokens.split_first() {
        None => subject.is_empty(),
        Some((GlobToken::Literal(expected), rest)) => match subject.split_first() {
            Some((ch, tail)) if ch == expected => match_tokens(rest, tail),
            _ => false,
        },
        Some((GlobToken::AnyChar, rest)) => subject
            .split_first()
            .is_some_and(|(_, tail)| match_tokens(rest, tail)),
        Some((GlobToken::AnyRun, rest)) => {
            (0..=subject.len()).any(|skip| match_tokens(rest, &subject[skip..]))
        }
    }
}

impl FromStr for GlobPattern {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl fmt::Display for GlobPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
