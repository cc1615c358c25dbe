//! Substitution of external scalars into equation text.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char},
    combinator::recognize,
    multi::many0_count,
    sequence::{delimited, pair, preceded},
    IResult, Parser,
};
use std::collections::BTreeMap;

/// Replaces references to external named values inside equation text.
pub trait Interpolator {
    fn interpolate(&self, text: &str) -> String;
}

/// Leaves text untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoInterpolation;

impl Interpolator for NoInterpolation {
    fn interpolate(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Named `f64` bindings substituted for `$name` and `${name}`.
///
/// References to names that are not bound are kept verbatim.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScalarScope {
    values: BTreeMap<String, f64>,
}

impl ScalarScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, value: f64) -> &mut Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for ScalarScope {
    fn from_iter<T: IntoIterator<Item = (S, f64)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

/// `$name` or `${name}`.
fn reference(input: &str) -> IResult<&str, &str> {
    preceded(
        char('$'),
        alt((delimited(char('{'), identifier, char('}')), identifier)),
    )
    .parse(input)
}

impl Interpolator for ScalarScope {
    fn interpolate(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let candidate = &rest[pos..];
            match reference(candidate) {
                Ok((after, name)) => match self.get(name) {
                    Some(value) => {
                        out.push_str(&format!("{:?}", value));
                        rest = after;
                    }
                    None => {
                        let consumed = candidate.len() - after.len();
                        out.push_str(&candidate[..consumed]);
                        rest = after;
                    }
                },
                Err(_) => {
                    out.push('$');
                    rest = &candidate[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_both_forms() {
        let scope: ScalarScope = [("vdd", 1.8), ("gain_2", 0.5)].into_iter().collect();
        assert_eq!(
            scope.interpolate("y = v * $vdd; z = y * ${gain_2}"),
            "y = v * 1.8; z = y * 0.5"
        );
    }

    #[test]
    fn test_unknown_and_bare_dollar_kept() {
        let mut scope = ScalarScope::new();
        scope.bind("a", 2.0);
        assert_eq!(scope.interpolate("x = $b + $a $ 1"), "x = $b + 2.0 $ 1");
        assert_eq!(NoInterpolation.interpolate("x = $a"), "x = $a");
    }
}
