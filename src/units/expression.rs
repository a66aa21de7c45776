//! Unit expression parsing and evaluation
//!
//! Unit text such as `kg*m^2/s^2`, `m/(s*s)`, `1/s` or `kg·m` is parsed into a
//! small AST and then evaluated against a [`UnitLookup`] (normally the
//! [`UnitRegistry`](super::UnitRegistry)) into a scale factor and dimensions.
//! Products and quotients associate to the left, so `J/kg/K` means
//! `(J/kg)/K`.

use super::unit::Dimensions;
use super::UnitError;
use nom::{
    bytes::complete::{tag, take_while1},
    character::complete::{char, multispace0},
    IResult, Parser,
};

/// Unit expression AST node
#[derive(Debug, Clone, PartialEq)]
pub enum UnitExpr {
    /// The literal `1`, as in `1/s`
    One,

    /// A unit name, possibly carrying an SI prefix (`meV`, `cm`)
    Symbol(String),

    /// Product of two unit expressions
    Mul(Box<UnitExpr>, Box<UnitExpr>),

    /// Quotient of two unit expressions
    Div(Box<UnitExpr>, Box<UnitExpr>),

    /// Integer power of a unit expression
    Pow(Box<UnitExpr>, i32),
}

/// Resolves a single unit name to its SI scale factor and dimensions
pub trait UnitLookup {
    fn lookup(&self, name: &str) -> Result<(f64, Dimensions), UnitError>;
}

impl UnitExpr {
    /// Parse a unit expression from a string
    pub fn parse(input: &str) -> Result<Self, UnitError> {
        match expr_parser(input.trim()) {
            Ok((remainder, expr)) => {
                // Make sure the entire input was consumed
                if remainder.trim().is_empty() {
                    Ok(expr)
                } else {
                    Err(UnitError::ParseError {
                        input: input.to_string(),
                        message: format!("Unexpected trailing characters: '{}'", remainder),
                    })
                }
            }
            Err(e) => Err(UnitError::ParseError {
                input: input.to_string(),
                message: format!("{:?}", e),
            }),
        }
    }

    /// Evaluate the expression into an SI scale factor and dimensions
    pub fn evaluate<L: UnitLookup + ?Sized>(&self, lookup: &L) -> Result<(f64, Dimensions), UnitError> {
        match self {
            Self::One => Ok((1.0, Dimensions::DIMENSIONLESS)),

            Self::Symbol(name) => lookup.lookup(name),

            Self::Mul(left, right) => {
                let (lf, ld) = left.evaluate(lookup)?;
                let (rf, rd) = right.evaluate(lookup)?;
                Ok((lf * rf, ld.checked_mul(rd).ok_or(UnitError::ExponentOverflow)?))
            }

            Self::Div(left, right) => {
                let (lf, ld) = left.evaluate(lookup)?;
                let (rf, rd) = right.evaluate(lookup)?;
                Ok((lf / rf, ld.checked_div(rd).ok_or(UnitError::ExponentOverflow)?))
            }

            Self::Pow(base, power) => {
                let (factor, dims) = base.evaluate(lookup)?;
                let dims = dims.checked_powi(*power).ok_or(UnitError::ExponentOverflow)?;
                Ok((factor.powi(*power), dims))
            }
        }
    }

    /// All unit names used in the expression, sorted and deduplicated
    pub fn symbols(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_symbols(&mut names);
        names.sort();
        names.dedup();
        names
    }

    fn collect_symbols(&self, names: &mut Vec<String>) {
        match self {
            Self::One => {}
            Self::Symbol(name) => names.push(name.clone()),
            Self::Mul(left, right) | Self::Div(left, right) => {
                left.collect_symbols(names);
                right.collect_symbols(names);
            }
            Self::Pow(base, _) => base.collect_symbols(names),
        }
    }
}

// Parser functions using nom

fn ws(input: &str) -> IResult<&str, &str> {
    multispace0(input)
}

fn punct(c: char, input: &str) -> IResult<&str, char> {
    char(c).parse(input)
}

/// Parse a unit name; any alphabetic run, which covers `µ`, `Å` and `Ω`
fn symbol(input: &str) -> IResult<&str, UnitExpr> {
    let parsed: IResult<&str, &str> = take_while1(|c: char| c.is_alphabetic() || c == '_').parse(input);
    let (input, name) = parsed?;
    Ok((input, UnitExpr::Symbol(name.to_string())))
}

fn one(input: &str) -> IResult<&str, UnitExpr> {
    let (input, _) = punct('1', input)?;
    Ok((input, UnitExpr::One))
}

/// Parse a parenthesized expression
fn parens(input: &str) -> IResult<&str, UnitExpr> {
    let (input, _) = punct('(', input)?;
    let (input, _) = ws(input)?;
    let (input, expr) = expr_parser(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = punct(')', input)?;
    Ok((input, expr))
}

fn primary(input: &str) -> IResult<&str, UnitExpr> {
    if let Ok(result) = parens(input) {
        return Ok(result);
    }

    if let Ok(result) = one(input) {
        return Ok(result);
    }

    symbol(input)
}

fn exponent(input: &str) -> IResult<&str, i32> {
    nom::character::complete::i32(input)
}

/// Parse a power (`m^2`, `s**-1`)
fn power(input: &str) -> IResult<&str, UnitExpr> {
    let (input, base) = primary(input)?;
    let (after_ws, _) = ws(input)?;

    let double_star: IResult<&str, &str> = tag("**").parse(after_ws);
    let after_op = match double_star {
        Ok((rest, _)) => Some(rest),
        Err(_) => punct('^', after_ws).ok().map(|(rest, _)| rest),
    };

    match after_op {
        Some(rest) => {
            let (rest, _) = ws(rest)?;
            let (rest, power) = exponent(rest)?;
            Ok((rest, UnitExpr::Pow(Box::new(base), power)))
        }
        None => Ok((input, base)),
    }
}

/// Parse a chain of products and quotients, folding to the left
fn expr_parser(input: &str) -> IResult<&str, UnitExpr> {
    let (input, _) = ws(input)?;
    let (mut input, mut acc) = power(input)?;

    loop {
        let (after_ws, _) = ws(input)?;

        let op = if let Ok((rest, _)) = punct('*', after_ws) {
            Some((rest, true))
        } else if let Ok((rest, _)) = punct('·', after_ws) {
            Some((rest, true))
        } else if let Ok((rest, _)) = punct('/', after_ws) {
            Some((rest, false))
        } else {
            None
        };

        let Some((rest, is_mul)) = op else {
            return Ok((input, acc));
        };

        let (rest, _) = ws(rest)?;
        let (rest, rhs) = power(rest)?;
        acc = if is_mul {
            UnitExpr::Mul(Box::new(acc), Box::new(rhs))
        } else {
            UnitExpr::Div(Box::new(acc), Box::new(rhs))
        };
        input = rest;
    }
}
