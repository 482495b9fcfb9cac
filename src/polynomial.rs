//! Sparse multivariate polynomials.
//!
//! Sector data stores its polynomials as text in the notation of the decomposition generator,
//! for instance `+ ( + (2*msq - s))*x1*x2 + ( + (msq))*x0^2`. [`parse`] turns such an expression
//! into a [`Polynomial`] whose variables are the given symbols, and [`Polynomial::bind`] replaces
//! the trailing symbols (the kinematic parameters) by numbers.

use crate::error::{Error, Result};
use num_complex::Complex64;
use num_traits::{One, Zero};
use std::collections::BTreeMap;
use std::ops::{Add, Mul, Neg};

/// A single monomial `coefficient * x_0^e_0 * x_1^e_1 * ...`.
#[derive(Clone, Debug, PartialEq)]
pub struct Term<C> {
    /// The coefficient.
    pub coefficient: C,
    /// One exponent per variable.
    pub exponents: Vec<u32>,
}

/// A polynomial stored as a list of terms with pairwise different exponents and non-vanishing
/// coefficients, ordered lexicographically by exponents.
#[derive(Clone, Debug, PartialEq)]
pub struct Polynomial<C> {
    variables: usize,
    terms: Vec<Term<C>>,
}

impl<C> Polynomial<C> {
    /// Returns the number of variables.
    pub const fn variables(&self) -> usize {
        self.variables
    }

    /// Returns the terms.
    pub fn terms(&self) -> &[Term<C>] {
        &self.terms
    }

    /// Returns `true` if this is the zero polynomial.
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns the highest power of `variable` appearing in any term.
    pub fn degree(&self, variable: usize) -> u32 {
        self.terms
            .iter()
            .map(|term| term.exponents[variable])
            .max()
            .unwrap_or(0)
    }

    /// Evaluates the polynomial at `x`, which must have one entry per variable.
    pub fn evaluate<X>(&self, x: &[X]) -> X
    where
        C: Copy,
        X: Copy + Zero + One + From<C>,
    {
        debug_assert_eq!(x.len(), self.variables);

        self.terms.iter().fold(X::zero(), |sum, term| {
            let monomial = term
                .exponents
                .iter()
                .zip(x)
                .filter(|&(&e, _)| e != 0)
                .fold(X::from(term.coefficient), |acc, (&e, &xk)| {
                    acc * num_traits::pow(xk, e as usize)
                });
            sum + monomial
        })
    }
}

impl<C> Polynomial<C>
where
    C: Copy + Zero + Add<Output = C> + Mul<Output = C>,
{
    /// The polynomial without terms.
    pub fn zero(variables: usize) -> Self {
        Self {
            variables,
            terms: Vec::new(),
        }
    }

    /// The constant polynomial `value`.
    pub fn constant(variables: usize, value: C) -> Self {
        Self::from_terms(
            variables,
            vec![Term {
                coefficient: value,
                exponents: vec![0; variables],
            }],
        )
    }

    /// The polynomial `x_index`.
    pub fn variable(variables: usize, index: usize) -> Self
    where
        C: One,
    {
        let mut exponents = vec![0; variables];
        exponents[index] = 1;

        Self {
            variables,
            terms: vec![Term {
                coefficient: C::one(),
                exponents,
            }],
        }
    }

    /// Constructs a polynomial from arbitrary terms, merging terms with equal exponents and
    /// dropping vanishing coefficients.
    pub fn from_terms<I>(variables: usize, terms: I) -> Self
    where
        I: IntoIterator<Item = Term<C>>,
    {
        let mut merged: BTreeMap<Vec<u32>, C> = BTreeMap::new();

        for term in terms {
            debug_assert_eq!(term.exponents.len(), variables);
            let entry = merged.entry(term.exponents).or_insert_with(C::zero);
            *entry = *entry + term.coefficient;
        }

        Self {
            variables,
            terms: merged
                .into_iter()
                .filter(|(_, coefficient)| !coefficient.is_zero())
                .map(|(exponents, coefficient)| Term {
                    coefficient,
                    exponents,
                })
                .collect(),
        }
    }

    /// Returns the value of a polynomial without variables, or `None` if any variable appears.
    pub fn constant_value(&self) -> Option<C> {
        match self.terms.as_slice() {
            [] => Some(C::zero()),
            [term] if term.exponents.iter().all(|&e| e == 0) => Some(term.coefficient),
            _ => None,
        }
    }

    /// Multiplies every coefficient by `factor`.
    pub fn scale(&self, factor: C) -> Self {
        Self::from_terms(
            self.variables,
            self.terms.iter().map(|term| Term {
                coefficient: term.coefficient * factor,
                exponents: term.exponents.clone(),
            }),
        )
    }

    /// Raises the polynomial to a non-negative integer power.
    pub fn pow(&self, exponent: u32) -> Self
    where
        C: One,
    {
        (0..exponent).fold(Self::constant(self.variables, C::one()), |acc, _| {
            &acc * self
        })
    }

    /// Returns the partial derivative with respect to `variable`.
    pub fn derivative(&self, variable: usize) -> Self
    where
        C: From<f64>,
    {
        Self::from_terms(
            self.variables,
            self.terms
                .iter()
                .filter(|term| term.exponents[variable] != 0)
                .map(|term| {
                    let mut exponents = term.exponents.clone();
                    let power = exponents[variable];
                    exponents[variable] -= 1;

                    Term {
                        coefficient: term.coefficient * C::from(f64::from(power)),
                        exponents,
                    }
                }),
        )
    }
}

impl Polynomial<f64> {
    /// Substitutes the values of all variables starting at `dimension` by `parameters` and
    /// returns a polynomial in the first `dimension` variables with complex coefficients.
    pub fn bind(
        &self,
        dimension: usize,
        parameters: &[Complex64],
    ) -> Result<Polynomial<Complex64>> {
        if dimension + parameters.len() != self.variables {
            return Err(Error::ParameterMismatch {
                kind: "symbolic",
                expected: self.variables - dimension.min(self.variables),
                found: parameters.len(),
            });
        }

        Ok(Polynomial::from_terms(
            dimension,
            self.terms.iter().map(|term| {
                let (integration, symbols) = term.exponents.split_at(dimension);
                let coefficient = symbols
                    .iter()
                    .zip(parameters)
                    .fold(Complex64::new(term.coefficient, 0.0), |acc, (&e, p)| {
                        acc * p.powu(e)
                    });

                Term {
                    coefficient,
                    exponents: integration.to_vec(),
                }
            }),
        ))
    }
}

impl<'a, C> Add<&'a Polynomial<C>> for &'a Polynomial<C>
where
    C: Copy + Zero + Add<Output = C> + Mul<Output = C>,
{
    type Output = Polynomial<C>;

    fn add(self, other: &'a Polynomial<C>) -> Polynomial<C> {
        debug_assert_eq!(self.variables, other.variables);
        Polynomial::from_terms(
            self.variables,
            self.terms.iter().chain(other.terms.iter()).cloned(),
        )
    }
}

impl<'a, C> Mul<&'a Polynomial<C>> for &'a Polynomial<C>
where
    C: Copy + Zero + Add<Output = C> + Mul<Output = C>,
{
    type Output = Polynomial<C>;

    fn mul(self, other: &'a Polynomial<C>) -> Polynomial<C> {
        debug_assert_eq!(self.variables, other.variables);
        Polynomial::from_terms(
            self.variables,
            self.terms.iter().flat_map(|lhs| {
                other.terms.iter().map(move |rhs| Term {
                    coefficient: lhs.coefficient * rhs.coefficient,
                    exponents: lhs
                        .exponents
                        .iter()
                        .zip(&rhs.exponents)
                        .map(|(a, b)| a + b)
                        .collect(),
                })
            }),
        )
    }
}

impl<C> Neg for Polynomial<C>
where
    C: Neg<Output = C>,
{
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            variables: self.variables,
            terms: self
                .terms
                .into_iter()
                .map(|term| Term {
                    coefficient: -term.coefficient,
                    exponents: term.exponents,
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Num(f64),
    Symbol(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Lp,
    Rp,
}

fn lex(src: &str) -> std::result::Result<Vec<Token>, String> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut index = 0usize;

    while index < bytes.len() {
        let b = bytes[index];

        if (b as char).is_whitespace() {
            index += 1;
            continue;
        }

        match b {
            b'(' => {
                tokens.push(Token::Lp);
                index += 1;
            }
            b')' => {
                tokens.push(Token::Rp);
                index += 1;
            }
            b'+' => {
                tokens.push(Token::Plus);
                index += 1;
            }
            b'-' => {
                tokens.push(Token::Minus);
                index += 1;
            }
            b'*' => {
                if index + 1 < bytes.len() && bytes[index + 1] == b'*' {
                    tokens.push(Token::Caret);
                    index += 2;
                } else {
                    tokens.push(Token::Star);
                    index += 1;
                }
            }
            b'/' => {
                tokens.push(Token::Slash);
                index += 1;
            }
            b'^' => {
                tokens.push(Token::Caret);
                index += 1;
            }
            b'0'..=b'9' | b'.' => {
                let start = index;
                index += 1;
                while index < bytes.len() && (bytes[index].is_ascii_digit() || bytes[index] == b'.')
                {
                    index += 1;
                }
                // scientific notation, e.g. `1e-5`
                if index < bytes.len() && (bytes[index] == b'e' || bytes[index] == b'E') {
                    let mut end = index + 1;
                    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
                        end += 1;
                    }
                    if end < bytes.len() && bytes[end].is_ascii_digit() {
                        index = end;
                        while index < bytes.len() && bytes[index].is_ascii_digit() {
                            index += 1;
                        }
                    }
                }
                let number = src[start..index]
                    .parse::<f64>()
                    .map_err(|_| format!("invalid number `{}`", &src[start..index]))?;
                tokens.push(Token::Num(number));
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                let start = index;
                index += 1;
                while index < bytes.len()
                    && (bytes[index].is_ascii_alphanumeric() || bytes[index] == b'_')
                {
                    index += 1;
                }
                tokens.push(Token::Symbol(src[start..index].to_string()));
            }
            _ => return Err(format!("unexpected character `{}` at {}", b as char, index)),
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    index: usize,
    symbols: &'a [&'a str],
}

impl<'a> Parser<'a> {
    fn parse_expr(&mut self) -> std::result::Result<Polynomial<f64>, String> {
        let mut lhs = self.parse_term()?;
        loop {
            let negate = match self.peek() {
                Some(Token::Plus) => false,
                Some(Token::Minus) => true,
                _ => break,
            };
            self.next();
            let rhs = self.parse_term()?;
            lhs = if negate { &lhs + &-rhs } else { &lhs + &rhs };
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> std::result::Result<Polynomial<f64>, String> {
        let mut lhs = self.parse_factor()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.next();
                    let rhs = self.parse_factor()?;
                    lhs = &lhs * &rhs;
                }
                Some(Token::Slash) => {
                    self.next();
                    let rhs = self.parse_factor()?;
                    let divisor = rhs
                        .constant_value()
                        .ok_or_else(|| "division by a non-constant expression".to_string())?;
                    if divisor == 0.0 {
                        return Err("division by zero".to_string());
                    }
                    lhs = lhs.scale(1.0 / divisor);
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    fn parse_factor(&mut self) -> std::result::Result<Polynomial<f64>, String> {
        match self.peek() {
            Some(Token::Plus) => {
                self.next();
                self.parse_factor()
            }
            Some(Token::Minus) => {
                self.next();
                Ok(-self.parse_factor()?)
            }
            _ => {
                let base = self.parse_base()?;
                if matches!(self.peek(), Some(Token::Caret)) {
                    self.next();
                    let exponent = self.parse_exponent()?;
                    Ok(base.pow(exponent))
                } else {
                    Ok(base)
                }
            }
        }
    }

    fn parse_exponent(&mut self) -> std::result::Result<u32, String> {
        let parenthesized = matches!(self.peek(), Some(Token::Lp));
        if parenthesized {
            self.next();
        }
        let exponent = match self.next() {
            Some(Token::Num(n)) if n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX) => {
                n as u32
            }
            Some(token) => {
                return Err(format!(
                    "expected a non-negative integer exponent, found {:?}",
                    token
                ))
            }
            None => return Err("expected an exponent".to_string()),
        };
        if parenthesized {
            self.expect(Token::Rp)?;
        }
        Ok(exponent)
    }

    fn parse_base(&mut self) -> std::result::Result<Polynomial<f64>, String> {
        let variables = self.symbols.len();

        match self.next() {
            Some(Token::Num(value)) => Ok(Polynomial::constant(variables, value)),
            Some(Token::Symbol(name)) => self
                .symbols
                .iter()
                .position(|&symbol| symbol == name)
                .map(|index| Polynomial::variable(variables, index))
                .ok_or_else(|| format!("unknown symbol `{}`", name)),
            Some(Token::Lp) => {
                let inner = self.parse_expr()?;
                self.expect(Token::Rp)?;
                Ok(inner)
            }
            Some(token) => Err(format!("unexpected token {:?}", token)),
            None => Err("unexpected end of expression".to_string()),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn expect(&mut self, want: Token) -> std::result::Result<(), String> {
        match self.next() {
            Some(token) if token == want => Ok(()),
            Some(token) => Err(format!("expected {:?}, found {:?}", want, token)),
            None => Err(format!("expected {:?}, found end of expression", want)),
        }
    }
}

/// Parses `expression` into a polynomial whose `i`-th variable is `symbols[i]`. Supported are
/// numbers, symbols, parentheses, `+`, `-`, `*`, division by constants and non-negative integer
/// powers written as `^` or `**`. A trailing `;` is ignored.
pub fn parse(expression: &str, symbols: &[&str]) -> Result<Polynomial<f64>> {
    let error = |reason: String| Error::Parse {
        expression: expression.to_string(),
        reason,
    };

    let source = expression.trim().trim_end_matches(';');
    let tokens = lex(source).map_err(error)?;

    if tokens.is_empty() {
        return Err(error("empty expression".to_string()));
    }

    let mut parser = Parser {
        tokens,
        index: 0,
        symbols,
    };
    let polynomial = parser.parse_expr().map_err(error)?;

    if let Some(token) = parser.peek() {
        return Err(error(format!("unexpected trailing token {:?}", token)));
    }

    Ok(polynomial)
}
