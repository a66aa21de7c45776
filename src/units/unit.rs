//! Dimensions and units

use std::fmt;

/// Relative tolerance used when comparing scale factors and magnitudes
pub(crate) const REL_TOLERANCE: f64 = 1e-12;

/// Approximate float equality with a relative tolerance, exact for infinities
pub(crate) fn approx_eq(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    (a - b).abs() <= REL_TOLERANCE * a.abs().max(b.abs())
}

/// Exponents of the seven SI base dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimensions {
    pub length: i8,
    pub mass: i8,
    pub time: i8,
    pub current: i8,
    pub temperature: i8,
    pub amount: i8,
    pub luminosity: i8,
}

impl Dimensions {
    pub const DIMENSIONLESS: Self = Self::new([0, 0, 0, 0, 0, 0, 0]);
    pub const LENGTH: Self = Self::new([1, 0, 0, 0, 0, 0, 0]);
    pub const MASS: Self = Self::new([0, 1, 0, 0, 0, 0, 0]);
    pub const TIME: Self = Self::new([0, 0, 1, 0, 0, 0, 0]);
    pub const CURRENT: Self = Self::new([0, 0, 0, 1, 0, 0, 0]);
    pub const TEMPERATURE: Self = Self::new([0, 0, 0, 0, 1, 0, 0]);
    pub const AMOUNT: Self = Self::new([0, 0, 0, 0, 0, 1, 0]);
    pub const LUMINOSITY: Self = Self::new([0, 0, 0, 0, 0, 0, 1]);

    /// Build dimensions from exponents ordered as
    /// length, mass, time, current, temperature, amount, luminosity
    pub const fn new(exponents: [i8; 7]) -> Self {
        Self {
            length: exponents[0],
            mass: exponents[1],
            time: exponents[2],
            current: exponents[3],
            temperature: exponents[4],
            amount: exponents[5],
            luminosity: exponents[6],
        }
    }

    /// Exponents in the same order as [`Dimensions::new`]
    pub const fn exponents(&self) -> [i8; 7] {
        [
            self.length,
            self.mass,
            self.time,
            self.current,
            self.temperature,
            self.amount,
            self.luminosity,
        ]
    }

    pub fn is_dimensionless(&self) -> bool {
        *self == Self::DIMENSIONLESS
    }

    /// Raise every exponent to an integer power, `None` if an exponent
    /// leaves the `i8` range
    pub fn checked_powi(self, power: i32) -> Option<Self> {
        let mut exps = self.exponents();
        for exp in exps.iter_mut() {
            *exp = i8::try_from((*exp as i32).checked_mul(power)?).ok()?;
        }
        Some(Self::new(exps))
    }

    /// Dimensions of a product, `None` on exponent overflow
    pub fn checked_mul(self, rhs: Self) -> Option<Self> {
        self.zip_exponents(rhs, i8::checked_add)
    }

    /// Dimensions of a quotient, `None` on exponent overflow
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        self.zip_exponents(rhs, i8::checked_sub)
    }

    fn zip_exponents(self, rhs: Self, op: fn(i8, i8) -> Option<i8>) -> Option<Self> {
        let (a, b) = (self.exponents(), rhs.exponents());
        let mut out = [0i8; 7];
        for i in 0..7 {
            out[i] = op(a[i], b[i])?;
        }
        Some(Self::new(out))
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SYMBOLS: [&str; 7] = ["[length]", "[mass]", "[time]", "[current]", "[temperature]", "[substance]", "[luminosity]"];

        if self.is_dimensionless() {
            return write!(f, "dimensionless");
        }

        let parts: Vec<String> = self
            .exponents()
            .iter()
            .zip(SYMBOLS.iter())
            .filter(|(exp, _)| **exp != 0)
            .map(|(exp, sym)| {
                if *exp == 1 {
                    sym.to_string()
                } else {
                    format!("{}^{}", sym, exp)
                }
            })
            .collect();
        write!(f, "{}", parts.join(" * "))
    }
}

/// A physical unit: a display symbol, a scale factor to coherent SI, and its dimensions
#[derive(Debug, Clone)]
pub struct Unit {
    symbol: String,
    factor: f64,
    dims: Dimensions,
}

impl Unit {
    /// Create a unit from its parts
    ///
    /// `factor` is the number of coherent SI units in one of this unit, e.g.
    /// `0.01` for centimetre or `1.602176634e-19` for electron volt.
    pub fn new(symbol: &str, factor: f64, dims: Dimensions) -> Self {
        Self {
            symbol: symbol.to_string(),
            factor,
            dims,
        }
    }

    /// The pure-number unit
    pub fn dimensionless() -> Self {
        Self::new("dimensionless", 1.0, Dimensions::DIMENSIONLESS)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn dims(&self) -> Dimensions {
        self.dims
    }

    pub fn is_dimensionless(&self) -> bool {
        self.dims.is_dimensionless()
    }

    /// Whether quantities in `other` can be converted into this unit
    pub fn is_compatible_with(&self, other: &Unit) -> bool {
        self.dims == other.dims
    }

    /// Multiplier taking a magnitude in `self` to a magnitude in `other`
    pub fn conversion_factor(&self, other: &Unit) -> Option<f64> {
        if self.is_compatible_with(other) {
            Some(self.factor / other.factor)
        } else {
            None
        }
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.dims == other.dims && approx_eq(self.factor, other.factor)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}
