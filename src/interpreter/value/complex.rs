use std::ops::{Add, Div, Mul, Neg, Sub};

/// A complex number backed by a pair of `f64` components.
///
/// Every number in the language is one of these; a value with a zero
/// imaginary part behaves as a real throughout the engine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex {
    /// The real component.
    pub re: f64,
    /// The imaginary component.
    pub im: f64,
}

impl Complex {
    /// `0 + 0i`
    pub const ZERO: Self = Self { re: 0.0, im: 0.0 };
    /// `1 + 0i`
    pub const ONE: Self = Self { re: 1.0, im: 0.0 };
    /// `0 + 1i`
    pub const I: Self = Self { re: 0.0, im: 1.0 };

    /// Creates a complex number from both components.
    #[must_use]
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Creates a real.
    #[must_use]
    pub const fn real(re: f64) -> Self {
        Self { re, im: 0.0 }
    }

    /// Creates a purely imaginary number.
    #[must_use]
    pub const fn imaginary(im: f64) -> Self {
        Self { re: 0.0, im }
    }

    /// Whether the imaginary part is zero (including negative zero).
    #[must_use]
    pub fn is_real(&self) -> bool {
        self.im == 0.0
    }

    /// Whether this is a finite whole real.
    #[must_use]
    pub fn is_integral_real(&self) -> bool {
        self.is_real() && self.re.is_finite() && self.re.fract() == 0.0
    }

    /// Whether either component is zero-distance from zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.re == 0.0 && self.im == 0.0
    }

    /// The modulus `|z|`, computed as a hypotenuse to avoid intermediate
    /// overflow.
    #[must_use]
    pub fn abs(&self) -> f64 {
        self.re.hypot(self.im)
    }

    /// The complex conjugate.
    #[must_use]
    pub const fn conj(&self) -> Self {
        Self { re: self.re,
               im: -self.im }
    }

    /// The multiplicative inverse. Division by zero follows IEEE: the
    /// components come out non-finite rather than raising an error.
    #[must_use]
    pub fn recip(&self) -> Self {
        let denom = self.re * self.re + self.im * self.im;
        Self { re: self.re / denom,
               im: -self.im / denom }
    }

    /// Component-wise floor.
    #[must_use]
    pub fn floor(&self) -> Self {
        Self { re: self.re.floor(),
               im: self.im.floor() }
    }

    /// `e^z`.
    #[must_use]
    pub fn exp(&self) -> Self {
        let scale = self.re.exp();
        Self { re: scale * self.im.cos(),
               im: scale * self.im.sin() }
    }

    /// Principal natural logarithm.
    #[must_use]
    pub fn ln(&self) -> Self {
        Self { re: self.abs().ln(),
               im: self.im.atan2(self.re) }
    }

    /// `self ** exponent`.
    ///
    /// Real base and exponent take the `f64` fast path, so integral results
    /// stay exact (`2 ** 10 == 1024`, not `1023.999…`). `0 ** 0` is `1`.
    /// Everything else goes through `exp(b · ln(a))`.
    #[must_use]
    pub fn pow(&self, exponent: &Self) -> Self {
        if exponent.is_zero() {
            return Self::ONE;
        }
        if self.is_zero() {
            return Self::ZERO;
        }
        if self.is_real() && exponent.is_real() && (self.re >= 0.0 || exponent.re.fract() == 0.0) {
            return Self::real(self.re.powf(exponent.re));
        }
        (*exponent * self.ln()).exp()
    }

    /// Formats an integral real in the given radix (2..=36), uppercase
    /// digits, `-` prefix for negatives.
    ///
    /// Returns `None` for non-integral or non-real values and unsupported
    /// radixes.
    ///
    /// # Example
    /// ```
    /// use argand::interpreter::value::complex::Complex;
    ///
    /// let z = Complex::real(255.0);
    /// assert_eq!(z.format_radix(16).unwrap(), "FF");
    /// assert_eq!(Complex::real(-5.0).format_radix(2).unwrap(), "-101");
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn format_radix(&self, radix: u32) -> Option<String> {
        if !self.is_integral_real() || !(2..=36).contains(&radix) {
            return None;
        }
        if self.re.abs() > crate::util::num::MAX_SAFE_INT {
            return None;
        }
        let negative = self.re < 0.0;
        let mut magnitude = self.re.abs() as u64;
        if magnitude == 0 {
            return Some("0".to_string());
        }
        let mut digits = Vec::new();
        while magnitude > 0 {
            let digit = (magnitude % u64::from(radix)) as u32;
            digits.push(char::from_digit(digit, radix)?.to_ascii_uppercase());
            magnitude /= u64::from(radix);
        }
        if negative {
            digits.push('-');
        }
        Some(digits.iter().rev().collect())
    }
}

impl Add for Complex {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self { re: self.re + rhs.re,
               im: self.im + rhs.im }
    }
}

impl Sub for Complex {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self { re: self.re - rhs.re,
               im: self.im - rhs.im }
    }
}

impl Mul for Complex {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self { re: self.re * rhs.re - self.im * rhs.im,
               im: self.re * rhs.im + self.im * rhs.re }
    }
}

impl Div for Complex {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        if rhs.is_real() {
            // Avoids spurious NaN components in the common real case.
            return Self { re: self.re / rhs.re,
                          im: self.im / rhs.re };
        }
        self * rhs.recip()
    }
}

impl Neg for Complex {
    type Output = Self;

    fn neg(self) -> Self {
        Self { re: -self.re,
               im: -self.im }
    }
}

impl From<f64> for Complex {
    fn from(re: f64) -> Self {
        Self::real(re)
    }
}

/// Renders a real component the way the language prints numbers: `nan`,
/// `inf` and `-inf` spelled exactly so, whole values without a decimal
/// point.
pub fn fmt_real(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    #[allow(clippy::cast_possible_truncation)]
    if value.fract() == 0.0 && value.abs() <= crate::util::num::MAX_SAFE_INT {
        return format!("{}", value as i64);
    }
    format!("{value}")
}

impl std::fmt::Display for Complex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_real() {
            return write!(f, "{}", fmt_real(self.re));
        }
        if self.re == 0.0 {
            return write!(f, "{}i", fmt_real(self.im));
        }
        if self.im < 0.0 || (self.im == 0.0 && self.im.is_sign_negative()) {
            write!(f, "{} - {}i", fmt_real(self.re), fmt_real(-self.im))
        } else {
            write!(f, "{} + {}i", fmt_real(self.re), fmt_real(self.im))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Complex;

    #[test]
    fn arithmetic() {
        let a = Complex::new(1.0, 2.0);
        let b = Complex::new(3.0, -1.0);
        assert_eq!(a + b, Complex::new(4.0, 1.0));
        assert_eq!(a * b, Complex::new(5.0, 5.0));
        assert_eq!(-a, Complex::new(-1.0, -2.0));
    }

    #[test]
    fn division_by_conjugate_is_real() {
        let a = Complex::new(2.0, 3.0);
        let q = a / a;
        assert!((q.re - 1.0).abs() < 1e-12);
        assert!(q.im.abs() < 1e-12);
    }

    #[test]
    fn integral_pow_is_exact() {
        let two = Complex::real(2.0);
        let ten = Complex::real(10.0);
        assert_eq!(two.pow(&ten), Complex::real(1024.0));
        assert_eq!(Complex::ZERO.pow(&Complex::ZERO), Complex::ONE);
    }

    #[test]
    fn imaginary_pow_goes_through_the_log() {
        // i^2 = -1
        let squared = Complex::I.pow(&Complex::real(2.0));
        assert!((squared.re + 1.0).abs() < 1e-12);
        assert!(squared.im.abs() < 1e-12);
    }

    #[test]
    fn display_forms() {
        assert_eq!(Complex::real(7.0).to_string(), "7");
        assert_eq!(Complex::real(2.5).to_string(), "2.5");
        assert_eq!(Complex::new(2.0, 3.0).to_string(), "2 + 3i");
        assert_eq!(Complex::new(2.0, -3.0).to_string(), "2 - 3i");
        assert_eq!(Complex::imaginary(1.0).to_string(), "1i");
        assert_eq!(Complex::real(f64::NAN).to_string(), "nan");
        assert_eq!(Complex::real(f64::NEG_INFINITY).to_string(), "-inf");
    }

    #[test]
    fn radix_round_trip() {
        use crate::interpreter::lexer::number::scan_number;

        for value in [0.0, 1.0, 255.0, 65516.0, 1024.0] {
            let formatted = Complex::real(value).format_radix(16).unwrap();
            let (scanned, _) = scan_number(&format!("0x{formatted}")).unwrap();
            assert_eq!(scanned.value, value);
        }
    }

    #[test]
    fn radix_rejects_fractional() {
        assert!(Complex::real(1.5).format_radix(2).is_none());
        assert!(Complex::new(1.0, 1.0).format_radix(16).is_none());
    }
}
