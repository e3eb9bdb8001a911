/// The payload of a numeric literal token.
///
/// A literal is either purely real or purely imaginary; complex values with
/// both components are built by arithmetic (`2 + 3i` is an addition).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScannedNumber {
    /// Magnitude of the literal.
    pub value:     f64,
    /// Whether the literal carried the `i` suffix.
    pub imaginary: bool,
}

/// Outcome of [`scan_number`]: the token payload and how many bytes of the
/// input it consumed.
pub type ScanOutcome = Result<(ScannedNumber, usize), String>;

const fn digit_value(c: char, radix: u32) -> Option<u32> {
    match c.to_digit(36) {
        Some(d) if d < radix => Some(d),
        _ => None,
    }
}

/// Scans a numeric literal from the start of `text`.
///
/// Grammar:
/// - optional radix prefix `0x` (16), `0b` (2), `0o` (8) or `0d` (10),
///   honored only when a valid digit for that radix follows;
/// - a digit run, where single `_` separators are allowed if flanked by
///   digits on both sides;
/// - an optional fraction `.` + digit run, honored only when a valid digit
///   follows the dot (so `5.prop` stays a member access);
/// - for decimal literals, an optional exponent `e`/`E` with optional sign
///   and a decimal digit run — if no digit follows, the scan resets to just
///   before the `e` rather than failing;
/// - an optional imaginary suffix `i`, honored only when no identifier
///   character follows (so `5in list` is a membership test).
///
/// The scan is committed once the first digit is consumed: a misplaced
/// separator after that point is an error, not a shorter literal. Text with
/// no digit at all (a bare `.`, `_` or exponent) never reaches this scanner;
/// the lexer only dispatches here on a leading digit or `.` + digit.
///
/// # Returns
/// The scanned payload and the number of bytes consumed, or a message
/// describing the malformation.
///
/// # Example
/// ```
/// use argand::interpreter::lexer::number::scan_number;
///
/// let (num, len) = scan_number("0xFF_EC + 1").unwrap();
/// assert_eq!(num.value, 65516.0);
/// assert_eq!(len, 7);
///
/// let (num, _) = scan_number("2.5e3i").unwrap();
/// assert!(num.imaginary);
/// assert_eq!(num.value, 2500.0);
/// ```
pub fn scan_number(text: &str) -> ScanOutcome {
    let chars: Vec<char> = text.chars().collect();
    let mut pos = 0;

    let radix = scan_radix_prefix(&chars, &mut pos);

    let int_start = pos;
    let int_part = scan_digit_run(&chars, &mut pos, radix)?;
    // Separator-free text of the literal; decimal values are converted
    // from it in one step at the end, because scaling an accumulated
    // mantissa by powers of ten picks up rounding error.
    let mut literal: String = chars[int_start..pos].iter().filter(|c| **c != '_').collect();

    let mut value = int_part.unwrap_or(0.0);
    let mut any_digits = int_part.is_some();

    // Fraction, only when a digit follows the dot.
    if pos < chars.len()
       && chars[pos] == '.'
       && pos + 1 < chars.len()
       && digit_value(chars[pos + 1], radix).is_some()
    {
        pos += 1;
        let start = pos;
        if let Some(frac) = scan_digit_run(&chars, &mut pos, radix)? {
            let places = count_digits(&chars[start..pos]);
            value += frac / f64::from(radix).powi(places);
            literal.push('.');
            literal.extend(chars[start..pos].iter().filter(|c| **c != '_'));
            any_digits = true;
        }
    }

    if !any_digits {
        return Err("literal contains no digits".to_string());
    }

    // Exponent, decimal literals only.
    if radix == 10
       && pos < chars.len()
       && (chars[pos] == 'e' || chars[pos] == 'E')
    {
        let reset = pos;
        pos += 1;
        let mut negative = false;
        if pos < chars.len() && (chars[pos] == '+' || chars[pos] == '-') {
            negative = chars[pos] == '-';
            pos += 1;
        }
        let exp_start = pos;
        match scan_digit_run(&chars, &mut pos, 10) {
            Ok(Some(_)) => {
                literal.push('e');
                if negative {
                    literal.push('-');
                }
                literal.extend(chars[exp_start..pos].iter().filter(|c| **c != '_'));
            },
            // No digits after `e`: the `e` belongs to the next token.
            Ok(None) | Err(_) => pos = reset,
        }
    }

    if radix == 10 {
        value = literal.parse()
                       .map_err(|_| format!("malformed numeric literal '{literal}'"))?;
    }

    // Imaginary suffix, unless the `i` starts an identifier.
    let mut imaginary = false;
    if pos < chars.len() && chars[pos] == 'i' {
        let next = chars.get(pos + 1);
        if !next.is_some_and(|c| c.is_ascii_alphanumeric() || *c == '_') {
            imaginary = true;
            pos += 1;
        }
    }

    let consumed: usize = chars[..pos].iter().map(|c| c.len_utf8()).sum();
    Ok((ScannedNumber { value, imaginary }, consumed))
}

/// Recognizes `0x`/`0b`/`0o`/`0d` at `pos` and returns the radix, advancing
/// past the prefix. Defaults to 10 and consumes nothing when no prefix (or a
/// prefix with no following digit) is present.
fn scan_radix_prefix(chars: &[char], pos: &mut usize) -> u32 {
    if chars.get(*pos) != Some(&'0') {
        return 10;
    }
    let radix = match chars.get(*pos + 1) {
        Some('x') => 16,
        Some('b') => 2,
        Some('o') => 8,
        Some('d') => 10,
        _ => return 10,
    };
    match chars.get(*pos + 2) {
        Some(c) if digit_value(*c, radix).is_some() => {
            *pos += 2;
            radix
        },
        _ => 10,
    }
}

/// Consumes a run of digits with embedded `_` separators, returning its
/// value, or `None` when no digit is present at `pos`.
///
/// A separator must have a digit on both sides; anything else is an error.
fn scan_digit_run(chars: &[char], pos: &mut usize, radix: u32) -> Result<Option<f64>, String> {
    let mut value: Option<f64> = None;
    loop {
        match chars.get(*pos) {
            Some(c) if digit_value(*c, radix).is_some() => {
                let digit = f64::from(digit_value(*c, radix).unwrap_or(0));
                value = Some(value.unwrap_or(0.0) * f64::from(radix) + digit);
                *pos += 1;
            },
            Some('_') => {
                if value.is_none() {
                    return Err("separator '_' must follow a digit".to_string());
                }
                match chars.get(*pos + 1) {
                    Some(c) if digit_value(*c, radix).is_some() => *pos += 1,
                    Some('_') => return Err("doubled separator '__'".to_string()),
                    _ => return Err("separator '_' must precede a digit".to_string()),
                }
            },
            _ => break,
        }
    }
    Ok(value)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn count_digits(chars: &[char]) -> i32 {
    chars.iter().filter(|c| **c != '_').count() as i32
}

#[cfg(test)]
mod tests {
    use super::scan_number;

    fn value_of(text: &str) -> f64 {
        scan_number(text).unwrap().0.value
    }

    #[test]
    fn plain_decimal() {
        assert_eq!(value_of("42"), 42.0);
        assert_eq!(value_of("2.5"), 2.5);
        assert_eq!(value_of(".5"), 0.5);
    }

    #[test]
    fn radix_prefixes() {
        assert_eq!(value_of("0xFF"), 255.0);
        assert_eq!(value_of("0b1011"), 11.0);
        assert_eq!(value_of("0o17"), 15.0);
        assert_eq!(value_of("0d12"), 12.0);
    }

    #[test]
    fn prefix_needs_a_digit() {
        // `0x` with no hex digit is the literal 0; `x` is the next token.
        let (num, len) = scan_number("0x").unwrap();
        assert_eq!(num.value, 0.0);
        assert_eq!(len, 1);
    }

    #[test]
    fn radix_digits_stop_at_invalid() {
        // `2` is not a binary digit, so only `0b1` is consumed.
        let (num, len) = scan_number("0b12").unwrap();
        assert_eq!(num.value, 1.0);
        assert_eq!(len, 3);
    }

    #[test]
    fn separators() {
        assert_eq!(value_of("1_000_000"), 1_000_000.0);
        assert_eq!(value_of("0xFF_EC"), 65516.0);
        assert!(scan_number("1__0").is_err());
        assert!(scan_number("1_").is_err());
        assert!(scan_number("1_.5").is_err());
    }

    #[test]
    fn exponents() {
        assert_eq!(value_of("1e3"), 1000.0);
        assert_eq!(value_of("2.5E-1"), 0.25);
        // Scaling must round like the standard float parser does.
        assert_eq!(value_of("1.5e-1"), 0.15);
        assert_eq!(value_of("123.456e2"), 12345.6);
        // Dangling exponent resets: `1` is the literal, `e` the next token.
        let (num, len) = scan_number("1e+").unwrap();
        assert_eq!(num.value, 1.0);
        assert_eq!(len, 1);
    }

    #[test]
    fn hex_e_is_a_digit_not_an_exponent() {
        assert_eq!(value_of("0x1e5"), 485.0);
    }

    #[test]
    fn imaginary_suffix() {
        let (num, _) = scan_number("3i").unwrap();
        assert!(num.imaginary);
        assert_eq!(num.value, 3.0);
    }

    #[test]
    fn suffix_not_taken_from_identifiers() {
        // `5in` is the literal 5 followed by the `in` operator.
        let (num, len) = scan_number("5in list").unwrap();
        assert!(!num.imaginary);
        assert_eq!(num.value, 5.0);
        assert_eq!(len, 1);
    }

    #[test]
    fn member_access_on_literals_is_preserved() {
        let (_, len) = scan_number("5.floor").unwrap();
        assert_eq!(len, 1);
    }

    #[test]
    fn fractional_radix_digits() {
        assert_eq!(value_of("0b1.1"), 1.5);
        assert_eq!(value_of("0x0.8"), 0.5);
    }
}
