use std::fmt;
use std::num::{IntErrorKind, ParseIntError};
use std::str::FromStr;

/// An error that can occur when converting a scalar into the requested type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScalarError {
    /// The given string did not contain only numbers
    #[error("did not contain all digits: {0}")]
    AllDigits(String),

    /// The given string caused an overflow when calculating its numerical value
    #[error("caused an overflow: {0}")]
    Overflow(String),

    /// The given string was not a recognized boolean value
    #[error("is not a valid bool: {0}")]
    InvalidBool(String),

    /// The given string was not a recognized floating point value
    #[error("is not a valid float: {0}")]
    InvalidFloat(String),
}

/// A single raw INI value.
///
/// Values are stored as text in the parse tree and only converted when they are bound to a
/// typed destination.
///
/// ```
/// use inibind::Scalar;
///
/// let v1 = Scalar::new("143");
/// assert_eq!(v1.to_u64(), Ok(143));
/// assert_eq!(v1.as_str(), "143");
/// ```
#[derive(PartialEq, Eq, Copy, Clone)]
pub struct Scalar<'a> {
    data: &'a str,
}

impl<'a> Scalar<'a> {
    /// Create a new scalar backed by the raw text
    pub fn new(data: &'a str) -> Scalar<'a> {
        Scalar { data }
    }

    /// View the underlying text
    pub fn as_str(&self) -> &'a str {
        self.data
    }

    /// Try converting the scalar to f64
    ///
    /// ```
    /// use inibind::Scalar;
    ///
    /// assert_eq!(Scalar::new("12.34").to_f64(), Ok(12.34));
    /// assert_eq!(Scalar::new("1e3").to_f64(), Ok(1000.0));
    /// ```
    pub fn to_f64(&self) -> Result<f64, ScalarError> {
        self.data
            .parse::<f64>()
            .map_err(|_| ScalarError::InvalidFloat(self.data.to_owned()))
    }

    /// Try converting the scalar to f32
    pub fn to_f32(&self) -> Result<f32, ScalarError> {
        self.data
            .parse::<f32>()
            .map_err(|_| ScalarError::InvalidFloat(self.data.to_owned()))
    }

    /// Try converting the scalar to a bool.
    ///
    /// Accepts `true` / `false` along with the short forms `1`, `0`, `t`, `f` and their
    /// upper and title case spellings.
    ///
    /// ```
    /// use inibind::Scalar;
    ///
    /// assert_eq!(Scalar::new("true").to_bool(), Ok(true));
    /// assert_eq!(Scalar::new("F").to_bool(), Ok(false));
    /// assert!(Scalar::new("yes").to_bool().is_err());
    /// ```
    pub fn to_bool(&self) -> Result<bool, ScalarError> {
        match self.data {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            x => Err(ScalarError::InvalidBool(x.to_owned())),
        }
    }

    /// Try converting the scalar to i64
    pub fn to_i64(&self) -> Result<i64, ScalarError> {
        self.to_int()
    }

    /// Try converting the scalar to u64
    pub fn to_u64(&self) -> Result<u64, ScalarError> {
        self.to_int()
    }

    /// Try converting the scalar to any base 10 integer type. Values that don't fit in the
    /// requested type are reported as an overflow.
    ///
    /// ```
    /// use inibind::{Scalar, ScalarError};
    ///
    /// assert_eq!(Scalar::new("-100").to_int::<i8>(), Ok(-100));
    /// assert_eq!(
    ///     Scalar::new("300").to_int::<u8>(),
    ///     Err(ScalarError::Overflow(String::from("300")))
    /// );
    /// ```
    pub fn to_int<T>(&self) -> Result<T, ScalarError>
    where
        T: FromStr<Err = ParseIntError>,
    {
        self.data.parse::<T>().map_err(|e| match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                ScalarError::Overflow(self.data.to_owned())
            }
            _ => ScalarError::AllDigits(self.data.to_owned()),
        })
    }
}

impl fmt::Debug for Scalar<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scalar {{ {} }}", self)
    }
}

impl fmt::Display for Scalar<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use rstest::rstest;

    #[rstest]
    #[case("1", true)]
    #[case("t", true)]
    #[case("T", true)]
    #[case("TRUE", true)]
    #[case("true", true)]
    #[case("True", true)]
    #[case("0", false)]
    #[case("f", false)]
    #[case("F", false)]
    #[case("FALSE", false)]
    #[case("false", false)]
    #[case("False", false)]
    fn scalar_to_bool(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(Scalar::new(input).to_bool(), Ok(expected));
    }

    #[test]
    fn scalar_to_bool_rejects_other_words() {
        assert_eq!(
            Scalar::new("yes").to_bool(),
            Err(ScalarError::InvalidBool(String::from("yes")))
        );
        assert!(Scalar::new("tRUE").to_bool().is_err());
        assert!(Scalar::new("").to_bool().is_err());
    }

    #[test]
    fn scalar_to_f64() {
        assert_eq!(Scalar::new("0").to_f64(), Ok(0.0));
        assert_eq!(Scalar::new("-1").to_f64(), Ok(-1.0));
        assert_eq!(Scalar::new("12.34").to_f64(), Ok(12.34));
        assert_eq!(Scalar::new("-1.50000").to_f64(), Ok(-1.5));
        assert_eq!(Scalar::new("2.5e-3").to_f64(), Ok(0.0025));
        assert_eq!(Scalar::new("1E6").to_f64(), Ok(1_000_000.0));
        assert!(Scalar::new("12,34").to_f64().is_err());
        assert!(Scalar::new("").to_f64().is_err());
    }

    #[test]
    fn scalar_to_i64() {
        assert_eq!(Scalar::new("0").to_i64(), Ok(0));
        assert_eq!(Scalar::new("-1").to_i64(), Ok(-1));
        assert_eq!(Scalar::new("+17").to_i64(), Ok(17));
        assert_eq!(Scalar::new("-20405029553322").to_i64(), Ok(-20405029553322));
        assert_eq!(
            Scalar::new("0x10").to_i64(),
            Err(ScalarError::AllDigits(String::from("0x10")))
        );
    }

    #[test]
    fn scalar_to_u64() {
        assert_eq!(Scalar::new("1234").to_u64(), Ok(1234));
        assert_eq!(
            Scalar::new("-1").to_u64(),
            Err(ScalarError::AllDigits(String::from("-1")))
        );
    }

    #[test]
    fn scalar_to_u64_overflow() {
        assert_eq!(
            Scalar::new("888888888888888888888888888888888").to_u64(),
            Err(ScalarError::Overflow(String::from(
                "888888888888888888888888888888888"
            )))
        );
        assert!(matches!(
            Scalar::new("-129").to_int::<i8>(),
            Err(ScalarError::Overflow(_))
        ));
    }

    #[test]
    fn scalar_empty_string() {
        let s = Scalar::new("");
        assert!(s.to_bool().is_err());
        assert!(s.to_f64().is_err());
        assert!(s.to_i64().is_err());
        assert!(s.to_u64().is_err());
    }

    #[quickcheck]
    fn i64_display_parses_back(x: i64) -> bool {
        Scalar::new(&x.to_string()).to_i64() == Ok(x)
    }

    #[quickcheck]
    fn f64_display_parses_back(x: f64) -> bool {
        let text = x.to_string();
        match Scalar::new(&text).to_f64() {
            Ok(y) => y == x || (x.is_nan() && y.is_nan()),
            Err(_) => false,
        }
    }
}
