//! Per-kind formatting and parsing of array elements.

use std::fmt::Write;

use crate::ast::ElemKind;

/// A primitive that can appear in an array literal.
pub trait ArrayElement: Sized {
    const KIND: ElemKind;

    /// Append the unquoted textual form of `self`.
    fn write_element(&self, out: &mut String);
}

/// An element kind that can be read back from an array literal.
///
/// `Default` is the value an unparsable element decodes to.
pub trait DecodeElement: ArrayElement + Default {
    fn parse_element(s: &str) -> Option<Self>;
}

macro_rules! integer_elements {
    ($(($ty:ty, $kind:ident)),* $(,)?) => {
        $(
            impl ArrayElement for $ty {
                const KIND: ElemKind = ElemKind::$kind;

                fn write_element(&self, out: &mut String) {
                    out.push_str(itoa::Buffer::new().format(*self));
                }
            }
        )*
    };
}

macro_rules! float_elements {
    ($(($ty:ty, $kind:ident)),* $(,)?) => {
        $(
            impl ArrayElement for $ty {
                const KIND: ElemKind = ElemKind::$kind;

                fn write_element(&self, out: &mut String) {
                    if self.is_nan() {
                        out.push_str("NaN");
                    } else if self.is_infinite() {
                        out.push_str(if self.is_sign_negative() { "-Infinity" } else { "Infinity" });
                    } else {
                        // Display is the shortest round-trip form and never uses an exponent.
                        let _ = write!(out, "{}", self);
                    }
                }
            }
        )*
    };
}

/// Base-10 parse at the target width.
macro_rules! parsed_elements {
    ($($ty:ty),* $(,)?) => {
        $(
            impl DecodeElement for $ty {
                fn parse_element(s: &str) -> Option<Self> {
                    s.parse().ok()
                }
            }
        )*
    };
}

integer_elements! {
    (i8, Int8),
    (i16, Int16),
    (i32, Int32),
    (i64, Int64),
    (u8, Uint8),
    (u16, Uint16),
    (u32, Uint32),
    (u64, Uint64),
}

float_elements! {
    (f32, Float32),
    (f64, Float64),
}

// No u8: uint8 arrays are not decoded.
parsed_elements!(i8, i16, i32, i64, u16, u32, u64, f32, f64);

impl ArrayElement for bool {
    const KIND: ElemKind = ElemKind::Bool;

    fn write_element(&self, out: &mut String) {
        out.push_str(if *self { "true" } else { "false" });
    }
}

impl DecodeElement for bool {
    fn parse_element(s: &str) -> Option<Self> {
        match s {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
            _ => None,
        }
    }
}

impl ArrayElement for String {
    const KIND: ElemKind = ElemKind::String;

    fn write_element(&self, out: &mut String) {
        out.push_str(self);
    }
}

impl DecodeElement for String {
    fn parse_element(s: &str) -> Option<Self> {
        Some(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text<T: ArrayElement>(v: T) -> String {
        let mut out = String::new();
        v.write_element(&mut out);
        out
    }

    #[test]
    fn test_float_text_has_no_padding_or_exponent() {
        assert_eq!(text(1.5f64), "1.5");
        assert_eq!(text(2.0f64), "2");
        assert_eq!(text(0.1f32), "0.1");
        assert_eq!(text(1e21f64), "1000000000000000000000");
        assert_eq!(text(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(text(f32::NAN), "NaN");
    }

    #[test]
    fn test_integer_extremes() {
        assert_eq!(text(i64::MIN), "-9223372036854775808");
        assert_eq!(text(u64::MAX), "18446744073709551615");
        assert_eq!(text(255u8), "255");
    }

    #[test]
    fn test_bool_spellings() {
        for s in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(bool::parse_element(s), Some(true), "{s}");
        }
        for s in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(bool::parse_element(s), Some(false), "{s}");
        }
        assert_eq!(bool::parse_element("yes"), None);
        assert_eq!(bool::parse_element("tRUE"), None);
    }

    #[test]
    fn test_integer_parse_respects_width() {
        assert_eq!(i8::parse_element("127"), Some(127));
        assert_eq!(i8::parse_element("128"), None);
        assert_eq!(u16::parse_element("-1"), None);
        assert_eq!(i64::parse_element("1.0"), None);
    }

    #[test]
    fn test_float_parse_accepts_postgres_specials() {
        assert_eq!(f64::parse_element("Infinity"), Some(f64::INFINITY));
        assert_eq!(f64::parse_element("-Infinity"), Some(f64::NEG_INFINITY));
        assert!(f32::parse_element("NaN").is_some_and(f32::is_nan));
    }
}
