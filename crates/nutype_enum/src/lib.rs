//! A macro for declaring a newtype over an integer that behaves like an enum
//! for known values but still round-trips unknown ones.
//!
//! Wire protocols like RTMP's message type IDs are open: a decoder has to
//! accept values it doesn't recognize rather than fail. A plain Rust `enum`
//! can't represent "any `u8`, with some named". [`nutype_enum`] generates a
//! tuple struct with one associated constant per named value, so known
//! values can still be matched on (constant patterns) while unknown values
//! are preserved as-is in the wrapped integer.
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]

/// Declares a newtype over an integer with named associated constants.
///
/// ```
/// nutype_enum::nutype_enum! {
///     pub enum Color(u8) {
///         Red = 0,
///         Green = 1,
///         Blue = 2,
///     }
/// }
///
/// assert_eq!(Color::Red.0, 0);
/// assert_eq!(format!("{}", Color::Red), "Red");
/// assert_eq!(format!("{}", Color(200)), "Unknown(200)");
/// ```
#[macro_export]
macro_rules! nutype_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident($repr:ty) {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident = $value:expr
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        $vis struct $name(pub $repr);

        impl $name {
            $(
                $(#[$variant_meta])*
                #[allow(non_upper_case_globals)]
                $vis const $variant: $name = $name($value);
            )*

            /// Returns the name of this value if it matches one of the
            /// declared constants, `None` otherwise.
            $vis fn name(&self) -> Option<&'static str> {
                match *self {
                    $(
                        $name::$variant => Some(stringify!($variant)),
                    )*
                    _ => None,
                }
            }
        }

        impl From<$repr> for $name {
            fn from(value: $repr) -> Self {
                $name(value)
            }
        }

        impl From<$name> for $repr {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self.name() {
                    Some(name) => write!(f, "{name}"),
                    None => write!(f, "Unknown({})", self.0),
                }
            }
        }
    };
}

#[cfg(test)]
#[cfg_attr(all(coverage_nightly, test), coverage(off))]
mod tests {
    nutype_enum! {
        pub enum Fruit(u8) {
            Apple = 1,
            Banana = 2,
        }
    }

    #[test]
    fn named_value_matches() {
        let f = Fruit::Apple;
        match f {
            Fruit::Apple => {}
            Fruit::Banana => panic!("wrong match"),
            _ => panic!("wrong match"),
        }
    }

    #[test]
    fn unknown_value_round_trips() {
        let f = Fruit(200);
        assert_eq!(f.0, 200);
        assert_eq!(f.name(), None);
        assert_eq!(format!("{f}"), "Unknown(200)");
    }

    #[test]
    fn display_named() {
        assert_eq!(format!("{}", Fruit::Banana), "Banana");
    }

    #[test]
    fn repr_conversions() {
        let raw: u8 = Fruit::Apple.into();
        assert_eq!(raw, 1);
        let back: Fruit = raw.into();
        assert_eq!(back, Fruit::Apple);
    }
}
