//! Domain types for the six collections, plus the `*Row` shapes sqlx decodes them from.
//!
//! Enum columns are stored as TEXT using the same spellings the JSON API uses.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown {kind} value '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
}

/// Declares a string-backed enum whose serde spelling and TEXT column spelling agree.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            #[allow(dead_code)]
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::models::ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err($crate::models::ModelError::UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

pub mod application;
pub mod company;
pub mod invitation;
pub mod job;
pub mod legal;
pub mod user;

/// Parses an optional TEXT column into an optional enum.
pub(crate) fn parse_opt<T>(value: Option<String>) -> Result<Option<T>, ModelError>
where
    T: std::str::FromStr<Err = ModelError>,
{
    value.map(|s| s.parse::<T>()).transpose()
}

#[cfg(test)]
mod tests {
    use super::job::JobStatus;
    use super::*;

    #[test]
    fn test_string_enum_round_trips_through_text() {
        for status in JobStatus::ALL {
            let parsed: JobStatus = status.as_str().parse().unwrap();
            assert_eq!(&parsed, status);
        }
    }

    #[test]
    fn test_string_enum_rejects_unknown_text() {
        let err = "archived".parse::<JobStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown JobStatus value 'archived'");
    }

    #[test]
    fn test_parse_opt_passes_none_through() {
        let parsed: Option<JobStatus> = parse_opt(None).unwrap();
        assert!(parsed.is_none());
    }
}
