//! Data models module
//!
//! This module contains the school records stored in the remote tables,
//! their writable inputs and their table schemas.

/// String-backed enum that keeps unknown values instead of failing to decode
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $text,)+
                    $name::Other(value) => value.as_str(),
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.to_lowercase().as_str() {
                    $($text => $name::$variant,)+
                    _ => $name::Other(value),
                }
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub mod attendance;
pub mod class;
pub mod grade;
pub mod student;

// Re-export commonly used models
pub use attendance::{Attendance, AttendanceInput, AttendanceStatus};
pub use class::{ClassInput, SchoolClass};
pub use grade::{Grade, GradeInput};
pub use student::{Student, StudentInput, StudentStatus};
