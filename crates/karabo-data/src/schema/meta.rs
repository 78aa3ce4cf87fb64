// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Enumerations stored as INT32 schema attributes.

use std::fmt;

macro_rules! int_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal => $label:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
        pub enum $name {
            $($(#[$vmeta])* $variant,)*
        }

        impl $name {
            /// Value stored in the schema attribute.
            pub const fn as_i32(self) -> i32 {
                match self {
                    $(Self::$variant => $value,)*
                }
            }

            pub fn from_i32(value: i32) -> Option<Self> {
                match value {
                    $($value => Some(Self::$variant),)*
                    _ => None,
                }
            }

            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)*
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

int_enum! {
    /// What a descriptor node describes.
    NodeType {
        Leaf = 0 => "LEAF",
        Node = 1 => "NODE",
        ChoiceOfNodes = 2 => "CHOICE_OF_NODES",
        ListOfNodes = 3 => "LIST_OF_NODES",
    }
}

int_enum! {
    /// When a parameter may be written.
    AccessMode {
        /// Only at instantiation.
        Init = 1 => "INIT",
        /// Never by users; the device publishes it.
        Read = 2 => "READ",
        /// At instantiation and at runtime.
        Write = 4 => "WRITE",
    }
}

int_enum! {
    Assignment {
        Optional = 0 => "OPTIONAL",
        Mandatory = 1 => "MANDATORY",
        /// Set by the framework, never by users.
        Internal = 2 => "INTERNAL",
    }
}

int_enum! {
    /// Named access levels. Schemas store plain non-negative integers, so
    /// levels between or above these are valid too.
    AccessLevel {
        Observer = 0 => "OBSERVER",
        User = 1 => "USER",
        Operator = 2 => "OPERATOR",
        Expert = 3 => "EXPERT",
        Admin = 4 => "ADMIN",
    }
}

int_enum! {
    ArchivePolicy {
        EveryEvent = 0 => "EVERY_EVENT",
        Every100Ms = 1 => "EVERY_100MS",
        Every1S = 2 => "EVERY_1S",
        Every5S = 3 => "EVERY_5S",
        Every10S = 4 => "EVERY_10S",
        Every1Min = 5 => "EVERY_1MIN",
        Every10Min = 6 => "EVERY_10MIN",
        NoArchiving = 7 => "NO_ARCHIVING",
    }
}

int_enum! {
    /// Whether the data acquisition system records a parameter.
    DaqPolicy {
        Unspecified = -1 => "UNSPECIFIED",
        Omit = 0 => "OMIT",
        Save = 1 => "SAVE",
    }
}

impl AccessLevel {
    pub const fn level(self) -> u32 {
        self.as_i32() as u32
    }
}

impl From<AccessLevel> for u32 {
    fn from(level: AccessLevel) -> u32 {
        level.level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for mode in [AccessMode::Init, AccessMode::Read, AccessMode::Write] {
            assert_eq!(AccessMode::from_i32(mode.as_i32()), Some(mode));
        }
        assert_eq!(AccessMode::from_i32(3), None);
        assert_eq!(DaqPolicy::from_i32(-1), Some(DaqPolicy::Unspecified));
        assert_eq!(ArchivePolicy::NoArchiving.as_i32(), 7);
        assert_eq!(NodeType::ListOfNodes.to_string(), "LIST_OF_NODES");
    }

    #[test]
    fn test_access_levels_are_ordered() {
        assert!(AccessLevel::Observer < AccessLevel::User);
        assert!(AccessLevel::Expert < AccessLevel::Admin);
        assert_eq!(u32::from(AccessLevel::Operator), 2);
    }
}
