//! Typed entitlement values.
//!
//! Each entitlement is an integer [`Limit`] (with an `Unlimited` sentinel),
//! a boolean flag, or one of the ordered levels below. [`EntitlementValue`]
//! is the tagged union the matrix comparator works on.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Integer entitlement with an explicit "unlimited" sentinel.
///
/// Ordering: every `Count` is below `Unlimited`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Limit {
    /// A finite cap.
    Count(u32),
    /// No cap.
    Unlimited,
}

impl Limit {
    /// Whether another unit may be added on top of `current`.
    pub fn allows(&self, current: u64) -> bool {
        match self {
            Self::Count(max) => current < u64::from(*max),
            Self::Unlimited => true,
        }
    }

    /// Whether `current` is above this limit.
    pub fn is_exceeded_by(&self, current: u64) -> bool {
        match self {
            Self::Count(max) => current > u64::from(*max),
            Self::Unlimited => false,
        }
    }

    /// The finite cap, or `None` if unlimited.
    pub fn as_count(&self) -> Option<u32> {
        match self {
            Self::Count(max) => Some(*max),
            Self::Unlimited => None,
        }
    }

    /// Whether the limit grants anything at all.
    pub fn is_positive(&self) -> bool {
        match self {
            Self::Count(max) => *max > 0,
            Self::Unlimited => true,
        }
    }

    /// Whether the limit is the unlimited sentinel.
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(max) => write!(f, "{max}"),
            Self::Unlimited => write!(f, "unlimited"),
        }
    }
}

impl Serialize for Limit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Count(max) => serializer.serialize_u32(*max),
            Self::Unlimited => serializer.serialize_str("unlimited"),
        }
    }
}

impl<'de> Deserialize<'de> for Limit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Count(u32),
            Word(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Count(max) => Ok(Self::Count(max)),
            Repr::Word(w) if w.eq_ignore_ascii_case("unlimited") => Ok(Self::Unlimited),
            Repr::Word(w) => Err(serde::de::Error::custom(format!(
                "expected a number or \"unlimited\", got \"{w}\""
            ))),
        }
    }
}

/// Macro to define an ordered, string-labelled entitlement level.
macro_rules! define_level {
    (
        $(#[$meta:meta])*
        $name:ident { $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// All levels in ascending order.
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// Zero-based rank in ascending order.
            pub fn rank(self) -> u8 {
                self as u8
            }

            /// Return the level as a snake_case string.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $label ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl From<$name> for EntitlementValue {
            fn from(level: $name) -> Self {
                EntitlementValue::Level {
                    rank: level.rank(),
                    label: level.as_str(),
                }
            }
        }
    };
}

define_level!(
    /// Public profile page capabilities.
    ProfileLevel {
        /// Plain profile with gallery list.
        Basic => "basic",
        /// Logo, cover and bio.
        Branded => "branded",
        /// Fully custom layout.
        Custom => "custom",
    }
);

define_level!(
    /// Photo tagging support.
    TagMode {
        /// No tags.
        Off => "off",
        /// Photographer tags photos by hand.
        Manual => "manual",
        /// Tags suggested automatically.
        Automatic => "automatic",
    }
);

define_level!(
    /// Largest rendition clients may download.
    DownloadSize {
        /// Web-sized JPEGs.
        Web => "web",
        /// High resolution.
        High => "high",
        /// Original files.
        Original => "original",
    }
);

define_level!(
    /// Strongest gallery privacy option available.
    PrivacyLevel {
        /// Anyone with the link.
        Public => "public",
        /// Password protected.
        Password => "password",
        /// Invite-only client access.
        Private => "private",
    }
);

define_level!(
    /// Visual customization of the client-facing gallery.
    CustomizationLevel {
        /// Default look.
        Standard => "standard",
        /// Pick from themes.
        Themes => "themes",
        /// Full branding control.
        FullBranding => "full_branding",
    }
);

/// A single entitlement value, tagged by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum EntitlementValue {
    /// Integer limit.
    Limit(Limit),
    /// Boolean permission.
    Flag(bool),
    /// Ordered level.
    Level {
        /// Position in the level's own order.
        rank: u8,
        /// Level label.
        label: &'static str,
    },
}

impl EntitlementValue {
    /// Short name of the value kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Limit(_) => "limit",
            Self::Flag(_) => "flag",
            Self::Level { .. } => "level",
        }
    }
}

impl PartialOrd for EntitlementValue {
    /// Values of the same kind are ordered; mixed kinds are incomparable.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Limit(a), Self::Limit(b)) => Some(a.cmp(b)),
            (Self::Flag(a), Self::Flag(b)) => Some(a.cmp(b)),
            (Self::Level { rank: a, .. }, Self::Level { rank: b, .. }) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for EntitlementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limit(limit) => write!(f, "{limit}"),
            Self::Flag(true) => write!(f, "yes"),
            Self::Flag(false) => write!(f, "no"),
            Self::Level { label, .. } => write!(f, "{label}"),
        }
    }
}

impl From<Limit> for EntitlementValue {
    fn from(limit: Limit) -> Self {
        Self::Limit(limit)
    }
}

impl From<bool> for EntitlementValue {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}
