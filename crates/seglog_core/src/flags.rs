//! Output flags controlling what a record carries.

use crate::error::LogError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};
use std::str::FromStr;

/// A set of output flags.
///
/// Flags decide which optional parts of a record are captured and
/// rendered. They combine with `|`:
///
/// ```rust
/// use seglog_core::Flags;
///
/// let flags = Flags::DATE | Flags::MILLISECONDS | Flags::SHORT_FILE;
/// assert!(flags.has_time());
/// assert!(!flags.contains(Flags::NAME));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Flags(u32);

impl Flags {
    /// Calendar date, `2009-01-23`.
    pub const DATE: Flags = Flags(1);
    /// Wall clock time, `01:23:23`.
    pub const TIME: Flags = Flags(1 << 1);
    /// Millisecond resolution, `01:23:23.123`. Implies [`Flags::TIME`].
    pub const MILLISECONDS: Flags = Flags(1 << 2);
    /// Microsecond resolution, `01:23:23.123123`. Implies [`Flags::TIME`].
    pub const MICROSECONDS: Flags = Flags(1 << 3);
    /// Full source path and line.
    pub const LONG_FILE: Flags = Flags(1 << 4);
    /// Source path with compressed directories. Overrides [`Flags::LONG_FILE`].
    pub const SHORT_FILE: Flags = Flags(1 << 5);
    /// Render timestamps in UTC instead of local time.
    pub const UTC: Flags = Flags(1 << 6);
    /// Calling function (module path).
    pub const FUNCTION: Flags = Flags(1 << 7);
    /// Logger name.
    pub const NAME: Flags = Flags(1 << 8);

    /// Default flag set.
    pub const STD: Flags = Flags(
        Self::DATE.0 | Self::MILLISECONDS.0 | Self::SHORT_FILE.0 | Self::FUNCTION.0 | Self::NAME.0,
    );

    const NAMES: [(&'static str, Flags); 9] = [
        ("date", Self::DATE),
        ("time", Self::TIME),
        ("milliseconds", Self::MILLISECONDS),
        ("microseconds", Self::MICROSECONDS),
        ("longfile", Self::LONG_FILE),
        ("shortfile", Self::SHORT_FILE),
        ("utc", Self::UTC),
        ("function", Self::FUNCTION),
        ("name", Self::NAME),
    ];

    const ANY_TIME: Flags = Flags(Self::TIME.0 | Self::MILLISECONDS.0 | Self::MICROSECONDS.0);
    const ANY_FILE: Flags = Flags(Self::LONG_FILE.0 | Self::SHORT_FILE.0);

    /// The empty set: render level, fields and message only.
    #[must_use]
    pub const fn empty() -> Self {
        Flags(0)
    }

    /// Every defined flag.
    #[must_use]
    pub const fn all() -> Self {
        Flags((1 << 9) - 1)
    }

    /// The raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Builds a set from raw bits, dropping undefined ones.
    #[must_use]
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Flags(bits & Self::all().0)
    }

    /// Whether no flag is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every flag of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any flag of `other` is set.
    #[must_use]
    pub const fn intersects(self, other: Flags) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether a time of day is rendered.
    #[must_use]
    pub const fn has_time(self) -> bool {
        self.intersects(Self::ANY_TIME)
    }

    /// Whether a timestamp must be captured at all.
    #[must_use]
    pub const fn captures_time(self) -> bool {
        self.has_time() || self.contains(Self::DATE)
    }

    /// Whether a source file is rendered.
    #[must_use]
    pub const fn has_file(self) -> bool {
        self.intersects(Self::ANY_FILE)
    }

    /// Whether the caller location must be captured at all.
    #[must_use]
    pub const fn captures_caller(self) -> bool {
        self.has_file() || self.contains(Self::FUNCTION)
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Flags {
    type Output = Flags;

    fn bitand(self, rhs: Flags) -> Flags {
        Flags(self.0 & rhs.0)
    }
}

impl Not for Flags {
    type Output = Flags;

    fn not(self) -> Flags {
        Flags(!self.0 & Self::all().0)
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Flags({self})")
    }
}

/// Renders as `date|milliseconds|...`, or `empty`.
impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("empty");
        }
        let mut first = true;
        for (name, flag) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Parses names separated by `|` or `,`; `std` and `empty` are accepted.
impl FromStr for Flags {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = Flags::empty();
        for part in s.split(['|', ',']).map(str::trim).filter(|p| !p.is_empty()) {
            let part = part.to_ascii_lowercase();
            flags |= match part.as_str() {
                "std" => Flags::STD,
                "empty" | "none" => Flags::empty(),
                _ => Self::NAMES
                    .into_iter()
                    .find(|(name, _)| *name == part)
                    .map(|(_, flag)| flag)
                    .ok_or_else(|| LogError::InvalidFlag(part.clone()))?,
            };
        }
        Ok(flags)
    }
}

impl TryFrom<String> for Flags {
    type Error = LogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Flags> for String {
    fn from(flags: Flags) -> Self {
        flags.to_string()
    }
}
