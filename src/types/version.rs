//! Protocol Versions
//!
//! Versions are carried as a single numeric id:
//! `major * 1_000_000 + minor * 10_000 + revision * 100 + build`,
//! where build `99` marks a release build.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{DiscoveryError, Result};

const RELEASE_BUILD: u32 = 99;

/// Wire protocol version of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Version {
    id: u32,
}

impl Version {
    pub const V_2_0_0: Version = Version::release(2, 0, 0);
    pub const V_2_4_0: Version = Version::release(2, 4, 0);

    /// The protocol version spoken by this process.
    pub const CURRENT: Version = Version::V_2_4_0;

    /// Release build of `major.minor.revision`.
    ///
    /// # Panics
    ///
    /// If `major >= 4000`, `minor >= 100` or `revision >= 100`; such versions
    /// have no id.
    pub const fn release(major: u32, minor: u32, revision: u32) -> Self {
        assert!(major < 4000 && minor < 100 && revision < 100, "version component out of range");
        Self {
            id: major * 1_000_000 + minor * 10_000 + revision * 100 + RELEASE_BUILD,
        }
    }

    pub const fn from_id(id: u32) -> Self {
        Self { id }
    }

    pub const fn id(&self) -> u32 {
        self.id
    }

    pub const fn major(&self) -> u32 {
        self.id / 1_000_000
    }

    pub const fn minor(&self) -> u32 {
        (self.id / 10_000) % 100
    }

    pub const fn revision(&self) -> u32 {
        (self.id / 100) % 100
    }

    pub const fn build(&self) -> u32 {
        self.id % 100
    }

    pub fn on_or_after(&self, other: Version) -> bool {
        self.id >= other.id
    }

    pub fn before(&self, other: Version) -> bool {
        self.id < other.id
    }

    /// Oldest version this one can talk to: the first release of its major line.
    pub fn minimum_compatibility_version(&self) -> Version {
        let first_of_major = Version::release(self.major(), 0, 0);
        std::cmp::min(*self, first_of_major)
    }

    /// Whether two versions can exchange messages, checked from both sides.
    pub fn is_compatible(&self, other: Version) -> bool {
        self.on_or_after(other.minimum_compatibility_version())
            && other.on_or_after(self.minimum_compatibility_version())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major(), self.minor(), self.revision())?;
        if self.build() != RELEASE_BUILD {
            write!(f, "-b{}", self.build())?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || DiscoveryError::config(format!("Invalid version [{}], expected [major.minor.revision]", s));

        let (numbers, build) = match s.split_once("-b") {
            Some((numbers, build)) => (numbers, build.parse::<u32>().map_err(|_| invalid())?),
            None => (s, RELEASE_BUILD),
        };
        let parts = numbers
            .split('.')
            .map(|p| p.parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;
        match parts.as_slice() {
            [major, minor, revision] if *minor < 100 && *revision < 100 && build < 100 && *major < 4000 => {
                Ok(Version::from_id(major * 1_000_000 + minor * 10_000 + revision * 100 + build))
            }
            _ => Err(invalid()),
        }
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

impl TryFrom<String> for Version {
    type Error = DiscoveryError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

static LOCAL_GATE: Lazy<VersionGate> = Lazy::new(|| VersionGate::new(Version::CURRENT));

/// Minimum protocol version accepted from peers, computed once for a process version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionGate {
    current: Version,
    minimum: Version,
}

impl VersionGate {
    pub fn new(current: Version) -> Self {
        Self {
            current,
            minimum: current.minimum_compatibility_version(),
        }
    }

    /// The gate for this process, initialised on first use.
    pub fn local() -> &'static VersionGate {
        &LOCAL_GATE
    }

    pub fn current(&self) -> Version {
        self.current
    }

    /// Version to assume for a peer whose real version is not known yet.
    pub fn minimum_accepted(&self) -> Version {
        self.minimum
    }

    pub fn accepts(&self, peer: Version) -> bool {
        self.current.is_compatible(peer)
    }

    /// Rejects a peer whose handshake revealed an incompatible version.
    pub fn check(&self, peer: Version) -> Result<()> {
        if self.accepts(peer) {
            Ok(())
        } else {
            Err(DiscoveryError::IncompatibleVersion {
                peer,
                minimum: self.minimum,
            })
        }
    }
}
