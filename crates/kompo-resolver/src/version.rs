//! Maven version ordering, ranges, and the dynamic version selectors a
//! dependency may request (`latest.release`, `2.+`, `[1.0,2.0)`).
//!
//! Versions split into items on `.` and `-`. Numbers compare numerically,
//! known qualifiers by their release stage (`alpha` < `beta` < `milestone`
//! < `rc` < `snapshot` < release < `sp`), and missing trailing items count
//! as `0`, so `1.0` equals `1.0.0`.

use std::cmp::Ordering;
use std::fmt;

/// A version string paired with its Maven sort key.
#[derive(Debug, Clone)]
pub struct MavenVersion {
    pub original: String,
    items: Vec<Item>,
}

/// One `.`/`-` separated token of a version.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    Number(u64),
    Qualifier(Qualifier),
    Word(String),
}

/// Qualifiers Maven orders specially; `Ga` stands for a plain release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Qualifier {
    Alpha,
    Beta,
    Milestone,
    Rc,
    Snapshot,
    Ga,
    Sp,
}

impl Item {
    fn from_token(token: &str) -> Self {
        if let Ok(n) = token.parse() {
            return Item::Number(n);
        }
        let qualifier = match token.to_ascii_lowercase().as_str() {
            "alpha" | "a" => Qualifier::Alpha,
            "beta" | "b" => Qualifier::Beta,
            "milestone" | "m" => Qualifier::Milestone,
            "rc" | "cr" => Qualifier::Rc,
            "snapshot" => Qualifier::Snapshot,
            "ga" | "final" | "release" => Qualifier::Ga,
            "sp" => Qualifier::Sp,
            _ => return Item::Word(token.to_string()),
        };
        Item::Qualifier(qualifier)
    }

    /// Coarse order between item kinds: pre-release qualifiers, unknown
    /// words, release qualifiers, numbers.
    fn rank(&self) -> u8 {
        match self {
            Item::Qualifier(q) if *q < Qualifier::Ga => 0,
            Item::Word(_) => 1,
            Item::Qualifier(_) => 2,
            Item::Number(_) => 3,
        }
    }

    fn compare(&self, other: &Item) -> Ordering {
        match (self, other) {
            (Item::Number(a), Item::Number(b)) => a.cmp(b),
            (Item::Qualifier(a), Item::Qualifier(b)) => a.cmp(b),
            (Item::Word(a), Item::Word(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    /// Compare against a missing item: `1.0` equals `1.0.0` and `1.0-ga`.
    fn compare_to_padding(&self) -> Ordering {
        match self {
            Item::Number(n) => n.cmp(&0),
            Item::Qualifier(q) => q.cmp(&Qualifier::Ga),
            Item::Word(_) => Ordering::Less,
        }
    }
}

impl MavenVersion {
    pub fn parse(version: &str) -> Self {
        let items = version
            .split(['.', '-'])
            .filter(|t| !t.is_empty())
            .map(Item::from_token)
            .collect();
        Self {
            original: version.to_string(),
            items,
        }
    }

    pub fn is_snapshot(&self) -> bool {
        self.original.ends_with("-SNAPSHOT")
    }
}

impl fmt::Display for MavenVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl Ord for MavenVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.items.len().max(other.items.len());
        (0..len)
            .map(|i| match (self.items.get(i), other.items.get(i)) {
                (Some(a), Some(b)) => a.compare(b),
                (Some(a), None) => a.compare_to_padding(),
                (None, Some(b)) => b.compare_to_padding().reverse(),
                (None, None) => Ordering::Equal,
            })
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for MavenVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for MavenVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for MavenVersion {}

/// A Maven version range: `[1.0,2.0)`, `[1.0,]`, `(,2.0)` or `[1.0]`.
#[derive(Debug, Clone)]
pub struct VersionRange {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}

#[derive(Debug, Clone)]
pub struct Bound {
    pub version: MavenVersion,
    pub inclusive: bool,
}

impl Bound {
    fn parse(text: &str, inclusive: bool) -> Option<Self> {
        let text = text.trim();
        (!text.is_empty()).then(|| Bound {
            version: MavenVersion::parse(text),
            inclusive,
        })
    }
}

impl VersionRange {
    /// `None` unless `text` is a bracketed range.
    pub fn parse(text: &str) -> Option<Self> {
        let s = text.trim();
        let lower_inclusive = match s.chars().next()? {
            '[' => true,
            '(' => false,
            _ => return None,
        };
        let upper_inclusive = match s.chars().last()? {
            ']' => true,
            ')' => false,
            _ => return None,
        };
        let inner = s.get(1..s.len() - 1)?;

        match inner.split_once(',') {
            Some((lower, upper)) => Some(VersionRange {
                lower: Bound::parse(lower, lower_inclusive),
                upper: Bound::parse(upper, upper_inclusive),
            }),
            // `[1.0]` pins one version.
            None => {
                let pinned = Bound::parse(inner, true)?;
                Some(VersionRange {
                    lower: Some(pinned.clone()),
                    upper: Some(pinned),
                })
            }
        }
    }

    pub fn contains(&self, version: &MavenVersion) -> bool {
        let above_lower = self.lower.as_ref().map_or(true, |b| match version.cmp(&b.version) {
            Ordering::Greater => true,
            Ordering::Equal => b.inclusive,
            Ordering::Less => false,
        });
        let below_upper = self.upper.as_ref().map_or(true, |b| match version.cmp(&b.version) {
            Ordering::Less => true,
            Ordering::Equal => b.inclusive,
            Ordering::Greater => false,
        });
        above_lower && below_upper
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = match &self.lower {
            Some(b) if !b.inclusive => '(',
            Some(_) => '[',
            None => '(',
        };
        let close = match &self.upper {
            Some(b) if !b.inclusive => ')',
            Some(_) => ']',
            None => ')',
        };
        let lower = self.lower.as_ref().map(|b| b.version.original.as_str());
        let upper = self.upper.as_ref().map(|b| b.version.original.as_str());
        if lower.is_some() && lower == upper {
            return write!(f, "[{}]", lower.unwrap_or_default());
        }
        write!(
            f,
            "{open}{},{}{close}",
            lower.unwrap_or_default(),
            upper.unwrap_or_default()
        )
    }
}

/// What a dependency asks for in its version slot.
#[derive(Debug, Clone)]
pub enum VersionSelector {
    /// A concrete version; served when the repository has its POM.
    Exact(String),
    /// No version given: the newest release.
    Latest,
    /// `latest.release`
    LatestRelease,
    /// `latest.integration`: the newest version, SNAPSHOTs included.
    LatestIntegration,
    /// Gradle prefix such as `2.+` (stored as `2.`) or a bare `+`.
    Prefix(String),
    Range(VersionRange),
}

impl VersionSelector {
    pub fn parse(version: Option<&str>) -> Self {
        let Some(v) = version.map(str::trim).filter(|v| !v.is_empty()) else {
            return Self::Latest;
        };
        match v {
            "latest.release" => Self::LatestRelease,
            "latest.integration" => Self::LatestIntegration,
            _ => {
                if let Some(prefix) = v.strip_suffix('+') {
                    return Self::Prefix(prefix.to_string());
                }
                match VersionRange::parse(v) {
                    Some(range) => Self::Range(range),
                    None => Self::Exact(v.to_string()),
                }
            }
        }
    }

    /// The concrete version, when no repository listing is needed.
    pub fn exact(&self) -> Option<&str> {
        match self {
            Self::Exact(v) => Some(v),
            _ => None,
        }
    }

    /// Whether a listed version satisfies this selector.
    pub fn accepts(&self, version: &MavenVersion) -> bool {
        match self {
            Self::Exact(v) => version.original == *v,
            Self::LatestIntegration => true,
            Self::Latest | Self::LatestRelease => !version.is_snapshot(),
            Self::Prefix(p) => !version.is_snapshot() && version.original.starts_with(p.as_str()),
            Self::Range(r) => !version.is_snapshot() && r.contains(version),
        }
    }

    /// The highest accepted version among `candidates`, by Maven ordering.
    pub fn select(&self, candidates: &[String]) -> Option<String> {
        candidates
            .iter()
            .map(|c| MavenVersion::parse(c))
            .filter(|v| self.accepts(v))
            .max()
            .map(|v| v.original)
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(v) => f.write_str(v),
            Self::Latest => f.write_str("latest"),
            Self::LatestRelease => f.write_str("latest.release"),
            Self::LatestIntegration => f.write_str("latest.integration"),
            Self::Prefix(p) => write!(f, "{p}+"),
            Self::Range(r) => write!(f, "{r}"),
        }
    }
}
