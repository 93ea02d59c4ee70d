use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Version, VersionError};

/// Comparison operator of a single requirement clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    /// Pessimistic: `~> 1.2` is `>= 1.2, < 2`
    Approx,
}

impl Op {
    fn symbol(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Gt => ">",
            Op::Lt => "<",
            Op::Ge => ">=",
            Op::Le => "<=",
            Op::Approx => "~>",
        }
    }

    fn matches(self, candidate: &Version, bound: &Version) -> bool {
        match self {
            Op::Eq => candidate == bound,
            Op::Ne => candidate != bound,
            Op::Gt => candidate > bound,
            Op::Lt => candidate < bound,
            Op::Ge => candidate >= bound,
            Op::Le => candidate <= bound,
            Op::Approx => candidate >= bound && candidate.release() < bound.bump(),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A set of `(operator, version)` clauses that must all hold.
///
/// The default requirement is `>= 0`, which every version satisfies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Requirement {
    clauses: Vec<(Op, Version)>,
}

impl Default for Requirement {
    fn default() -> Self {
        Self {
            clauses: vec![(Op::Ge, Version::zero())],
        }
    }
}

impl Requirement {
    /// A requirement pinned to exactly one version.
    pub fn exact(version: Version) -> Self {
        Self {
            clauses: vec![(Op::Eq, version)],
        }
    }

    /// Parse a comma-separated list of clauses such as `~> 1.2, >= 1.2.3`.
    /// A clause without an operator is an exact pin.
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let mut clauses = Vec::new();
        for part in s.split(',') {
            clauses.push(Self::parse_clause(part.trim(), s)?);
        }
        Ok(Self { clauses })
    }

    fn parse_clause(clause: &str, whole: &str) -> Result<(Op, Version), VersionError> {
        // Longest operators first so ">=" is not read as ">"
        const OPS: [(&str, Op); 7] = [
            ("~>", Op::Approx),
            (">=", Op::Ge),
            ("<=", Op::Le),
            ("!=", Op::Ne),
            ("=", Op::Eq),
            (">", Op::Gt),
            ("<", Op::Lt),
        ];

        let (op, rest) = OPS
            .iter()
            .find_map(|(symbol, op)| clause.strip_prefix(symbol).map(|rest| (*op, rest)))
            .unwrap_or((Op::Eq, clause));

        let version = Version::parse(rest)
            .map_err(|_| VersionError::InvalidRequirement(whole.to_string()))?;
        Ok((op, version))
    }

    pub fn clauses(&self) -> &[(Op, Version)] {
        &self.clauses
    }

    /// Whether `version` satisfies every clause.
    ///
    /// This is the pure constraint test; prerelease exclusion is applied on
    /// top of it by [`Requirement::allows`].
    pub fn satisfied_by(&self, version: &Version) -> bool {
        self.clauses
            .iter()
            .all(|(op, bound)| op.matches(version, bound))
    }

    /// Constraint test with the prerelease rule applied: prerelease versions
    /// pass only when `accept_prerelease` is set or the requirement itself
    /// names a prerelease.
    pub fn allows(&self, version: &Version, accept_prerelease: bool) -> bool {
        if version.is_prerelease() && !accept_prerelease && !self.is_prerelease() {
            return false;
        }
        self.satisfied_by(version)
    }

    /// True when any clause names a prerelease version.
    pub fn is_prerelease(&self) -> bool {
        self.clauses.iter().any(|(_, v)| v.is_prerelease())
    }

    /// True for the unconstrained `>= 0` requirement.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .clauses
            .iter()
            .map(|(op, v)| format!("{} {}", op, v))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

impl FromStr for Requirement {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Requirement {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Requirement> for String {
    fn from(value: Requirement) -> Self {
        value.to_string()
    }
}
