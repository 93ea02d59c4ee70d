//! Install transaction and per-run bookkeeping.

mod tracker;
mod transaction;

use crate::package::Spec;
use crate::resolver::Request;

pub use tracker::{InstalledSet, summary};
pub use transaction::commit;

/// The first of `installed` whose version satisfies the request's constraint.
///
/// Used by conservative mode: such a request is already satisfied and is not
/// installed again, even if a newer version is available.
pub fn already_satisfied<'a>(installed: &'a [Spec], request: &Request) -> Option<&'a Spec> {
    installed
        .iter()
        .find(|s| s.name == request.name && request.requirement.satisfied_by(&s.version))
}
