//! Version handling: reading declared versions, comparing them, bumping them.

pub mod bump;
pub mod resolver;
pub mod semver;

pub use bump::{bump_cargo_patch, Bump};
pub use resolver::{resolve_local_version, VersionSource};
pub use semver::{classify, is_newer, parse, parse_exact, try_parse, BuildState, VersionTriple};
