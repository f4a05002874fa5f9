pub mod cli;
pub mod common;
pub mod directives;
pub mod mapping;
pub mod params;
pub mod script;

#[cfg(test)]
pub(crate) mod tests;

pub type Error = crate::common::error::JobPropsError;
pub type Result<T> = std::result::Result<T, Error>;

pub type Map<K, V> = hashbrown::HashMap<K, V>;
pub type Set<T> = hashbrown::HashSet<T>;

// Reexports
pub use directives::DirectiveParser;
pub use mapping::MappingTable;
pub use params::{JobParameters, Overrides};
pub use script::ScriptStore;
