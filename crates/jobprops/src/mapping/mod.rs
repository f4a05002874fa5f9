//! Correspondence between sbatch command line flags and Slurm REST API fields.
//!
//! The table is validated once when it is constructed and it is read-only afterwards,
//! so a single instance can be shared by any number of parsers.

pub mod convert;
pub mod policy;
mod table;

use crate::params::ParamValue;
use crate::{Map, Set};

pub use table::SBATCH_ENTRIES;

/// A value stored by a flag that does not take an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstValue {
    Bool(bool),
    Text(&'static str),
}

impl ConstValue {
    pub fn to_value(self) -> ParamValue {
        match self {
            ConstValue::Bool(value) => ParamValue::Bool(value),
            ConstValue::Text(value) => ParamValue::Text(value.to_string()),
        }
    }
}

/// Grammar of the value that follows a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSpec {
    /// The flag takes no argument and stores the given constant.
    Switch(ConstValue),
    /// Arbitrary string argument.
    Text,
    /// Signed integer argument.
    Integer,
    /// String argument restricted to `choices`. When `default` is set, the argument is
    /// optional and a bare flag stores the default.
    Choice {
        choices: &'static [&'static str],
        default: Option<&'static str>,
    },
}

impl ValueSpec {
    pub fn describe(&self) -> String {
        match self {
            ValueSpec::Switch(ConstValue::Bool(value)) => format!("switch ({value})"),
            ValueSpec::Switch(ConstValue::Text(value)) => format!("switch ({value})"),
            ValueSpec::Text => "string".to_string(),
            ValueSpec::Integer => "integer".to_string(),
            ValueSpec::Choice { choices, default } => {
                let mut description = format!("one of {}", choices.join("|"));
                if let Some(default) = default {
                    description.push_str(&format!(" (default {default})"));
                }
                description
            }
        }
    }
}

/// One row of the mapping table.
#[derive(Debug, Clone, Copy)]
pub struct MappingEntry {
    rest_field: &'static str,
    flag_long: &'static str,
    flag_short: Option<&'static str>,
    value: ValueSpec,
}

impl MappingEntry {
    /// `rest_field` may be empty when the flag has no counterpart in the REST API.
    pub const fn new(
        rest_field: &'static str,
        flag_long: &'static str,
        flag_short: Option<&'static str>,
        value: ValueSpec,
    ) -> Self {
        Self {
            rest_field,
            flag_long,
            flag_short,
            value,
        }
    }

    pub fn rest_field(&self) -> Option<&'static str> {
        if self.rest_field.is_empty() {
            None
        } else {
            Some(self.rest_field)
        }
    }

    pub fn flag_long(&self) -> &'static str {
        self.flag_long
    }

    pub fn flag_short(&self) -> Option<&'static str> {
        self.flag_short
    }

    pub fn value(&self) -> &ValueSpec {
        &self.value
    }

    /// Internal key derived from the long flag: `--cpus-per-task` -> `cpus_per_task`.
    pub fn flag_key(&self) -> String {
        flag_key(self.flag_long)
    }

    /// Name used in diagnostics, e.g. `--nodes/-N`.
    pub fn display_name(&self) -> String {
        match self.flag_short {
            Some(short) => format!("{}/{}", self.flag_long, short),
            None => self.flag_long.to_string(),
        }
    }
}

pub fn flag_key(flag_long: &str) -> String {
    flag_long.trim_start_matches("--").replace('-', "_")
}

fn invalid(message: String) -> crate::Result<()> {
    Err(crate::Error::InvalidMappingTable(message))
}

fn check_long_flag(flag: &str) -> crate::Result<()> {
    let Some(name) = flag.strip_prefix("--") else {
        return invalid(format!("long flag {flag:?} does not start with --"));
    };
    if name.len() < 3 {
        return invalid(format!("long flag {flag:?} is too short"));
    }
    if !name.starts_with(|c: char| c.is_ascii_alphabetic())
        || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return invalid(format!("long flag {flag:?} contains invalid characters"));
    }
    Ok(())
}

fn check_short_flag(flag: &str) -> crate::Result<()> {
    let mut chars = flag.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('-'), Some(c), None) if c.is_ascii_alphabetic() => Ok(()),
        _ => invalid(format!(
            "short flag {flag:?} is not a dash followed by one letter"
        )),
    }
}

/// Validated, immutable set of [`MappingEntry`] rows with lookups in both directions.
#[derive(Debug)]
pub struct MappingTable {
    entries: Vec<MappingEntry>,
    /// Destination key of each entry (parallel to `entries`).
    destinations: Vec<String>,
    /// Long and short spellings -> entry index.
    by_flag: Map<&'static str, usize>,
    /// Destination key -> indices of all entries writing into it, the owner first.
    by_destination: Map<String, Vec<usize>>,
    flag_to_rest: Map<String, &'static str>,
    rest_to_flag: Map<&'static str, String>,
}

impl MappingTable {
    pub fn new(entries: Vec<MappingEntry>) -> crate::Result<Self> {
        let mut by_flag = Map::with_capacity(entries.len() * 2);
        let mut rest_fields = Set::new();
        let mut owners: Map<String, usize> = Map::new();

        for (index, entry) in entries.iter().enumerate() {
            check_long_flag(entry.flag_long)?;
            if by_flag.insert(entry.flag_long, index).is_some() {
                return Err(crate::Error::InvalidMappingTable(format!(
                    "duplicate long flag {}",
                    entry.flag_long
                )));
            }
            if let Some(short) = entry.flag_short {
                check_short_flag(short)?;
                if by_flag.insert(short, index).is_some() {
                    return Err(crate::Error::InvalidMappingTable(format!(
                        "duplicate short flag {short}"
                    )));
                }
            }
            if let Some(rest_field) = entry.rest_field() {
                if !rest_fields.insert(rest_field) {
                    return Err(crate::Error::InvalidMappingTable(format!(
                        "duplicate REST field {rest_field}"
                    )));
                }
            }
            if policy::shared_destination(entry.flag_long).is_none() {
                if let Some(other) = owners.insert(entry.flag_key(), index) {
                    return Err(crate::Error::InvalidMappingTable(format!(
                        "flags {} and {} map to the same key",
                        entries[other].flag_long, entry.flag_long
                    )));
                }
            }
        }

        let mut destinations = Vec::with_capacity(entries.len());
        let mut by_destination: Map<String, Vec<usize>> = Map::new();
        for (index, entry) in entries.iter().enumerate() {
            let destination = match policy::shared_destination(entry.flag_long) {
                Some(destination) => {
                    let Some(&owner) = owners.get(destination) else {
                        return Err(crate::Error::InvalidMappingTable(format!(
                            "flag {} shares destination {destination} which no flag owns",
                            entry.flag_long
                        )));
                    };
                    policy::check_compatible(&entries[owner], entry)?;
                    destination.to_string()
                }
                None => entry.flag_key(),
            };
            by_destination
                .entry(destination.clone())
                .or_default()
                .push(index);
            destinations.push(destination);
        }
        for (destination, indices) in by_destination.iter_mut() {
            let owner = owners[destination.as_str()];
            indices.sort_by_key(|&index| index != owner);
        }

        let mut flag_to_rest = Map::new();
        let mut rest_to_flag = Map::new();
        for (key, &owner) in &owners {
            if let Some(rest_field) = entries[owner].rest_field() {
                flag_to_rest.insert(key.clone(), rest_field);
                rest_to_flag.insert(rest_field, key.clone());
            }
        }

        log::debug!(
            "Mapping table created with {} flags ({} exposed in REST)",
            entries.len(),
            flag_to_rest.len()
        );

        Ok(Self {
            entries,
            destinations,
            by_flag,
            by_destination,
            flag_to_rest,
            rest_to_flag,
        })
    }

    /// The table of all supported `sbatch` flags.
    pub fn sbatch() -> crate::Result<Self> {
        Self::new(SBATCH_ENTRIES.to_vec())
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    /// Finds an entry by its long (`--nodes`) or short (`-N`) spelling.
    /// Returns the entry together with the key its value is stored under.
    pub fn lookup_flag(&self, flag: &str) -> Option<(&MappingEntry, &str)> {
        self.by_flag
            .get(flag)
            .map(|&index| (&self.entries[index], self.destinations[index].as_str()))
    }

    /// All entries that store their value under `destination`; the owning entry comes first.
    pub fn entries_for_destination(
        &self,
        destination: &str,
    ) -> impl Iterator<Item = &MappingEntry> + '_ {
        self.by_destination
            .get(destination)
            .into_iter()
            .flatten()
            .map(|&index| &self.entries[index])
    }

    pub fn rest_field_for(&self, flag_key: &str) -> Option<&'static str> {
        self.flag_to_rest.get(flag_key).copied()
    }

    pub fn flag_key_for(&self, rest_field: &str) -> Option<&str> {
        self.rest_to_flag.get(rest_field).map(|key| key.as_str())
    }

    /// REST field names known to the table, sorted.
    pub fn rest_fields(&self) -> Vec<&'static str> {
        let mut fields: Vec<_> = self.rest_to_flag.keys().copied().collect();
        fields.sort_unstable();
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::{ConstValue, MappingEntry, MappingTable, SBATCH_ENTRIES, ValueSpec, flag_key};
    use crate::Set;

    fn entry(rest: &'static str, long: &'static str, short: Option<&'static str>) -> MappingEntry {
        MappingEntry::new(rest, long, short, ValueSpec::Text)
    }

    fn table_error(entries: Vec<MappingEntry>) -> String {
        MappingTable::new(entries).unwrap_err().to_string()
    }

    #[test]
    fn test_sbatch_table_is_valid() {
        let table = MappingTable::sbatch().unwrap();
        assert_eq!(table.entries().len(), SBATCH_ENTRIES.len());
    }

    #[test]
    fn test_sbatch_table_uniqueness() {
        let mut long = Set::new();
        let mut short = Set::new();
        let mut rest = Set::new();
        for entry in SBATCH_ENTRIES {
            assert!(long.insert(entry.flag_long()), "{}", entry.flag_long());
            if let Some(flag) = entry.flag_short() {
                assert!(short.insert(flag), "{flag}");
            }
            if let Some(field) = entry.rest_field() {
                assert!(rest.insert(field), "{field}");
            }
        }
    }

    #[test]
    fn test_sbatch_table_flag_shapes() {
        for entry in SBATCH_ENTRIES {
            let long = entry.flag_long();
            assert!(long.starts_with("--"), "{long}");
            assert!(long.len() >= 5, "{long}");
            if let Some(short) = entry.flag_short() {
                assert_eq!(short.len(), 2, "{short}");
                assert!(short.starts_with('-'), "{short}");
                assert!(short.chars().nth(1).unwrap().is_ascii_alphabetic());
            }
        }
    }

    #[test]
    fn test_flag_key() {
        assert_eq!(flag_key("--cpus-per-task"), "cpus_per_task");
        assert_eq!(flag_key("--nodes"), "nodes");
    }

    #[test]
    fn test_lookup_long_and_short() {
        let table = MappingTable::sbatch().unwrap();
        let (entry, destination) = table.lookup_flag("-N").unwrap();
        assert_eq!(entry.flag_long(), "--nodes");
        assert_eq!(destination, "nodes");
        let (entry, _) = table.lookup_flag("--nodes").unwrap();
        assert_eq!(entry.flag_short(), Some("-N"));
        assert!(table.lookup_flag("--foo").is_none());
        assert!(table.lookup_flag("nodes").is_none());
    }

    #[test]
    fn test_shared_destinations() {
        let table = MappingTable::sbatch().unwrap();
        assert_eq!(table.lookup_flag("--oversubscribe").unwrap().1, "exclusive");
        assert_eq!(table.lookup_flag("-s").unwrap().1, "exclusive");
        assert_eq!(table.lookup_flag("--no-requeue").unwrap().1, "requeue");
        let flags: Vec<_> = table
            .entries_for_destination("requeue")
            .map(|entry| entry.flag_long())
            .collect();
        assert_eq!(flags, vec!["--requeue", "--no-requeue"]);
    }

    #[test]
    fn test_bidirectional_lookup() {
        let table = MappingTable::sbatch().unwrap();
        assert_eq!(table.rest_field_for("job_name"), Some("name"));
        assert_eq!(table.flag_key_for("name"), Some("job_name"));
        assert_eq!(table.rest_field_for("export"), None);
        for entry in SBATCH_ENTRIES {
            if let Some(field) = entry.rest_field() {
                let key = table.flag_key_for(field).unwrap();
                assert_eq!(table.rest_field_for(key), Some(field));
            }
        }
    }

    #[test]
    fn test_duplicate_long_flag() {
        insta::assert_snapshot!(
            table_error(vec![entry("a", "--abc", None), entry("b", "--abc", None)]),
            @"Invalid mapping table: duplicate long flag --abc"
        );
    }

    #[test]
    fn test_duplicate_short_flag() {
        insta::assert_snapshot!(
            table_error(vec![entry("a", "--abc", Some("-a")), entry("b", "--def", Some("-a"))]),
            @"Invalid mapping table: duplicate short flag -a"
        );
    }

    #[test]
    fn test_duplicate_rest_field() {
        insta::assert_snapshot!(
            table_error(vec![entry("a", "--abc", None), entry("a", "--def", None)]),
            @"Invalid mapping table: duplicate REST field a"
        );
    }

    #[test]
    fn test_empty_rest_fields_may_repeat() {
        assert!(MappingTable::new(vec![entry("", "--abc", None), entry("", "--def", None)]).is_ok());
    }

    #[test]
    fn test_invalid_flag_shapes() {
        insta::assert_snapshot!(
            table_error(vec![entry("a", "-abc", None)]),
            @r#"Invalid mapping table: long flag "-abc" does not start with --"#
        );
        insta::assert_snapshot!(
            table_error(vec![entry("a", "--ab", None)]),
            @r#"Invalid mapping table: long flag "--ab" is too short"#
        );
        insta::assert_snapshot!(
            table_error(vec![entry("a", "--abc", Some("-ab"))]),
            @r#"Invalid mapping table: short flag "-ab" is not a dash followed by one letter"#
        );
        insta::assert_snapshot!(
            table_error(vec![entry("a", "--abc", Some("-1"))]),
            @r#"Invalid mapping table: short flag "-1" is not a dash followed by one letter"#
        );
    }

    #[test]
    fn test_underscore_in_long_flag() {
        insta::assert_snapshot!(
            table_error(vec![entry("a", "--a-bc", None), entry("b", "--a_bc", None)]),
            @r#"Invalid mapping table: long flag "--a_bc" contains invalid characters"#
        );
    }

    #[test]
    fn test_shared_destination_without_owner() {
        let entries = vec![MappingEntry::new(
            "",
            "--no-requeue",
            None,
            ValueSpec::Switch(ConstValue::Bool(false)),
        )];
        insta::assert_snapshot!(
            table_error(entries),
            @"Invalid mapping table: flag --no-requeue shares destination requeue which no flag owns"
        );
    }
}
