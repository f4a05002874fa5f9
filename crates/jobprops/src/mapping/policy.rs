//! Field groups that are written by more than one flag.
//!
//! Every flag of a group stores its value under the same destination key, so the generic
//! last-occurrence-wins rule of the resolver applies across the whole group:
//!
//! * `exclusive`: `--exclusive[=user|mcs|exclusive|oversubscribe]` and `--oversubscribe`
//!   (which stores `"oversubscribe"` and accepts no explicit value),
//! * `requeue`: `--requeue` (`true`) and `--no-requeue` (`false`).

use crate::mapping::{ConstValue, MappingEntry, ValueSpec};

pub const EXCLUSIVE_CHOICES: &[&str] = &["user", "mcs", "exclusive", "oversubscribe"];

pub const EXCLUSIVE: MappingEntry = MappingEntry::new(
    "exclusive",
    "--exclusive",
    None,
    ValueSpec::Choice {
        choices: EXCLUSIVE_CHOICES,
        default: Some("exclusive"),
    },
);
pub const OVERSUBSCRIBE: MappingEntry = MappingEntry::new(
    "",
    "--oversubscribe",
    Some("-s"),
    ValueSpec::Switch(ConstValue::Text("oversubscribe")),
);
pub const REQUEUE: MappingEntry = MappingEntry::new(
    "requeue",
    "--requeue",
    None,
    ValueSpec::Switch(ConstValue::Bool(true)),
);
pub const NO_REQUEUE: MappingEntry = MappingEntry::new(
    "",
    "--no-requeue",
    None,
    ValueSpec::Switch(ConstValue::Bool(false)),
);

struct SharedDestination {
    flag_long: &'static str,
    destination: &'static str,
}

const SHARED_DESTINATIONS: &[SharedDestination] = &[
    SharedDestination {
        flag_long: "--oversubscribe",
        destination: "exclusive",
    },
    SharedDestination {
        flag_long: "--no-requeue",
        destination: "requeue",
    },
];

/// Destination key of a flag that writes into another flag's field.
pub fn shared_destination(flag_long: &str) -> Option<&'static str> {
    SHARED_DESTINATIONS
        .iter()
        .find(|shared| shared.flag_long == flag_long)
        .map(|shared| shared.destination)
}

/// Checks that whatever `member` stores is a value the `owner` of the field could store too.
pub(super) fn check_compatible(owner: &MappingEntry, member: &MappingEntry) -> crate::Result<()> {
    let compatible = match (owner.value(), member.value()) {
        (ValueSpec::Switch(ConstValue::Bool(_)), ValueSpec::Switch(ConstValue::Bool(_))) => true,
        (ValueSpec::Choice { choices, .. }, ValueSpec::Switch(ConstValue::Text(value))) => {
            choices.contains(value)
        }
        (ValueSpec::Text, ValueSpec::Switch(ConstValue::Text(_))) => true,
        _ => false,
    };
    if compatible {
        Ok(())
    } else {
        Err(crate::Error::InvalidMappingTable(format!(
            "flag {} cannot share the field of {}",
            member.flag_long(),
            owner.flag_long()
        )))
    }
}
