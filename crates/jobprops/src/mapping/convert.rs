//! Renaming of parameters between the flag namespace and the REST namespace.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::common::utils::str::quote_if_needed;
use crate::directives::extract::DirectiveSyntax;
use crate::directives::resolve::ResolvedParameters;
use crate::mapping::{ConstValue, MappingEntry, MappingTable, ValueSpec};
use crate::params::{JobParameters, ParamValue};

/// Parameter values keyed by REST field names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappedParameters(BTreeMap<String, ParamValue>);

impl MappedParameters {
    pub fn get(&self, field: &str) -> Option<&ParamValue> {
        self.0.get(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, ParamValue> {
        self.0
    }
}

impl FromIterator<(String, ParamValue)> for MappedParameters {
    fn from_iter<T: IntoIterator<Item = (String, ParamValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Renames every key of `params` to its REST field.
/// Fails with a list of all keys that have no REST counterpart.
pub fn convert_to_rest(
    table: &MappingTable,
    params: ResolvedParameters,
) -> crate::Result<MappedParameters> {
    let mut mapped = BTreeMap::new();
    let mut unconvertible = Vec::new();
    for (key, value) in params.into_inner() {
        match table.rest_field_for(&key) {
            Some(field) => {
                mapped.insert(field.to_string(), value);
            }
            None => unconvertible.push(key),
        }
    }
    if !unconvertible.is_empty() {
        return Err(crate::Error::UnconvertibleParameter {
            keys: unconvertible,
        });
    }
    Ok(MappedParameters(mapped))
}

/// Finds the flag that stores `value` into the field, preferring the owner of the field.
fn flag_for_value<'t>(
    table: &'t MappingTable,
    flag_key: &str,
    value: &ParamValue,
) -> Option<(&'t MappingEntry, Option<String>)> {
    let mut entries = table.entries_for_destination(flag_key);
    let owner = entries.next()?;
    match (owner.value(), value) {
        (ValueSpec::Switch(ConstValue::Bool(stored)), ParamValue::Bool(value)) => {
            if stored == value {
                Some((owner, None))
            } else {
                entries
                    .find(|entry| *entry.value() == ValueSpec::Switch(ConstValue::Bool(*value)))
                    .map(|entry| (entry, None))
            }
        }
        (ValueSpec::Switch(_), _) => None,
        (_, value) => Some((owner, Some(value.to_string()))),
    }
}

/// Writes `params` as `#SBATCH` directive lines, one flag per line, in REST field order.
/// Boolean fields whose value only states the scheduler default and have no flag for it
/// (e.g. `hold = false`) are left out.
pub fn render_directives(
    table: &MappingTable,
    syntax: &DirectiveSyntax,
    params: &JobParameters,
) -> crate::Result<String> {
    let fields = params.to_map()?;
    let without_flag: Vec<String> = fields
        .keys()
        .filter(|field| table.flag_key_for(field).is_none())
        .cloned()
        .collect();
    if !without_flag.is_empty() {
        return Err(crate::Error::NoDirectiveForField {
            fields: without_flag,
        });
    }

    let mut output = String::new();
    for (field, value) in fields {
        let value: ParamValue = serde_json::from_value(value)?;
        // Checked above
        let Some(flag_key) = table.flag_key_for(&field) else {
            continue;
        };
        let Some((entry, argument)) = flag_for_value(table, flag_key, &value) else {
            log::debug!("Field {field} = {value} has no directive, skipping it");
            continue;
        };
        let written = match argument {
            Some(argument) => {
                if argument.contains(syntax.comment) || argument.contains('\n') {
                    return Err(crate::Error::UnrenderableValue {
                        field,
                        value: argument,
                    });
                }
                writeln!(
                    output,
                    "{} {}={}",
                    syntax.marker,
                    entry.flag_long(),
                    quote_if_needed(&argument)
                )
            }
            None => writeln!(output, "{} {}", syntax.marker, entry.flag_long()),
        };
        written.map_err(|error| crate::Error::GenericError(error.to_string()))?;
    }
    Ok(output)
}
