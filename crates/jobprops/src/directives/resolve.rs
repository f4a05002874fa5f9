use std::collections::BTreeMap;

use crate::common::error::ValueProblem;
use crate::common::parser::{consume_all, p_i64};
use crate::mapping::{MappingEntry, MappingTable, ValueSpec};
use crate::params::ParamValue;

/// Parameter values keyed by the flag namespace (`job_name`, `cpus_per_task`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedParameters(BTreeMap<String, ParamValue>);

impl ResolvedParameters {
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, ParamValue> {
        self.0
    }
}

impl FromIterator<(String, ParamValue)> for ResolvedParameters {
    fn from_iter<T: IntoIterator<Item = (String, ParamValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// `-5` or `-.5` are values, not options.
fn is_negative_number(token: &str) -> bool {
    let Some(number) = token.strip_prefix('-') else {
        return false;
    };
    let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    match number.split_once('.') {
        Some((integer, fraction)) => !fraction.is_empty() && digits(integer) && digits(fraction),
        None => !number.is_empty() && digits(number),
    }
}

/// Whether the token would be read as an option (known or not) rather than as a value.
fn looks_like_option(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-') && !is_negative_number(token) && !token.contains(' ')
}

struct FlagMatch<'t, 'a> {
    entry: &'t MappingEntry,
    destination: &'t str,
    attached: Option<&'a str>,
}

/// Matches `--flag`, `--flag=value`, `-f`, `-f=value` and `-fvalue` against the table.
fn match_flag<'t, 'a>(table: &'t MappingTable, token: &'a str) -> Option<FlagMatch<'t, 'a>> {
    if token.starts_with("--") {
        let (flag, attached) = match token.split_once('=') {
            Some((flag, value)) => (flag, Some(value)),
            None => (token, None),
        };
        return table
            .lookup_flag(flag)
            .map(|(entry, destination)| FlagMatch {
                entry,
                destination,
                attached,
            });
    }
    if !token.starts_with('-') || is_negative_number(token) {
        return None;
    }
    if let Some((entry, destination)) = table.lookup_flag(token) {
        return Some(FlagMatch {
            entry,
            destination,
            attached: None,
        });
    }
    let split = token.char_indices().nth(2)?.0;
    let (flag, rest) = token.split_at(split);
    table
        .lookup_flag(flag)
        .map(|(entry, destination)| FlagMatch {
            entry,
            destination,
            attached: Some(rest.strip_prefix('=').unwrap_or(rest)),
        })
}

fn invalid(entry: &MappingEntry, problem: ValueProblem) -> crate::Error {
    crate::Error::InvalidFlagValue {
        flag: entry.display_name(),
        problem,
    }
}

/// Takes the value of a flag: the attached one, or the next token if it is not an option.
fn take_value<'a>(
    attached: Option<&'a str>,
    tokens: &'a [String],
    index: &mut usize,
) -> Option<&'a str> {
    if attached.is_some() {
        return attached;
    }
    let next = tokens.get(*index).filter(|token| !looks_like_option(token))?;
    *index += 1;
    Some(next.as_str())
}

/// Resolves the whole token stream of a script against `table`.
///
/// A later occurrence of a flag (or of another flag writing the same field) replaces the
/// value of an earlier one. Invalid values fail immediately; unknown tokens are collected
/// and reported together once the whole stream has been read.
pub fn resolve_arguments(
    table: &MappingTable,
    tokens: &[String],
) -> crate::Result<ResolvedParameters> {
    let mut values = BTreeMap::new();
    let mut unrecognized = Vec::new();

    let mut index = 0;
    while index < tokens.len() {
        let token = tokens[index].as_str();
        index += 1;

        let Some(FlagMatch {
            entry,
            destination,
            attached,
        }) = match_flag(table, token)
        else {
            unrecognized.push(token.to_string());
            continue;
        };

        let value = match *entry.value() {
            ValueSpec::Switch(constant) => {
                if let Some(argument) = attached {
                    return Err(invalid(
                        entry,
                        ValueProblem::ExplicitArgument(argument.to_string()),
                    ));
                }
                constant.to_value()
            }
            ValueSpec::Text => {
                let argument = take_value(attached, tokens, &mut index)
                    .ok_or_else(|| invalid(entry, ValueProblem::MissingValue))?;
                ParamValue::Text(argument.to_string())
            }
            ValueSpec::Integer => {
                let argument = take_value(attached, tokens, &mut index)
                    .ok_or_else(|| invalid(entry, ValueProblem::MissingValue))?;
                let number = consume_all(p_i64, argument).map_err(|_| {
                    invalid(entry, ValueProblem::InvalidInteger(argument.to_string()))
                })?;
                ParamValue::Int(number)
            }
            ValueSpec::Choice { choices, default } => {
                let argument = match take_value(attached, tokens, &mut index) {
                    Some(argument) => argument,
                    None => default.ok_or_else(|| invalid(entry, ValueProblem::MissingValue))?,
                };
                if !choices.iter().any(|choice| *choice == argument) {
                    return Err(invalid(
                        entry,
                        ValueProblem::InvalidChoice {
                            value: argument.to_string(),
                            choices,
                        },
                    ));
                }
                ParamValue::Text(argument.to_string())
            }
        };

        if let Some(previous) = values.insert(destination.to_string(), value) {
            log::debug!("{token} replaces previous value '{previous}' of {destination}");
        }
    }

    if !unrecognized.is_empty() {
        return Err(crate::Error::UnrecognizedDirective {
            tokens: unrecognized,
        });
    }
    Ok(ResolvedParameters(values))
}
