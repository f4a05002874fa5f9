use thiserror::Error;

use crate::common::utils::str::pluralize;

/// What went wrong with the value of a single flag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueProblem {
    #[error("expected one argument")]
    MissingValue,
    #[error("invalid int value: '{0}'")]
    InvalidInteger(String),
    #[error("invalid choice: '{value}' (choose from {})", format_choices(.choices))]
    InvalidChoice {
        value: String,
        choices: &'static [&'static str],
    },
    #[error("ignored explicit argument '{0}'")]
    ExplicitArgument(String),
}

fn format_choices(choices: &[&str]) -> String {
    choices
        .iter()
        .map(|choice| format!("'{choice}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum JobPropsError {
    #[error("unrecognized {}: {}", pluralize("argument", .tokens.len()), .tokens.join(" "))]
    UnrecognizedDirective { tokens: Vec<String> },
    #[error("argument {flag}: {problem}")]
    InvalidFlagValue { flag: String, problem: ValueProblem },
    #[error(
        "{} without a REST equivalent: {}",
        pluralize("parameter", .keys.len()),
        .keys.join(", ")
    )]
    UnconvertibleParameter { keys: Vec<String> },
    #[error("no directive exists for {}: {}", pluralize("field", .fields.len()), .fields.join(", "))]
    NoDirectiveForField { fields: Vec<String> },
    #[error("unknown job parameter {}: {}", pluralize("field", .fields.len()), .fields.join(", "))]
    UnknownSchemaField { fields: Vec<String> },
    #[error("invalid job parameters: {0}")]
    SchemaValidation(String),
    #[error("invalid directive at line {line}: {message}")]
    DirectiveSyntax { line: usize, message: String },
    #[error("job script {id} was not found")]
    ScriptNotFound { id: String },
    #[error("cannot fetch job script {id}: {source}")]
    ScriptFetch {
        id: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("value '{value}' of field {field} cannot be written as a directive")]
    UnrenderableValue { field: String, value: String },
    #[error("Invalid mapping table: {0}")]
    InvalidMappingTable(String),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
    #[error("Error: {0}")]
    GenericError(String),
}

impl From<serde_json::error::Error> for JobPropsError {
    fn from(e: serde_json::error::Error) -> Self {
        Self::SerializationError(e.to_string())
    }
}

impl From<anyhow::Error> for JobPropsError {
    fn from(error: anyhow::Error) -> Self {
        Self::GenericError(error.to_string())
    }
}

impl From<toml::de::Error> for JobPropsError {
    fn from(error: toml::de::Error) -> Self {
        Self::DeserializationError(error.to_string())
    }
}
