mod value;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::mapping::convert::MappedParameters;

pub use value::ParamValue;

/// Explicit values supplied by the caller, keyed by REST field name.
pub type Overrides = serde_json::Map<String, serde_json::Value>;

macro_rules! define_job_parameters {
    ($($(#[$meta:meta])* $field:ident: $ty:ty),* $(,)?) => {
        /// Parameters of a job in the naming scheme of the Slurm REST API.
        /// Unset fields are left out of the serialized form.
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(deny_unknown_fields)]
        pub struct JobParameters {
            $(
                $(#[$meta])*
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )*
        }

        impl JobParameters {
            /// Names of all fields of the schema.
            pub const FIELDS: &'static [&'static str] = &[$(stringify!($field)),*];
        }
    };
}

define_job_parameters! {
    account: String,
    account_gather_frequency: String,
    array: String,
    batch_features: String,
    begin_time: String,
    cluster_constraint: String,
    comment: String,
    constraints: String,
    core_specification: i64,
    cores_per_socket: i64,
    cpu_binding: String,
    cpu_frequency: String,
    cpus_per_gpu: i64,
    cpus_per_task: i64,
    current_working_directory: String,
    deadline: String,
    delay_boot: i64,
    dependency: String,
    distribution: String,
    /// Environment variables of the job; only settable through overrides.
    environment: BTreeMap<String, String>,
    /// One of `user`, `mcs`, `exclusive` or `oversubscribe`.
    exclusive: String,
    get_user_environment: bool,
    gpu_binding: String,
    gpu_frequency: String,
    gpus: String,
    gpus_per_node: String,
    gpus_per_socket: String,
    gpus_per_task: String,
    gres: String,
    gres_flags: String,
    hold: bool,
    kill_on_invalid_dependency: String,
    licenses: String,
    mail_type: String,
    mail_user: String,
    mcs_label: String,
    memory_per_cpu: String,
    memory_per_gpu: String,
    memory_per_node: String,
    minimum_cpus_per_node: i64,
    minimum_nodes: bool,
    name: String,
    nice: i64,
    no_kill: bool,
    nodes: String,
    open_mode: String,
    partition: String,
    priority: String,
    qos: String,
    requeue: bool,
    reservation: String,
    signal: String,
    sockets_per_node: i64,
    spread_job: bool,
    standard_error: String,
    standard_input: String,
    standard_output: String,
    tasks: i64,
    tasks_per_node: i64,
    tasks_per_socket: i64,
    thread_specification: i64,
    threads_per_core: i64,
    time_limit: String,
    time_minimum: String,
    wait_all_nodes: i64,
    wckey: String,
}

impl JobParameters {
    /// Serialized form of the parameters, containing only the fields that are set.
    pub fn to_map(&self) -> crate::Result<Overrides> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            value => Err(crate::Error::SerializationError(format!(
                "job parameters serialized into {value} instead of an object"
            ))),
        }
    }
}

/// Combines parameters derived from a job script with explicit `overrides`.
/// A key present on both sides takes the value from `overrides`. The result has to fit
/// the closed [`JobParameters`] schema.
pub fn merge_parameters(
    mapped: MappedParameters,
    overrides: Overrides,
) -> crate::Result<JobParameters> {
    let mut merged: Overrides = mapped
        .into_inner()
        .into_iter()
        .map(|(key, value)| (key, value.into()))
        .collect();
    for (key, value) in overrides {
        if let Some(previous) = merged.get(&key) {
            log::debug!("Field {key} from the job script ({previous}) replaced by {value}");
        }
        merged.insert(key, value);
    }

    let unknown: Vec<String> = merged
        .keys()
        .filter(|key| !JobParameters::FIELDS.contains(&key.as_str()))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(crate::Error::UnknownSchemaField { fields: unknown });
    }

    log::debug!(
        "Merged job parameters: {}",
        merged.keys().cloned().collect::<Vec<_>>().join(", ")
    );
    serde_json::from_value(serde_json::Value::Object(merged))
        .map_err(|error| crate::Error::SchemaValidation(error.to_string()))
}
