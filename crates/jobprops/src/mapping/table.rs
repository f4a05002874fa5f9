use crate::mapping::policy::{EXCLUSIVE, NO_REQUEUE, OVERSUBSCRIBE, REQUEUE};
use crate::mapping::{ConstValue, MappingEntry, ValueSpec};

const TEXT: ValueSpec = ValueSpec::Text;
const INT: ValueSpec = ValueSpec::Integer;
const SWITCH: ValueSpec = ValueSpec::Switch(ConstValue::Bool(true));

const fn long(rest_field: &'static str, flag_long: &'static str, value: ValueSpec) -> MappingEntry {
    MappingEntry::new(rest_field, flag_long, None, value)
}

const fn short(
    rest_field: &'static str,
    flag_long: &'static str,
    flag_short: &'static str,
    value: ValueSpec,
) -> MappingEntry {
    MappingEntry::new(rest_field, flag_long, Some(flag_short), value)
}

/// Every `sbatch` option understood inside `#SBATCH` directives.
/// Options with an empty REST field are accepted in scripts, but they cannot be
/// submitted through the REST API.
pub const SBATCH_ENTRIES: &[MappingEntry] = &[
    short("account", "--account", "-A", TEXT),
    long("account_gather_frequency", "--acctg-freq", TEXT),
    short("array", "--array", "-a", TEXT),
    long("batch_features", "--batch", TEXT),
    short("begin_time", "--begin", "-b", TEXT),
    short("current_working_directory", "--chdir", "-D", TEXT),
    long("cluster_constraint", "--cluster-constraint", TEXT),
    short("", "--clusters", "-M", TEXT),
    long("comment", "--comment", TEXT),
    short("constraints", "--constraint", "-C", TEXT),
    long("", "--container", TEXT),
    long("", "--contiguous", SWITCH),
    short("core_specification", "--core-spec", "-S", INT),
    long("cores_per_socket", "--cores-per-socket", INT),
    long("cpu_binding", "--cpu-bind", TEXT),
    long("cpu_frequency", "--cpu-freq", TEXT),
    long("cpus_per_gpu", "--cpus-per-gpu", INT),
    short("cpus_per_task", "--cpus-per-task", "-c", INT),
    long("deadline", "--deadline", TEXT),
    long("delay_boot", "--delay-boot", INT),
    short("dependency", "--dependency", "-d", TEXT),
    short("distribution", "--distribution", "-m", TEXT),
    short("standard_error", "--error", "-e", TEXT),
    short("", "--exclude", "-x", TEXT),
    EXCLUSIVE,
    long("", "--export", TEXT),
    long("", "--export-file", TEXT),
    short("", "--extra-node-info", "-B", TEXT),
    long("get_user_environment", "--get-user-env", SWITCH),
    long("", "--gid", TEXT),
    long("gpu_binding", "--gpu-bind", TEXT),
    long("gpu_frequency", "--gpu-freq", TEXT),
    short("gpus", "--gpus", "-G", TEXT),
    long("gpus_per_node", "--gpus-per-node", TEXT),
    long("gpus_per_socket", "--gpus-per-socket", TEXT),
    long("gpus_per_task", "--gpus-per-task", TEXT),
    long("gres", "--gres", TEXT),
    long("gres_flags", "--gres-flags", TEXT),
    long("", "--hint", TEXT),
    short("hold", "--hold", "-H", SWITCH),
    long("", "--ignore-pbs", SWITCH),
    short("standard_input", "--input", "-i", TEXT),
    short("name", "--job-name", "-J", TEXT),
    long(
        "kill_on_invalid_dependency",
        "--kill-on-invalid-dep",
        ValueSpec::Choice {
            choices: &["yes", "no"],
            default: None,
        },
    ),
    short("licenses", "--licenses", "-L", TEXT),
    long("mail_type", "--mail-type", TEXT),
    long("mail_user", "--mail-user", TEXT),
    long("mcs_label", "--mcs-label", TEXT),
    long("memory_per_node", "--mem", TEXT),
    long("", "--mem-bind", TEXT),
    long("memory_per_cpu", "--mem-per-cpu", TEXT),
    long("memory_per_gpu", "--mem-per-gpu", TEXT),
    long("minimum_cpus_per_node", "--mincpus", INT),
    long("", "--network", TEXT),
    long("nice", "--nice", INT),
    short("no_kill", "--no-kill", "-k", SWITCH),
    NO_REQUEUE,
    short("", "--nodefile", "-F", TEXT),
    short("", "--nodelist", "-w", TEXT),
    short("nodes", "--nodes", "-N", TEXT),
    short("tasks", "--ntasks", "-n", INT),
    long("", "--ntasks-per-core", INT),
    long("tasks_per_node", "--ntasks-per-node", INT),
    long("tasks_per_socket", "--ntasks-per-socket", INT),
    long(
        "open_mode",
        "--open-mode",
        ValueSpec::Choice {
            choices: &["append", "truncate"],
            default: None,
        },
    ),
    short("standard_output", "--output", "-o", TEXT),
    short("", "--overcommit", "-O", SWITCH),
    OVERSUBSCRIBE,
    long("", "--parsable", SWITCH),
    short("partition", "--partition", "-p", TEXT),
    long("", "--power", TEXT),
    long("priority", "--priority", TEXT),
    long("", "--profile", TEXT),
    long("", "--propagate", TEXT),
    short("qos", "--qos", "-q", TEXT),
    short("", "--quiet", "-Q", SWITCH),
    long("", "--reboot", SWITCH),
    REQUEUE,
    long("reservation", "--reservation", TEXT),
    long("signal", "--signal", TEXT),
    long("sockets_per_node", "--sockets-per-node", INT),
    long("spread_job", "--spread-job", SWITCH),
    long("", "--switches", TEXT),
    long("", "--test-only", SWITCH),
    long("thread_specification", "--thread-spec", INT),
    long("threads_per_core", "--threads-per-core", INT),
    short("time_limit", "--time", "-t", TEXT),
    long("time_minimum", "--time-min", TEXT),
    long("", "--tmp", TEXT),
    long("", "--uid", TEXT),
    long("", "--usage", SWITCH),
    long("minimum_nodes", "--use-min-nodes", SWITCH),
    short("", "--verbose", "-v", SWITCH),
    short("", "--version", "-V", SWITCH),
    short("", "--wait", "-W", SWITCH),
    long("wait_all_nodes", "--wait-all-nodes", INT),
    long("wckey", "--wckey", TEXT),
    long("", "--wrap", TEXT),
];
