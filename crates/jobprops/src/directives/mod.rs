//! Extraction of `#SBATCH` directives from job scripts.

pub mod extract;
pub mod resolve;
pub mod tokenize;

use crate::directives::extract::{DirectiveSyntax, extract_directives};
use crate::directives::resolve::{ResolvedParameters, resolve_arguments};
use crate::directives::tokenize::tokenize;
use crate::mapping::MappingTable;
use crate::mapping::convert::{MappedParameters, convert_to_rest, render_directives};
use crate::params::{JobParameters, Overrides, merge_parameters};
use crate::script::{FetchError, ScriptStore};

/// Turns the directives of a job script into job parameters using a mapping table.
#[derive(Debug)]
pub struct DirectiveParser {
    table: MappingTable,
    syntax: DirectiveSyntax,
}

impl DirectiveParser {
    pub fn new(table: MappingTable) -> Self {
        Self {
            table,
            syntax: DirectiveSyntax::default(),
        }
    }

    /// Parser of `#SBATCH` directives with the built-in sbatch table.
    pub fn sbatch() -> crate::Result<Self> {
        Ok(Self::new(MappingTable::sbatch()?))
    }

    pub fn table(&self) -> &MappingTable {
        &self.table
    }

    pub fn syntax(&self) -> &DirectiveSyntax {
        &self.syntax
    }

    /// Arguments of all directives of `script`, concatenated in document order.
    pub fn tokens(&self, script: &str) -> crate::Result<Vec<String>> {
        let mut tokens = Vec::new();
        for directive in extract_directives(script, &self.syntax) {
            let mut args =
                tokenize(&directive.body).map_err(|error| crate::Error::DirectiveSyntax {
                    line: directive.line,
                    message: error.to_string(),
                })?;
            tokens.append(&mut args);
        }
        log::debug!("Applying directive(s): {tokens:?}");
        Ok(tokens)
    }

    /// Parameters of `script` keyed by the flag namespace.
    pub fn resolve(&self, script: &str) -> crate::Result<ResolvedParameters> {
        let tokens = self.tokens(script)?;
        resolve_arguments(&self.table, &tokens)
    }

    /// Parameters of `script` keyed by REST fields.
    pub fn mapped(&self, script: &str) -> crate::Result<MappedParameters> {
        convert_to_rest(&self.table, self.resolve(script)?)
    }

    /// Parameters of `script` combined with `overrides`; overrides take precedence.
    pub fn job_parameters(
        &self,
        script: &str,
        overrides: Overrides,
    ) -> crate::Result<JobParameters> {
        merge_parameters(self.mapped(script)?, overrides)
    }

    /// Like [`DirectiveParser::job_parameters`], but the script is fetched from `store`.
    pub fn job_parameters_from_store<S: ScriptStore + ?Sized>(
        &self,
        store: &S,
        id: &str,
        overrides: Overrides,
    ) -> crate::Result<JobParameters> {
        log::debug!("Fetching job script {id}");
        let script = store.fetch_script_text(id).map_err(|error| match error {
            FetchError::NotFound => crate::Error::ScriptNotFound { id: id.to_string() },
            FetchError::Other(source) => crate::Error::ScriptFetch {
                id: id.to_string(),
                source,
            },
        })?;
        self.job_parameters(&script, overrides)
    }

    /// Writes `params` back as directive lines.
    pub fn render(&self, params: &JobParameters) -> crate::Result<String> {
        render_directives(&self.table, &self.syntax, params)
    }
}

#[cfg(test)]
mod tests {
    use super::DirectiveParser;
    use crate::mapping::ValueSpec;
    use crate::params::{JobParameters, Overrides, ParamValue};
    use crate::tests::utils::{overrides, sbatch_parser};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn mapped(script: &str) -> BTreeMap<String, ParamValue> {
        sbatch_parser().mapped(script).unwrap().into_inner()
    }

    fn error(script: &str) -> String {
        sbatch_parser()
            .job_parameters(script, Overrides::new())
            .unwrap_err()
            .to_string()
    }

    #[test]
    fn test_empty_script() {
        let parser = sbatch_parser();
        assert_eq!(
            parser.job_parameters("", Overrides::new()).unwrap(),
            JobParameters::default()
        );
        assert_eq!(
            parser
                .job_parameters("#!/bin/bash\necho hello\n", Overrides::new())
                .unwrap(),
            JobParameters::default()
        );
    }

    #[test]
    fn test_marker_only_lines() {
        assert!(mapped("#SBATCH\n#SBATCH   \n#SBATCH # nothing").is_empty());
    }

    #[test]
    fn test_full_script() {
        let script = r#"#!/bin/bash
#SBATCH --job-name="my job" # named
#SBATCH -N 2 --ntasks-per-node=4
#SBATCH --time=01:00:00
#SBATCH --partition debug
#SBATCH --requeue
#SBATCH --exclusive
module load python
srun python main.py
"#;
        let params = sbatch_parser()
            .job_parameters(script, Overrides::new())
            .unwrap();
        assert_eq!(
            params,
            JobParameters {
                name: Some("my job".to_string()),
                nodes: Some("2".to_string()),
                tasks_per_node: Some(4),
                time_limit: Some("01:00:00".to_string()),
                partition: Some("debug".to_string()),
                requeue: Some(true),
                exclusive: Some("exclusive".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_long_and_short_flags_are_equivalent() {
        let parser = sbatch_parser();
        for entry in parser.table().entries() {
            let (Some(short), Some(field)) = (entry.flag_short(), entry.rest_field()) else {
                continue;
            };
            let value = match entry.value() {
                ValueSpec::Switch(_) => String::new(),
                ValueSpec::Integer => " 1".to_string(),
                ValueSpec::Choice { choices, .. } => format!(" {}", choices[0]),
                ValueSpec::Text => " value".to_string(),
            };
            let long = parser
                .mapped(&format!("#SBATCH {}{value}", entry.flag_long()))
                .unwrap();
            let short = parser
                .mapped(&format!("#SBATCH {short}{value}"))
                .unwrap();
            assert_eq!(long, short, "{}", entry.display_name());
            assert!(long.get(field).is_some(), "{field}");
        }
    }

    #[test]
    fn test_requeue_last_wins() {
        assert_eq!(
            mapped("#SBATCH --requeue\n#SBATCH --no-requeue"),
            BTreeMap::from([("requeue".to_string(), ParamValue::Bool(false))])
        );
        assert_eq!(
            mapped("#SBATCH --no-requeue\n#SBATCH --requeue"),
            BTreeMap::from([("requeue".to_string(), ParamValue::Bool(true))])
        );
    }

    #[test]
    fn test_exclusive_and_oversubscribe() {
        let exclusive = |script: &str| mapped(script).remove("exclusive");
        assert_eq!(exclusive("#SBATCH --exclusive"), Some("exclusive".into()));
        assert_eq!(exclusive("#SBATCH --exclusive=user"), Some("user".into()));
        assert_eq!(exclusive("#SBATCH --exclusive mcs"), Some("mcs".into()));
        assert_eq!(
            exclusive("#SBATCH --oversubscribe"),
            Some("oversubscribe".into())
        );
        assert_eq!(exclusive("#SBATCH -s"), Some("oversubscribe".into()));
        assert_eq!(
            exclusive("#SBATCH --exclusive\n#SBATCH --oversubscribe"),
            Some("oversubscribe".into())
        );
        assert_eq!(
            exclusive("#SBATCH --oversubscribe\n#SBATCH --exclusive"),
            Some("exclusive".into())
        );
        assert_eq!(
            exclusive("#SBATCH --exclusive --nodes=2"),
            Some("exclusive".into())
        );
    }

    #[test]
    fn test_exclusive_invalid() {
        insta::assert_snapshot!(
            error("#SBATCH --exclusive=bogus"),
            @"argument --exclusive: invalid choice: 'bogus' (choose from 'user', 'mcs', 'exclusive', 'oversubscribe')"
        );
        insta::assert_snapshot!(
            error("#SBATCH --oversubscribe=bogus"),
            @"argument --oversubscribe/-s: ignored explicit argument 'bogus'"
        );
    }

    #[test]
    fn test_unknown_flags() {
        insta::assert_snapshot!(
            error("#SBATCH --foo\n#SBATCH --nodes=1 --bar=0"),
            @"unrecognized arguments: --foo --bar=0"
        );
    }

    #[test]
    fn test_flag_without_rest_field() {
        insta::assert_snapshot!(
            error("#SBATCH --export=ALL --nodes=1"),
            @"parameter without a REST equivalent: export"
        );
    }

    #[test]
    fn test_directives_after_commands() {
        assert_eq!(
            mapped("#!/bin/sh\necho start\n#SBATCH -N3\n"),
            BTreeMap::from([("nodes".to_string(), ParamValue::from("3"))])
        );
    }

    #[test]
    fn test_value_split_across_lines() {
        assert_eq!(
            mapped("#SBATCH --job-name\n#SBATCH abc"),
            BTreeMap::from([("name".to_string(), ParamValue::from("abc"))])
        );
    }

    #[test]
    fn test_unterminated_quote() {
        let message = error("#!/bin/sh\n#SBATCH --job-name=\"abc\n");
        assert!(
            message.starts_with("invalid directive at line 2: "),
            "{message}"
        );
    }

    #[test]
    fn test_overrides_win() {
        let params = sbatch_parser()
            .job_parameters(
                "#SBATCH --job-name=script --nodes=2",
                overrides(json!({"name": "override", "partition": "gpu"})),
            )
            .unwrap();
        assert_eq!(params.name.as_deref(), Some("override"));
        assert_eq!(params.nodes.as_deref(), Some("2"));
        assert_eq!(params.partition.as_deref(), Some("gpu"));
    }

    #[test]
    fn test_overrides_on_empty_script() {
        let params = sbatch_parser()
            .job_parameters("", overrides(json!({"tasks": 8})))
            .unwrap();
        assert_eq!(
            params,
            JobParameters {
                tasks: Some(8),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_parser_is_send_and_sync() {
        fn check<T: Send + Sync>() {}
        check::<DirectiveParser>();
    }

    #[test]
    fn test_shared_parser() {
        let parser = DirectiveParser::sbatch().unwrap();
        let first = parser.mapped("#SBATCH -J a").unwrap();
        let second = parser.mapped("#SBATCH -J b").unwrap();
        assert_eq!(first.get("name"), Some(&ParamValue::from("a")));
        assert_eq!(second.get("name"), Some(&ParamValue::from("b")));
    }
}
