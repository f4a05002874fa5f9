use crate::DirectiveParser;
use crate::params::Overrides;

pub fn sbatch_parser() -> DirectiveParser {
    DirectiveParser::sbatch().unwrap()
}

pub fn overrides(value: serde_json::Value) -> Overrides {
    match value {
        serde_json::Value::Object(map) => map,
        value => panic!("Overrides have to be an object, not {value}"),
    }
}
