//! This module renders an assembled rule set into the target runtime's
//! persisted program format: a JSON object mapping rule names to arrays of
//! candidate strings, in emission order, tab-indented.
//!
//! Rendering is pure and total over well-formed rule sets. The reference
//! closure invariant is re-checked here as the final gate before any text
//! leaves the compiler.

use crate::grammar::Grammar;
use crate::types::Error;
use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Serializer, Value};

/// Renders `grammar` as a Tracery JSON program.
///
/// # Arguments
///
/// * `grammar` - The assembled rule set.
///
/// # Returns
///
/// * `Ok(String)` - The program text. Identical rule sets render to
///   byte-identical text.
/// * `Err(Error::Compile)` if a rule reference does not resolve; nothing is
///   rendered in that case.
pub fn encode(grammar: &Grammar) -> Result<String, Error> {
    grammar.check_references()?;

    let value = to_value(grammar);
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"\t"));
    value
        .serialize(&mut ser)
        .map_err(|e| Error::Json(e.to_string()))?;

    String::from_utf8(buf).map_err(|e| Error::Json(e.to_string()))
}

/// Builds the JSON value for `grammar` without rendering it to text.
///
/// Rule order is preserved: the map keeps insertion order, so the entry rule
/// comes first and the tape-support rules last.
pub fn to_value(grammar: &Grammar) -> Value {
    let mut map = serde_json::Map::new();
    for (name, rule) in grammar.iter() {
        let candidates = rule
            .candidates
            .iter()
            .map(|template| Value::String(template.render()))
            .collect();
        map.insert(name.to_string(), Value::Array(candidates));
    }

    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;
    use crate::compiler::compile;
    use crate::grammar::{GrammarRule, Template};
    use crate::types::{CompileError, Machine, MachineDef};

    fn sample_machine() -> Machine {
        analyze(&MachineDef {
            name: "strike-out".into(),
            states: vec!["wipe".into(), "yes".into(), "no".into()],
            symbols: vec!["a".into(), "_".into()],
            blank_symbol: "_".into(),
            start_state: "wipe".into(),
            accept_state: "yes".into(),
            reject_state: "no".into(),
            delta: vec![
                (
                    ("wipe".into(), "a".into()),
                    ("wipe".into(), "_".into(), ">".into()),
                ),
                (
                    ("wipe".into(), "_".into()),
                    ("yes".into(), "_".into(), "_".into()),
                ),
            ],
        })
        .unwrap()
    }

    #[test]
    fn test_encode_produces_an_object_of_candidate_arrays() {
        let grammar = compile(&sample_machine(), "aa").unwrap();
        let text = encode(&grammar).unwrap();

        let value: Value = serde_json::from_str(&text).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), grammar.len());
        for (_, candidates) in object {
            let list = candidates.as_array().unwrap();
            assert_eq!(list.len(), 1);
            assert!(list[0].is_string());
        }
    }

    #[test]
    fn test_entry_rule_is_rendered_first() {
        let grammar = compile(&sample_machine(), "").unwrap();
        let text = encode(&grammar).unwrap();

        let value: Value = serde_json::from_str(&text).unwrap();
        let first = value.as_object().unwrap().keys().next().unwrap().clone();
        assert_eq!(first, "origin");
        assert!(text.starts_with("{\n\t\"origin\":"));
    }

    #[test]
    fn test_encoding_is_byte_identical_across_compilations() {
        let machine = sample_machine();

        let first = encode(&compile(&machine, "aa").unwrap()).unwrap();
        let second = encode(&compile(&machine, "aa").unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_encode_rejects_dangling_references() {
        let mut grammar = Grammar::new("origin");
        grammar
            .insert(
                "origin",
                GrammarRule::single(Template::new().expand("nowhere")),
            )
            .unwrap();

        assert_eq!(
            encode(&grammar),
            Err(Error::Compile(CompileError::UnresolvedReference {
                rule: "origin".to_string(),
                target: "nowhere".to_string(),
            }))
        );
    }

    #[test]
    fn test_rendered_templates_round_trip_through_json() {
        let grammar = compile(&sample_machine(), "a").unwrap();
        let text = encode(&grammar).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();

        // The right-move transition survives the JSON carrier unchanged.
        assert_eq!(
            value["*wipe*a"][0].as_str().unwrap(),
            "[*right*:POP]#*push*left*_*#[*next*:#*wipe#]"
        );
    }
}
