//! Binding of request parameters to report parameters

use crate::reader::Value;
use crate::report::{ParamKind, ParamSpec};
use crate::{HeroscopeError, Result};
use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

/// Default upper bound for `top`-style integer parameters
pub const DEFAULT_MAX_TOP: i64 = 100;

/// Parameter values after validation, keyed by parameter name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundParams {
    values: BTreeMap<&'static str, Value>,
}

impl BoundParams {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Value of a declared parameter
    pub fn value(&self, name: &str) -> Result<Value> {
        self.values.get(name).cloned().ok_or_else(|| {
            HeroscopeError::InternalError(format!("Parameter '{}' was never bound", name))
        })
    }

    /// Replace every `{name}` in a template with its bound value
    ///
    /// Only placeholders of the template itself are substituted, in one
    /// pass; braces inside a value are kept as typed. Unknown names stay.
    pub fn render_template(&self, template: &str) -> String {
        placeholder_regex()
            .replace_all(template, |caps: &Captures| match self.values.get(&caps[1]) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

/// Validate raw request parameters against a report's declared parameters
///
/// Unknown request parameters are ignored. Integers are clamped to
/// `[1, max_top]`; text values are trimmed and must not be blank.
pub fn bind(
    specs: &[ParamSpec],
    raw: &HashMap<String, String>,
    max_top: i64,
) -> Result<BoundParams> {
    let mut values = BTreeMap::new();

    for spec in specs {
        let supplied = raw.get(spec.name).map(|s| s.trim());
        let value = match (&spec.kind, supplied) {
            (ParamKind::Integer { default }, None) | (ParamKind::Integer { default }, Some("")) => {
                Value::Int(clamp(*default, max_top))
            }
            (ParamKind::Integer { .. }, Some(text)) => {
                let parsed = text.parse::<i64>().map_err(|_| {
                    HeroscopeError::ValidationError(format!(
                        "Parameter '{}' must be an integer, got '{}'",
                        spec.name, text
                    ))
                })?;
                Value::Int(clamp(parsed, max_top))
            }
            (ParamKind::Text, Some(text)) if !text.is_empty() => Value::from(text),
            (ParamKind::Text, _) => {
                return Err(HeroscopeError::ValidationError(format!(
                    "Missing required parameter '{}' ({})",
                    spec.name, spec.description
                )))
            }
        };
        values.insert(spec.name, value);
    }

    Ok(BoundParams { values })
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("Invalid placeholder regex")
    })
}

fn clamp(value: i64, max_top: i64) -> i64 {
    value.clamp(1, max_top.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn top_spec() -> Vec<ParamSpec> {
        vec![ParamSpec::integer("top", 10, "Number of rows")]
    }

    #[test]
    fn test_integer_default() {
        let bound = bind(&top_spec(), &HashMap::new(), 100).unwrap();
        assert_eq!(bound.get("top"), Some(&Value::Int(10)));
    }

    #[test]
    fn test_integer_clamped_both_ways() {
        let low = bind(&top_spec(), &raw(&[("top", "-4")]), 100).unwrap();
        assert_eq!(low.get("top"), Some(&Value::Int(1)));

        let high = bind(&top_spec(), &raw(&[("top", "1000000")]), 100).unwrap();
        assert_eq!(high.get("top"), Some(&Value::Int(100)));

        let exact = bind(&top_spec(), &raw(&[("top", " 7 ")]), 100).unwrap();
        assert_eq!(exact.get("top"), Some(&Value::Int(7)));
    }

    #[test]
    fn test_integer_not_a_number() {
        let result = bind(&top_spec(), &raw(&[("top", "ten")]), 100);
        match result {
            Err(HeroscopeError::ValidationError(msg)) => assert!(msg.contains("'top'")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_text_required() {
        let specs = vec![ParamSpec::text("power", "Power name substring")];
        assert!(matches!(
            bind(&specs, &HashMap::new(), 100),
            Err(HeroscopeError::ValidationError(_))
        ));
        assert!(matches!(
            bind(&specs, &raw(&[("power", "")]), 100),
            Err(HeroscopeError::ValidationError(_))
        ));

        let bound = bind(&specs, &raw(&[("power", "  flight ")]), 100).unwrap();
        assert_eq!(bound.get("power"), Some(&Value::from("flight")));
    }

    #[test]
    fn test_unknown_parameters_ignored() {
        let bound = bind(&top_spec(), &raw(&[("format", "svg")]), 100).unwrap();
        assert!(bound.get("format").is_none());
    }

    #[test]
    fn test_render_template() {
        let specs = vec![
            ParamSpec::text("hero1", "First hero"),
            ParamSpec::text("hero2", "Second hero"),
        ];
        let bound = bind(
            &specs,
            &raw(&[("hero1", "Storm"), ("hero2", "Rogue")]),
            100,
        )
        .unwrap();
        assert_eq!(bound.render_template("{hero1} vs {hero2}"), "Storm vs Rogue");
        assert_eq!(bound.render_template("Poder"), "Poder");
        assert_eq!(bound.render_template("{unknown}"), "{unknown}");
    }

    #[test]
    fn test_render_template_keeps_braces_in_values() {
        let specs = vec![
            ParamSpec::text("hero1", "First hero"),
            ParamSpec::text("hero2", "Second hero"),
        ];
        let bound = bind(
            &specs,
            &raw(&[("hero1", "{hero2}"), ("hero2", "Storm")]),
            100,
        )
        .unwrap();
        assert_eq!(
            bound.render_template("Comparativa de poderes: {hero1} vs {hero2}"),
            "Comparativa de poderes: {hero2} vs Storm"
        );
        assert_eq!(bound.render_template("{hero1}"), "{hero2}");
    }

    #[test]
    fn test_unbound_value_is_internal_error() {
        let bound = BoundParams::default();
        assert!(matches!(
            bound.value("top"),
            Err(HeroscopeError::InternalError(_))
        ));
    }
}
