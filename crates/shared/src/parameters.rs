use crate::ParamValue;
use evalexpr::{build_operator_tree, ContextWithMutableVariables, HashMapContext, Value};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Результат вычисления параметра
pub type ParameterResult = Result<f64, ParameterError>;

/// Ошибки при работе с параметрами
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParameterError {
    /// Параметр не найден
    #[error("Parameter '{0}' not found")]
    NotFound(String),
    /// Ошибка парсинга формулы
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Ошибка вычисления формулы
    #[error("Evaluation error: {0}")]
    EvaluationError(String),
    /// Циклическая зависимость
    #[error("Circular dependency: {}", .0.join(" -> "))]
    CircularDependency(Vec<String>),
    /// Неверный тип значения
    #[error("Invalid type: {0}")]
    InvalidType(String),
}

/// Значение параметра по умолчанию: число или формула
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterValue {
    Number { value: f64 },
    Formula { expression: String },
}

/// Объявление параметра в определении сборки
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDef {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub value: ParameterValue,
}

impl ParameterDef {
    pub fn number(key: &str, value: f64) -> Self {
        Self {
            key: key.to_string(),
            label: None,
            value: ParameterValue::Number { value },
        }
    }

    pub fn formula(key: &str, expression: &str) -> Self {
        Self {
            key: key.to_string(),
            label: None,
            value: ParameterValue::Formula {
                expression: expression.to_string(),
            },
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }
}

/// Вычислитель параметров: значения по умолчанию + переопределения сессии.
///
/// Переопределение с числовым значением всегда побеждает формулу;
/// `null` и нечисловые значения не переопределяют ничего.
pub struct ParameterResolver<'a> {
    defs: &'a [ParameterDef],
    overrides: &'a BTreeMap<String, ParamValue>,
}

impl<'a> ParameterResolver<'a> {
    pub fn new(defs: &'a [ParameterDef], overrides: &'a BTreeMap<String, ParamValue>) -> Self {
        Self { defs, overrides }
    }

    /// Вычислить значение параметра
    pub fn evaluate(&self, name: &str) -> ParameterResult {
        let mut visited = HashSet::new();
        let mut path = Vec::new();
        self.evaluate_internal(name, &mut visited, &mut path)
    }

    fn evaluate_internal(
        &self,
        name: &str,
        visited: &mut HashSet<String>,
        path: &mut Vec<String>,
    ) -> ParameterResult {
        if let Some(value) = self.overrides.get(name).and_then(ParamValue::as_f64) {
            return Ok(value);
        }

        // Проверка на циклическую зависимость
        if visited.contains(name) {
            path.push(name.to_string());
            return Err(ParameterError::CircularDependency(path.clone()));
        }

        let def = self
            .defs
            .iter()
            .find(|def| def.key == name)
            .ok_or_else(|| ParameterError::NotFound(name.to_string()))?;

        visited.insert(name.to_string());
        path.push(name.to_string());

        let result = match &def.value {
            ParameterValue::Number { value } => Ok(*value),
            ParameterValue::Formula { expression } => {
                self.evaluate_formula(expression, visited, path)
            }
        };

        visited.remove(name);
        path.pop();

        result
    }

    fn evaluate_formula(
        &self,
        expression: &str,
        visited: &mut HashSet<String>,
        path: &mut Vec<String>,
    ) -> ParameterResult {
        let tree = build_operator_tree(expression)
            .map_err(|e| ParameterError::ParseError(e.to_string()))?;

        let mut context = HashMapContext::new();
        context
            .set_value("PI".to_string(), Value::Float(std::f64::consts::PI))
            .ok();
        context
            .set_value("E".to_string(), Value::Float(std::f64::consts::E))
            .ok();

        let deps: BTreeSet<String> = tree
            .iter_variable_identifiers()
            .filter(|ident| *ident != "PI" && *ident != "E")
            .map(str::to_string)
            .collect();

        for dep in deps {
            let value = self.evaluate_internal(&dep, visited, path)?;
            context
                .set_value(dep, Value::Float(value))
                .map_err(|e| ParameterError::EvaluationError(e.to_string()))?;
        }

        let value = tree
            .eval_with_context(&context)
            .map_err(|e| ParameterError::EvaluationError(e.to_string()))?;

        match value {
            Value::Float(f) if f.is_finite() => Ok(f),
            Value::Int(i) => Ok(i as f64),
            other => Err(ParameterError::InvalidType(format!(
                "Expected finite number, got {:?}",
                other
            ))),
        }
    }

    /// Все известные имена: объявленные параметры и числовые переопределения
    pub fn names(&self) -> BTreeSet<String> {
        self.defs
            .iter()
            .map(|def| def.key.clone())
            .chain(
                self.overrides
                    .iter()
                    .filter(|(_, value)| value.as_f64().is_some())
                    .map(|(key, _)| key.clone()),
            )
            .collect()
    }

    /// Получить все параметры с вычисленными значениями
    pub fn evaluate_all(&self) -> BTreeMap<String, ParameterResult> {
        self.names()
            .into_iter()
            .map(|name| {
                let result = self.evaluate(&name);
                (name, result)
            })
            .collect()
    }
}

/// Числовые параметры; ошибки вычисления логируются и параметр опускается.
pub fn resolve_numeric(
    defs: &[ParameterDef],
    overrides: &BTreeMap<String, ParamValue>,
) -> BTreeMap<String, f64> {
    ParameterResolver::new(defs, overrides)
        .evaluate_all()
        .into_iter()
        .filter_map(|(name, result)| match result {
            Ok(value) => Some((name, value)),
            Err(e) => {
                tracing::warn!("parameter '{name}' unresolved: {e}");
                None
            }
        })
        .collect()
}

/// Эффективные параметры: вычисленные значения по умолчанию, поверх: снимок сессии.
pub fn effective_params(
    defs: &[ParameterDef],
    snapshot: &BTreeMap<String, ParamValue>,
) -> BTreeMap<String, ParamValue> {
    let mut params: BTreeMap<String, ParamValue> = resolve_numeric(defs, snapshot)
        .into_iter()
        .map(|(name, value)| (name, ParamValue::Number(value)))
        .collect();

    for (key, value) in snapshot {
        if value.is_null() || value.as_f64().is_some() {
            continue;
        }
        params.insert(key.clone(), value.clone());
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(pairs: &[(&str, ParamValue)]) -> BTreeMap<String, ParamValue> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_number_default() {
        let defs = vec![ParameterDef::number("width", 9.0)];
        let empty = BTreeMap::new();
        let resolver = ParameterResolver::new(&defs, &empty);
        assert_eq!(resolver.evaluate("width"), Ok(9.0));
    }

    #[test]
    fn test_formula_uses_dependencies() {
        let defs = vec![
            ParameterDef::number("height", 6.0),
            ParameterDef::formula("strap_length", "height * 2 + 1"),
        ];
        let empty = BTreeMap::new();
        let resolver = ParameterResolver::new(&defs, &empty);
        assert_eq!(resolver.evaluate("strap_length"), Ok(13.0));
    }

    #[test]
    fn test_formula_sees_session_override() {
        let defs = vec![
            ParameterDef::number("height", 6.0),
            ParameterDef::formula("strap_length", "height * 2"),
        ];
        let snapshot = overrides(&[("height", ParamValue::Number(10.0))]);
        let resolver = ParameterResolver::new(&defs, &snapshot);
        assert_eq!(resolver.evaluate("strap_length"), Ok(20.0));
    }

    #[test]
    fn test_null_override_keeps_default() {
        let defs = vec![ParameterDef::number("width", 9.0)];
        let snapshot = overrides(&[("width", ParamValue::Null)]);
        let resolver = ParameterResolver::new(&defs, &snapshot);
        assert_eq!(resolver.evaluate("width"), Ok(9.0));
    }

    #[test]
    fn test_circular_dependency() {
        let defs = vec![
            ParameterDef::formula("a", "b + 1"),
            ParameterDef::formula("b", "a + 1"),
        ];
        let empty = BTreeMap::new();
        let resolver = ParameterResolver::new(&defs, &empty);
        match resolver.evaluate("a") {
            Err(ParameterError::CircularDependency(chain)) => {
                assert_eq!(chain.first().map(String::as_str), Some("a"));
                assert_eq!(chain.last().map(String::as_str), Some("a"));
            }
            other => panic!("expected circular dependency, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_dependency() {
        let defs = vec![ParameterDef::formula("a", "ghost * 2")];
        let empty = BTreeMap::new();
        let resolver = ParameterResolver::new(&defs, &empty);
        assert_eq!(
            resolver.evaluate("a"),
            Err(ParameterError::NotFound("ghost".to_string()))
        );
    }

    #[test]
    fn test_parse_error() {
        let defs = vec![ParameterDef::formula("a", "(2 + 3")];
        let empty = BTreeMap::new();
        let resolver = ParameterResolver::new(&defs, &empty);
        assert!(matches!(
            resolver.evaluate("a"),
            Err(ParameterError::ParseError(_))
        ));
    }

    #[test]
    fn test_resolve_numeric_drops_failures() {
        let defs = vec![
            ParameterDef::number("width", 9.0),
            ParameterDef::formula("broken", "width +"),
        ];
        let resolved = resolve_numeric(&defs, &BTreeMap::new());
        assert_eq!(resolved.get("width"), Some(&9.0));
        assert!(!resolved.contains_key("broken"));
    }

    #[test]
    fn test_effective_params_merge() {
        let defs = vec![
            ParameterDef::number("width", 9.0),
            ParameterDef::number("height", 6.0),
        ];
        let snapshot = overrides(&[
            ("height", ParamValue::Number(7.0)),
            ("units", ParamValue::from("in")),
            ("depth", ParamValue::from("2")),
        ]);
        let params = effective_params(&defs, &snapshot);
        assert_eq!(params["width"], ParamValue::Number(9.0));
        assert_eq!(params["height"], ParamValue::Number(7.0));
        assert_eq!(params["depth"], ParamValue::Number(2.0));
        assert_eq!(params["units"], ParamValue::from("in"));
    }

    #[test]
    fn test_parameter_def_serde() {
        let json = r#"{"key": "strap", "type": "formula", "expression": "height * 2"}"#;
        let def: ParameterDef = serde_json::from_str(json).unwrap();
        assert_eq!(def, ParameterDef::formula("strap", "height * 2"));

        let json = r#"{"key": "width", "label": "Width", "type": "number", "value": 9}"#;
        let def: ParameterDef = serde_json::from_str(json).unwrap();
        assert_eq!(def, ParameterDef::number("width", 9.0).with_label("Width"));
    }
}
