use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

pub mod assembly;
pub mod catalog;
pub mod geometry;
pub mod parameters;
pub mod session;
pub mod svg;

pub use assembly::{AssemblyDefinition, DefinitionIssue, PanelDef, Preview3d, RoleAssignment, SeamDef};
pub use geometry::{Geometry, GeometryEngine, ResolvedPanel};
pub use parameters::{
    effective_params, resolve_numeric, ParameterDef, ParameterError, ParameterResolver,
    ParameterResult, ParameterValue,
};
pub use session::{DesignSession, DesignSessionPatch};
pub use svg::SvgRenderer;

/// Ошибки разбора определения сборки
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    /// Пустой ключ панели
    #[error("panel key must not be empty")]
    EmptyPanelKey,
    /// Некорректный JSON
    #[error("invalid assembly definition JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ключ панели: непустой идентификатор, уникальный внутри сборки
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PanelKey(String);

impl PanelKey {
    pub fn new(key: impl Into<String>) -> Result<Self, DefinitionError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(DefinitionError::EmptyPanelKey);
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PanelKey {
    type Error = DefinitionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PanelKey> for String {
    fn from(key: PanelKey) -> Self {
        key.0
    }
}

impl Borrow<str> for PanelKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PanelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Сторона прямоугольной панели
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
    /// Неизвестное значение из JSON: точка края в центре панели
    #[serde(other)]
    Unknown,
}

/// Семантическая роль панели (запасной источник 3D-размещения)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Front,
    Back,
    Top,
    Bottom,
    Side,
    SideLeft,
    Strap,
    #[serde(other)]
    Unknown,
}

/// Значение параметра сессии (произвольный JSON-скаляр)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<ParamValue>),
}

impl ParamValue {
    /// Числовое значение: числа как есть, строки парсятся, остальное: `None`.
    /// Нечисловые и бесконечные значения отбрасываются.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            ParamValue::Number(value) => *value,
            ParamValue::Text(text) => text.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        value.is_finite().then_some(value)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

/// 2D-точка контура панели
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_key_rejects_empty() {
        assert!(PanelKey::new("").is_err());
        assert!(PanelKey::new("   ").is_err());
        assert_eq!(PanelKey::new("front").unwrap().as_str(), "front");
    }

    #[test]
    fn test_panel_key_serde() {
        let key: PanelKey = serde_json::from_str(r#""gusset""#).unwrap();
        assert_eq!(key.as_str(), "gusset");
        assert_eq!(serde_json::to_string(&key).unwrap(), r#""gusset""#);
        assert!(serde_json::from_str::<PanelKey>(r#""""#).is_err());
    }

    #[test]
    fn test_edge_unknown_fallback() {
        let edge: Edge = serde_json::from_str(r#""left""#).unwrap();
        assert_eq!(edge, Edge::Left);
        let edge: Edge = serde_json::from_str(r#""diagonal""#).unwrap();
        assert_eq!(edge, Edge::Unknown);
    }

    #[test]
    fn test_role_snake_case() {
        let role: Role = serde_json::from_str(r#""side_left""#).unwrap();
        assert_eq!(role, Role::SideLeft);
        let role: Role = serde_json::from_str(r#""handle""#).unwrap();
        assert_eq!(role, Role::Unknown);
    }

    #[test]
    fn test_param_value_untagged() {
        let values: Vec<ParamValue> =
            serde_json::from_str(r#"[null, true, 9.5, "in", ["a", "b"]]"#).unwrap();
        assert!(values[0].is_null());
        assert_eq!(values[1], ParamValue::Bool(true));
        assert_eq!(values[2].as_f64(), Some(9.5));
        assert_eq!(values[3].as_f64(), None);
        assert!(matches!(values[4], ParamValue::List(_)));
    }

    #[test]
    fn test_param_value_numeric_string() {
        assert_eq!(ParamValue::from(" 12.5 ").as_f64(), Some(12.5));
        assert_eq!(ParamValue::from("wide").as_f64(), None);
        assert_eq!(ParamValue::Number(f64::NAN).as_f64(), None);
    }
}
