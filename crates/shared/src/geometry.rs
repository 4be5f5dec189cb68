use crate::{effective_params, AssemblyDefinition, PanelKey, ParamValue, Point2D, Preview3d, SeamDef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Панель с вычисленными размерами и плоским контуром
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPanel {
    pub key: PanelKey,
    #[serde(default)]
    pub label: Option<String>,
    pub width: f64,
    pub height: f64,
    /// Прямоугольник против часовой стрелки от локального (0, 0)
    pub path: Vec<Point2D>,
}

impl ResolvedPanel {
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(self.key.as_str())
    }
}

/// Результат запроса геометрии для сессии
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub assembly_key: String,
    pub params: BTreeMap<String, ParamValue>,
    #[serde(default)]
    pub preview_3d: Preview3d,
    pub panels: Vec<ResolvedPanel>,
    #[serde(default)]
    pub seams: Vec<SeamDef>,
    #[serde(default)]
    pub steps: Vec<String>,
}

impl Geometry {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Числовой параметр; отсутствующие, нечисловые и бесконечные значения: 0
    pub fn numeric_param(&self, key: Option<&str>) -> f64 {
        key.and_then(|k| self.params.get(k))
            .and_then(ParamValue::as_f64)
            .unwrap_or(0.0)
    }

    /// Швы для 3D: из `preview_3d`, если заданы, иначе верхнеуровневые
    pub fn seam_list(&self) -> &[SeamDef] {
        if self.preview_3d.seams.is_empty() {
            &self.seams
        } else {
            &self.preview_3d.seams
        }
    }

    pub fn panel(&self, key: &str) -> Option<&ResolvedPanel> {
        self.panels.iter().find(|panel| panel.key.as_str() == key)
    }
}

/// Генератор плоской геометрии: размеры панелей из ссылок на параметры
pub struct GeometryEngine<'a> {
    definition: &'a AssemblyDefinition,
    params: BTreeMap<String, ParamValue>,
}

impl<'a> GeometryEngine<'a> {
    /// `snapshot`: параметры сессии; значения по умолчанию берутся из определения
    pub fn new(definition: &'a AssemblyDefinition, snapshot: &BTreeMap<String, ParamValue>) -> Self {
        Self {
            definition,
            params: effective_params(&definition.parameters, snapshot),
        }
    }

    pub fn build(self) -> Geometry {
        let panels = self
            .definition
            .panels
            .iter()
            .map(|panel| {
                let width = dimension(&self.params, panel.width_param.as_deref());
                let height = dimension(&self.params, panel.height_param.as_deref());
                ResolvedPanel {
                    key: panel.key.clone(),
                    label: panel.label.clone(),
                    width,
                    height,
                    path: rectangle_path(width, height),
                }
            })
            .collect();

        Geometry {
            assembly_key: self.definition.key.clone(),
            params: self.params,
            preview_3d: self.definition.preview_3d.clone(),
            panels,
            seams: self.definition.seams.clone(),
            steps: self.definition.steps.clone(),
        }
    }
}

fn dimension(params: &BTreeMap<String, ParamValue>, key: Option<&str>) -> f64 {
    key.and_then(|k| params.get(k))
        .and_then(ParamValue::as_f64)
        .map(|value| value.max(0.0))
        .unwrap_or(0.0)
}

pub fn rectangle_path(width: f64, height: f64) -> Vec<Point2D> {
    vec![
        Point2D::new(0.0, 0.0),
        Point2D::new(width, 0.0),
        Point2D::new(width, height),
        Point2D::new(0.0, height),
    ]
}
