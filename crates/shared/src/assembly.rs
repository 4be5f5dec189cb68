use crate::{DefinitionError, Edge, PanelKey, ParameterDef, Role};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

fn default_version() -> u32 {
    1
}

/// Панель в определении сборки: размеры задаются ссылками на параметры
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelDef {
    pub key: PanelKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_param: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_param: Option<String>,
}

/// Шов: край родительской панели соединён с краем дочерней под углом (градусы)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeamDef {
    pub parent: PanelKey,
    pub parent_edge: Edge,
    pub child: PanelKey,
    pub child_edge: Edge,
    #[serde(default)]
    pub angle: f64,
}

/// Роль панели в 3D-превью
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub role: Role,
}

/// Настройки 3D-превью сборки
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Preview3d {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seams: Vec<SeamDef>,
    /// Роли панелей (ключ панели → роль)
    #[serde(default)]
    pub panels: BTreeMap<PanelKey, RoleAssignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PanelKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_param: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_param: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth_param: Option<String>,
}

impl Preview3d {
    pub fn role_of(&self, key: &str) -> Option<Role> {
        self.panels.get(key).map(|assignment| assignment.role)
    }

    /// Панель с данной ролью. Если таких несколько, берётся первая по ключу;
    /// `validate` сообщает о повторах через [`DefinitionIssue::DuplicateRole`]
    pub fn panel_with_role(&self, role: Role) -> Option<&PanelKey> {
        self.panels
            .iter()
            .find(|(_, assignment)| assignment.role == role)
            .map(|(key, _)| key)
    }
}

/// Определение сборки (изделия): параметры, панели, швы, шаги
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyDefinition {
    pub key: String,
    pub name: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub parameters: Vec<ParameterDef>,
    #[serde(default)]
    pub panels: Vec<PanelDef>,
    #[serde(default)]
    pub seams: Vec<SeamDef>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub preview_3d: Preview3d,
}

impl AssemblyDefinition {
    /// Пустое определение (без панелей и швов)
    pub fn empty(key: &str, name: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            version: 1,
            parameters: Vec::new(),
            panels: Vec::new(),
            seams: Vec::new(),
            steps: Vec::new(),
            preview_3d: Preview3d::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, DefinitionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Швы для 3D: из `preview_3d`, если они там заданы, иначе верхнеуровневые
    pub fn seam_list(&self) -> &[SeamDef] {
        if self.preview_3d.seams.is_empty() {
            &self.seams
        } else {
            &self.preview_3d.seams
        }
    }

    pub fn panel(&self, key: &str) -> Option<&PanelDef> {
        self.panels.iter().find(|panel| panel.key.as_str() == key)
    }

    /// Проверить определение. Ничего не отвергается: резолвер работает и
    /// с проблемными определениями, но проблемы стоит показать автору.
    pub fn validate(&self) -> Vec<DefinitionIssue> {
        let mut issues = Vec::new();

        let mut seen = HashSet::new();
        for panel in &self.panels {
            if !seen.insert(panel.key.as_str()) {
                issues.push(DefinitionIssue::DuplicatePanel(panel.key.clone()));
            }
        }

        if let Some(root) = &self.preview_3d.root {
            if !seen.contains(root.as_str()) {
                issues.push(DefinitionIssue::UndeclaredRoot(root.clone()));
            }
        }

        let mut parents_of: HashMap<&str, usize> = HashMap::new();
        for (index, seam) in self.seam_list().iter().enumerate() {
            for key in [&seam.parent, &seam.child] {
                if !seen.contains(key.as_str()) {
                    issues.push(DefinitionIssue::UnknownSeamPanel {
                        seam: index,
                        panel: key.clone(),
                    });
                }
            }
            *parents_of.entry(seam.child.as_str()).or_default() += 1;
        }

        for panel in &self.panels {
            if parents_of.get(panel.key.as_str()).copied().unwrap_or(0) > 1 {
                issues.push(DefinitionIssue::AmbiguousChild(panel.key.clone()));
            }
        }

        for key in self.preview_3d.panels.keys() {
            if !seen.contains(key.as_str()) {
                issues.push(DefinitionIssue::UnknownRolePanel(key.clone()));
            }
        }

        for role in [Role::Front, Role::Back] {
            let holders: Vec<PanelKey> = self
                .preview_3d
                .panels
                .iter()
                .filter(|(_, assignment)| assignment.role == role)
                .map(|(key, _)| key.clone())
                .collect();
            if holders.len() > 1 {
                issues.push(DefinitionIssue::DuplicateRole {
                    role,
                    panels: holders,
                });
            }
        }

        if let Some(key) = self.find_cycle() {
            issues.push(DefinitionIssue::Cycle(key));
        }

        issues
    }

    /// Поиск цикла в графе швов (DFS с тремя цветами)
    fn find_cycle(&self) -> Option<PanelKey> {
        let mut children: HashMap<&PanelKey, Vec<&PanelKey>> = HashMap::new();
        for seam in self.seam_list() {
            children.entry(&seam.parent).or_default().push(&seam.child);
        }

        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Open,
            Done,
        }

        let mut marks: HashMap<&PanelKey, Mark> = HashMap::new();
        for &start in children.keys() {
            if marks.contains_key(start) {
                continue;
            }
            let mut stack: Vec<(&PanelKey, usize)> = vec![(start, 0)];
            marks.insert(start, Mark::Open);
            while let Some((node, next)) = stack.pop() {
                let kids = children.get(node).map(Vec::as_slice).unwrap_or(&[]);
                if next < kids.len() {
                    stack.push((node, next + 1));
                    let kid = kids[next];
                    match marks.get(kid) {
                        Some(Mark::Open) => return Some(kid.clone()),
                        Some(Mark::Done) => {}
                        None => {
                            marks.insert(kid, Mark::Open);
                            stack.push((kid, 0));
                        }
                    }
                } else {
                    marks.insert(node, Mark::Done);
                }
            }
        }
        None
    }
}

/// Замечание валидатора к определению сборки
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "issue", content = "detail", rename_all = "snake_case")]
pub enum DefinitionIssue {
    DuplicatePanel(PanelKey),
    UndeclaredRoot(PanelKey),
    UnknownSeamPanel { seam: usize, panel: PanelKey },
    /// Панель является ребёнком нескольких швов; побеждает первый по обходу
    AmbiguousChild(PanelKey),
    UnknownRolePanel(PanelKey),
    /// Роль front или back назначена нескольким панелям; якорем глубины
    /// служит первая по ключу
    DuplicateRole { role: Role, panels: Vec<PanelKey> },
    Cycle(PanelKey),
}

impl fmt::Display for DefinitionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionIssue::DuplicatePanel(key) => write!(f, "panel '{key}' is declared twice"),
            DefinitionIssue::UndeclaredRoot(key) => {
                write!(f, "root panel '{key}' is not declared")
            }
            DefinitionIssue::UnknownSeamPanel { seam, panel } => {
                write!(f, "seam #{seam} references unknown panel '{panel}'")
            }
            DefinitionIssue::AmbiguousChild(key) => {
                write!(f, "panel '{key}' is the child of more than one seam")
            }
            DefinitionIssue::UnknownRolePanel(key) => {
                write!(f, "role assigned to unknown panel '{key}'")
            }
            DefinitionIssue::DuplicateRole { role, panels } => {
                let names: Vec<&str> = panels.iter().map(PanelKey::as_str).collect();
                write!(
                    f,
                    "role '{role:?}' is assigned to several panels ({}), '{}' anchors depth",
                    names.join(", "),
                    names.first().copied().unwrap_or_default()
                )
            }
            DefinitionIssue::Cycle(key) => write!(f, "seam graph has a cycle through '{key}'"),
        }
    }
}
