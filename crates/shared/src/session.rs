use crate::ParamValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

fn default_product_type() -> String {
    "zipper_pouch".to_string()
}

fn default_params() -> BTreeMap<String, ParamValue> {
    BTreeMap::from([("units".to_string(), ParamValue::from("in"))])
}

/// Текущее время в секундах Unix
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Сессия проектирования: выбранная сборка и снимок параметров пользователя
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignSession {
    pub uuid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_product_type")]
    pub product_type: String,
    #[serde(default)]
    pub assembly_key: Option<String>,
    #[serde(default = "default_params")]
    pub params_snapshot: BTreeMap<String, ParamValue>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: u64,
    #[serde(default)]
    pub updated_at: u64,
}

impl DesignSession {
    pub fn new(uuid: impl Into<String>) -> Self {
        let now = unix_now();
        Self {
            uuid: uuid.into(),
            name: None,
            product_type: default_product_type(),
            assembly_key: None,
            params_snapshot: default_params(),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Применить частичное обновление. `params_snapshot` сливается по ключам;
    /// `null` удаляет ключ из снимка.
    pub fn apply(&mut self, patch: DesignSessionPatch) {
        if let Some(name) = patch.name {
            self.name = Some(name);
        }
        if let Some(product_type) = patch.product_type {
            self.product_type = product_type;
        }
        if let Some(assembly_key) = patch.assembly_key {
            self.assembly_key = Some(assembly_key);
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }
        if let Some(params) = patch.params_snapshot {
            for (key, value) in params {
                if value.is_null() {
                    self.params_snapshot.remove(&key);
                } else {
                    self.params_snapshot.insert(key, value);
                }
            }
        }
        self.updated_at = unix_now().max(self.created_at);
    }
}

/// Частичное обновление сессии (PATCH)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignSessionPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub assembly_key: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub params_snapshot: Option<BTreeMap<String, ParamValue>>,
}
