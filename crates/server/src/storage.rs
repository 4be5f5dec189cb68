//! In-memory store of assembly definitions and design sessions.

use std::collections::HashMap;
use std::sync::Arc;

use shared::{catalog, AssemblyDefinition, DesignSession};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
    assemblies: HashMap<String, AssemblyDefinition>,
    sessions: HashMap<String, DesignSession>,
}

/// Shared handle; clones see the same data
#[derive(Debug, Clone, Default)]
pub struct Store {
    inner: Arc<RwLock<Inner>>,
}

impl Store {
    /// Store seeded with the built-in catalog
    pub fn with_catalog() -> Self {
        let assemblies = catalog::default_assemblies()
            .into_iter()
            .map(|definition| (definition.key.clone(), definition))
            .collect();
        Self {
            inner: Arc::new(RwLock::new(Inner {
                assemblies,
                sessions: HashMap::new(),
            })),
        }
    }

    /// All definitions, sorted by name then key
    pub async fn assemblies(&self) -> Vec<AssemblyDefinition> {
        let inner = self.inner.read().await;
        let mut list: Vec<_> = inner.assemblies.values().cloned().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.key.cmp(&b.key)));
        list
    }

    pub async fn assembly(&self, key: &str) -> Option<AssemblyDefinition> {
        self.inner.read().await.assemblies.get(key).cloned()
    }

    /// Insert or replace. Returns whether the key was new.
    pub async fn put_assembly(&self, definition: AssemblyDefinition) -> bool {
        let mut inner = self.inner.write().await;
        inner
            .assemblies
            .insert(definition.key.clone(), definition)
            .is_none()
    }

    pub async fn session(&self, uuid: &str) -> Option<DesignSession> {
        self.inner.read().await.sessions.get(uuid).cloned()
    }

    pub async fn put_session(&self, session: DesignSession) {
        let mut inner = self.inner.write().await;
        inner.sessions.insert(session.uuid.clone(), session);
    }

    /// Modify a session in place under the write lock
    pub async fn update_session<T>(
        &self,
        uuid: &str,
        f: impl FnOnce(&mut DesignSession) -> T,
    ) -> Option<T> {
        let mut inner = self.inner.write().await;
        inner.sessions.get_mut(uuid).map(f)
    }
}
