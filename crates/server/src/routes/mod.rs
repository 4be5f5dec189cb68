use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared::{AssemblyDefinition, DesignSession, DesignSessionPatch, Geometry, GeometryEngine, SvgRenderer};

use crate::error::{ApiError, ApiResult};
use crate::storage::Store;
use crate::AppState;

/// Health check
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// ── Assemblies ──────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AssemblySummary {
    pub key: String,
    pub name: String,
    pub version: u32,
    pub panel_count: usize,
}

impl From<&AssemblyDefinition> for AssemblySummary {
    fn from(definition: &AssemblyDefinition) -> Self {
        Self {
            key: definition.key.clone(),
            name: definition.name.clone(),
            version: definition.version,
            panel_count: definition.panels.len(),
        }
    }
}

/// List assemblies, sorted by name
pub async fn list_assemblies(State(state): State<AppState>) -> Json<Vec<AssemblySummary>> {
    let list = state.store.assemblies().await;
    Json(list.iter().map(AssemblySummary::from).collect())
}

pub async fn get_assembly(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<AssemblyDefinition>> {
    state
        .store
        .assembly(&key)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("assembly '{key}'")))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PutAssemblyResponse {
    pub assembly: AssemblyDefinition,
    pub created: bool,
    pub warnings: Vec<String>,
}

/// Create or replace a definition. Validation issues are returned as
/// warnings and never reject the definition.
pub async fn put_assembly(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<PutAssemblyResponse>)> {
    let definition: AssemblyDefinition = serde_json::from_slice(&body)?;
    if definition.key != key {
        return Err(ApiError::Unprocessable(format!(
            "definition key '{}' does not match '{key}'",
            definition.key
        )));
    }
    if definition.name.trim().is_empty() {
        return Err(ApiError::Unprocessable("name must not be empty".into()));
    }

    let warnings: Vec<String> = definition
        .validate()
        .iter()
        .map(ToString::to_string)
        .collect();
    for warning in &warnings {
        tracing::warn!("assembly '{key}': {warning}");
    }

    let created = state.store.put_assembly(definition.clone()).await;
    tracing::info!("{} assembly '{key}'", if created { "Created" } else { "Replaced" });

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((
        status,
        Json(PutAssemblyResponse {
            assembly: definition,
            created,
            warnings,
        }),
    ))
}

// ── Design sessions ─────────────────────────────────────────────

fn parse_patch(body: &[u8]) -> ApiResult<DesignSessionPatch> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(DesignSessionPatch::default());
    }
    Ok(serde_json::from_slice(body)?)
}

/// Reject patches that would leave the session invalid
async fn check_patch(store: &Store, patch: &DesignSessionPatch) -> ApiResult<()> {
    if let Some(product_type) = &patch.product_type {
        if product_type.trim().is_empty() {
            return Err(ApiError::Unprocessable("product_type must not be empty".into()));
        }
    }
    if let Some(key) = &patch.assembly_key {
        if store.assembly(key).await.is_none() {
            return Err(ApiError::Unprocessable(format!("unknown assembly '{key}'")));
        }
    }
    Ok(())
}

/// Create a session with a fresh uuid. The body is an optional patch.
pub async fn create_session(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<DesignSession>)> {
    let patch = parse_patch(&body)?;
    check_patch(&state.store, &patch).await?;

    let mut session = DesignSession::new(uuid::Uuid::new_v4().to_string());
    session.apply(patch);
    state.store.put_session(session.clone()).await;
    tracing::info!("Created design session {}", session.uuid);

    Ok((StatusCode::CREATED, Json(session)))
}

async fn find_session(store: &Store, uuid: &str) -> ApiResult<DesignSession> {
    store
        .session(uuid)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("design session '{uuid}'")))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> ApiResult<Json<DesignSession>> {
    find_session(&state.store, &uuid).await.map(Json)
}

/// Partial update; `params_snapshot` entries merge by key
pub async fn patch_session(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    body: Bytes,
) -> ApiResult<Json<DesignSession>> {
    let patch = parse_patch(&body)?;
    check_patch(&state.store, &patch).await?;

    state
        .store
        .update_session(&uuid, |session| {
            session.apply(patch);
            session.clone()
        })
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("design session '{uuid}'")))
}

/// Evaluate the session's assembly with its parameter snapshot
async fn build_geometry(store: &Store, uuid: &str) -> ApiResult<Geometry> {
    let session = find_session(store, uuid).await?;
    let Some(key) = session.assembly_key.as_deref() else {
        return Err(ApiError::Unprocessable(
            "assembly not set for this session".into(),
        ));
    };
    let definition = store
        .assembly(key)
        .await
        .ok_or_else(|| ApiError::Unprocessable(format!("unknown assembly '{key}'")))?;

    Ok(GeometryEngine::new(&definition, &session.params_snapshot).build())
}

pub async fn session_geometry(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> ApiResult<Json<Geometry>> {
    build_geometry(&state.store, &uuid).await.map(Json)
}

#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    pub panel: Option<String>,
    pub scale: Option<String>,
}

/// SVG pattern sheet. With `panel`, only that panel is drawn, unlabeled.
pub async fn session_preview(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    Query(query): Query<PreviewQuery>,
) -> ApiResult<impl IntoResponse> {
    let geometry = build_geometry(&state.store, &uuid).await?;

    let scale = query
        .scale
        .as_deref()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .unwrap_or(0.0);
    let mut renderer = SvgRenderer::default().with_scale(scale);

    let svg = match query.panel.as_deref().filter(|p| !p.is_empty()) {
        Some(panel) => {
            renderer = renderer.without_labels();
            let panels: Vec<_> = geometry
                .panels
                .iter()
                .filter(|p| p.key.as_str() == panel)
                .cloned()
                .collect();
            renderer.render_panels(&panels)
        }
        None => renderer.render(&geometry),
    };

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ParamValue;

    fn state() -> AppState {
        AppState {
            store: Store::with_catalog(),
        }
    }

    fn body(value: Value) -> Bytes {
        Bytes::from(value.to_string())
    }

    async fn new_session(state: &AppState, value: Value) -> DesignSession {
        let (status, Json(session)) = create_session(State(state.clone()), body(value))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        session
    }

    // ========================================================================
    // Assemblies
    // ========================================================================

    #[tokio::test]
    async fn test_health() {
        let Json(value) = health().await;
        assert_eq!(value["status"], "ok");
    }

    #[tokio::test]
    async fn test_list_assemblies_sorted() {
        let Json(list) = list_assemblies(State(state())).await;
        assert!(!list.is_empty());
        assert!(list.windows(2).all(|w| w[0].name <= w[1].name));
        assert!(list.iter().any(|s| s.key == "zipper_pouch" && s.panel_count > 0));
    }

    #[tokio::test]
    async fn test_get_missing_assembly_is_404() {
        let err = get_assembly(State(state()), Path("nope".into()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_put_assembly_create_then_replace() {
        let state = state();
        let definition = AssemblyDefinition::empty("flat_patch", "Flat patch");
        let json = Bytes::from(definition.to_json().unwrap());

        let (status, Json(response)) =
            put_assembly(State(state.clone()), Path("flat_patch".into()), json.clone())
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(response.created);

        let (status, _) = put_assembly(State(state.clone()), Path("flat_patch".into()), json)
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);

        let Json(stored) = get_assembly(State(state), Path("flat_patch".into()))
            .await
            .unwrap();
        assert_eq!(stored, definition);
    }

    #[tokio::test]
    async fn test_put_assembly_rejects_key_mismatch_and_empty_name() {
        let state = state();
        let json = Bytes::from(AssemblyDefinition::empty("a", "A").to_json().unwrap());
        let err = put_assembly(State(state.clone()), Path("b".into()), json)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = Bytes::from(AssemblyDefinition::empty("a", "  ").to_json().unwrap());
        let err = put_assembly(State(state.clone()), Path("a".into()), json)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let err = put_assembly(State(state), Path("a".into()), Bytes::from_static(b"{"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_put_assembly_returns_warnings() {
        let value = json!({
            "key": "odd",
            "name": "Odd",
            "panels": [{ "key": "front" }],
            "seams": [{
                "parent": "front", "parent_edge": "right",
                "child": "ghost", "child_edge": "left", "angle": 90
            }]
        });
        let (_, Json(response)) = put_assembly(State(state()), Path("odd".into()), body(value))
            .await
            .unwrap();
        assert!(response.warnings.iter().any(|w| w.contains("ghost")));
    }

    // ========================================================================
    // Design sessions
    // ========================================================================

    #[tokio::test]
    async fn test_create_session_with_empty_body() {
        let state = state();
        let (status, Json(session)) = create_session(State(state.clone()), Bytes::new())
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(uuid::Uuid::parse_str(&session.uuid).is_ok());
        assert_eq!(session.product_type, "zipper_pouch");
        assert_eq!(session.params_snapshot["units"], ParamValue::from("in"));

        let Json(shown) = get_session(State(state), Path(session.uuid.clone()))
            .await
            .unwrap();
        assert_eq!(shown, session);
    }

    #[tokio::test]
    async fn test_create_session_rejects_unknown_assembly() {
        let err = create_session(State(state()), body(json!({ "assembly_key": "nope" })))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_patch_session_merges_params() {
        let state = state();
        let session = new_session(&state, json!({ "name": "Pouch" })).await;

        let Json(updated) = patch_session(
            State(state.clone()),
            Path(session.uuid.clone()),
            body(json!({ "notes": "canvas", "params_snapshot": { "width": 11 } })),
        )
        .await
        .unwrap();

        assert_eq!(updated.name.as_deref(), Some("Pouch"));
        assert_eq!(updated.notes.as_deref(), Some("canvas"));
        assert_eq!(updated.params_snapshot["width"].as_f64(), Some(11.0));
        assert!(updated.params_snapshot.contains_key("units"));
    }

    #[tokio::test]
    async fn test_patch_session_validation() {
        let state = state();
        let session = new_session(&state, json!({})).await;

        let err = patch_session(
            State(state.clone()),
            Path(session.uuid.clone()),
            body(json!({ "product_type": "" })),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let err = patch_session(State(state), Path("missing".into()), body(json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_geometry_requires_assembly() {
        let state = state();
        let session = new_session(&state, json!({})).await;
        let err = session_geometry(State(state), Path(session.uuid))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_geometry_merges_snapshot_over_defaults() {
        let state = state();
        let session = new_session(&state, json!({ "assembly_key": "zipper_pouch" })).await;

        let Json(defaults) = session_geometry(State(state.clone()), Path(session.uuid.clone()))
            .await
            .unwrap();
        assert_eq!(defaults.assembly_key, "zipper_pouch");
        assert!(!defaults.panels.is_empty());

        assert_eq!(defaults.params["width"].as_f64(), Some(9.0));

        patch_session(
            State(state.clone()),
            Path(session.uuid.clone()),
            body(json!({ "params_snapshot": { "width": 12.5 } })),
        )
        .await
        .unwrap();

        let Json(updated) = session_geometry(State(state), Path(session.uuid))
            .await
            .unwrap();
        assert_eq!(updated.params["width"].as_f64(), Some(12.5));
        assert_eq!(updated.params["height"].as_f64(), Some(6.0));
    }

    async fn preview_text(state: &AppState, uuid: &str, query: PreviewQuery) -> String {
        let response = session_preview(State(state.clone()), Path(uuid.to_string()), Query(query))
            .await
            .unwrap()
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_preview_svg_filters_panel() {
        let state = state();
        let session = new_session(&state, json!({ "assembly_key": "zipper_pouch" })).await;
        let geometry = build_geometry(&state.store, &session.uuid).await.unwrap();

        let full = preview_text(&state, &session.uuid, PreviewQuery::default()).await;
        assert_eq!(full, SvgRenderer::default().render(&geometry));
        assert!(full.contains("<text"));

        let single = preview_text(
            &state,
            &session.uuid,
            PreviewQuery {
                panel: Some("front".into()),
                scale: Some("10".into()),
            },
        )
        .await;
        let front = geometry.panel("front").unwrap().clone();
        assert_eq!(
            single,
            SvgRenderer::default()
                .with_scale(10.0)
                .without_labels()
                .render_panels(&[front])
        );
        assert!(!single.contains("<text"));
    }

    #[tokio::test]
    async fn test_preview_ignores_bad_scale() {
        let state = state();
        let session = new_session(&state, json!({ "assembly_key": "tote_bag" })).await;
        let geometry = build_geometry(&state.store, &session.uuid).await.unwrap();

        let svg = preview_text(
            &state,
            &session.uuid,
            PreviewQuery {
                panel: None,
                scale: Some("-3".into()),
            },
        )
        .await;
        assert_eq!(svg, SvgRenderer::default().render(&geometry));
    }
}
