//! REST API endpoint handlers for the monitor server.
//!
//! Ingestion and polling both go through the in-memory
//! [`SnapshotStore`](crate::state::SnapshotStore) via the shared
//! [`AppState`]; only the history endpoint touches the table store.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Dashboard page polling the status endpoint |
//! | `POST` | `/api/upload` | Ingest a complete factory snapshot |
//! | `GET` | `/api/status` | Latest snapshot plus freshness timestamp |
//! | `GET` | `/api/history` | Archived readings for one metric |
//!
//! The status endpoint echoes the producer's field-per-metric shape with
//! the derived `status` per process, so existing dashboard clients keep
//! working regardless of which ingestion mode is active.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use axum::Json;
use chrono::Utc;
use linewatch_db::SensorDataStore;
use linewatch_types::{FactorySnapshot, Process, UploadPayload};

use crate::error::ApiError;
use crate::state::{AppState, WAITING_FOR_SIGNAL};

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /api/history` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct HistoryQuery {
    /// Lowercase process name (e.g. `pultrusion`).
    pub process: String,
    /// Metric name (e.g. `die_temp`).
    pub metric: String,
    /// Look-back window in minutes (default 60, max 1440).
    pub minutes: Option<i64>,
}

// ---------------------------------------------------------------------------
// POST /api/upload -- push ingestion
// ---------------------------------------------------------------------------

/// Accept a complete factory snapshot from a push producer.
///
/// Missing process keys are rejected by deserialization before this
/// handler runs. Non-finite values are rejected here with a 400; the
/// snapshot store is only touched once the payload is fully validated.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UploadPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()?;

    let snapshot = payload.into_snapshot(&state.limits);
    state.store.replace(snapshot).await;

    tracing::debug!("Snapshot accepted via push ingestion");
    Ok(Json(serde_json::json!({ "msg": "OK" })))
}

// ---------------------------------------------------------------------------
// GET /api/status -- poll endpoint
// ---------------------------------------------------------------------------

/// Return the latest snapshot plus its freshness timestamp.
///
/// Pure read passthrough: never triggers ingestion or archiving, O(1)
/// regardless of how many clients poll. Before the first snapshot the
/// response is `{"data": null, "last_updated": "Waiting for Signal..."}`.
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let body = state.store.read().await.map_or_else(
        || {
            serde_json::json!({
                "data": null,
                "last_updated": WAITING_FOR_SIGNAL,
            })
        },
        |stored| {
            serde_json::json!({
                "data": wire_snapshot(&stored.snapshot),
                "last_updated": stored.last_updated.format("%H:%M:%S").to_string(),
            })
        },
    );

    Ok(Json(body))
}

/// Project a snapshot into the producer's field-per-metric wire shape,
/// with the derived status attached per process.
fn wire_snapshot(snapshot: &FactorySnapshot) -> serde_json::Value {
    let mut data = serde_json::Map::new();

    for (process, block) in &snapshot.processes {
        let mut fields = serde_json::Map::new();
        for reading in &block.readings {
            fields.insert(reading.name.clone(), serde_json::json!(reading.value));
        }
        fields.insert("status".to_owned(), serde_json::json!(block.status));
        data.insert(
            process.as_str().to_owned(),
            serde_json::Value::Object(fields),
        );
    }

    if let Some(image) = &snapshot.image_base64 {
        data.insert("image_base64".to_owned(), serde_json::json!(image));
    }
    if let Some(captured_at) = snapshot.captured_at {
        data.insert("captured_at".to_owned(), serde_json::json!(captured_at));
    }

    serde_json::Value::Object(data)
}

// ---------------------------------------------------------------------------
// GET /api/history -- archived readings
// ---------------------------------------------------------------------------

/// Query one metric's archived history from the table store.
///
/// # Query Parameters
///
/// - `process`: lowercase process name (required)
/// - `metric`: metric name (required)
/// - `minutes`: look-back window in minutes (default 60, max 1440)
///
/// Returns 503 when no table store was initialized at startup.
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let process = Process::from_name(&params.process)
        .ok_or_else(|| ApiError::InvalidQuery(format!("unknown process: {}", params.process)))?;

    let pool = state.archive.as_ref().ok_or(ApiError::ArchiveUnavailable)?;

    let minutes = params.minutes.unwrap_or(60).clamp(1, 1440);
    let since = Utc::now() - chrono::Duration::minutes(minutes);

    let rows = SensorDataStore::new(pool.pool())
        .query_since(process.as_str(), &params.metric, since)
        .await?;

    let rows: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| {
            serde_json::json!({
                "process_name": row.process_name,
                "metric_name": row.metric_name,
                "value": row.value,
                "recorded_at": row.recorded_at,
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "count": rows.len(),
        "rows": rows,
    })))
}

// ---------------------------------------------------------------------------
// GET / -- dashboard page
// ---------------------------------------------------------------------------

/// Serve the monitor dashboard page.
///
/// Static HTML with a small script polling `GET /api/status` once per
/// second; all state lives server-side.
pub async fn index() -> impl IntoResponse {
    Html(DASHBOARD_HTML)
}

/// The dashboard markup. Card per process, camera pane, sync clock.
const DASHBOARD_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Linewatch</title>
    <style>
        body { background: #0f172a; color: #e2e8f0; font-family: sans-serif; padding: 1.5rem; }
        header { max-width: 1100px; margin: 0 auto 2rem; display: flex; justify-content: space-between;
                 align-items: flex-end; border-bottom: 1px solid #334155; padding-bottom: 1rem; }
        h1 { color: #58a6ff; margin: 0; }
        .subtitle { color: #8b949e; font-size: 0.85rem; margin-top: 0.25rem; }
        .sync { color: #8b949e; font-size: 0.8rem; font-family: monospace; }
        .sync span { color: #f8fafc; }
        main { max-width: 1100px; margin: 0 auto; display: grid;
               grid-template-columns: repeat(auto-fit, minmax(240px, 1fr)); gap: 1.25rem; }
        .camera { grid-column: 1 / -1; background: #000; border: 1px solid #334155; border-radius: 12px;
                  aspect-ratio: 16 / 9; display: flex; align-items: center; justify-content: center;
                  overflow: hidden; }
        .camera img { width: 100%; height: 100%; object-fit: contain; }
        .camera .nosignal { color: #475569; font-family: monospace; font-size: 0.85rem; }
        .card { background: #1e293b; border: 1px solid #334155; border-left: 5px solid #10b981;
                border-radius: 12px; padding: 1.25rem; }
        .card.warn { border-left-color: #ef4444; }
        .card h2 { color: #58a6ff; font-size: 1.1rem; margin: 0 0 0.75rem;
                   border-bottom: 1px solid #334155; padding-bottom: 0.5rem; }
        .card h2 .badge { float: right; font-size: 0.7rem; background: #0f172a;
                          padding: 0.15rem 0.5rem; border-radius: 4px; color: #8b949e; }
        .label { color: #94a3b8; font-size: 0.8rem; }
        .value { font-family: monospace; font-size: 1.4rem; font-weight: bold; color: #f8fafc; }
        .unit { font-size: 0.8rem; color: #64748b; margin-left: 0.25rem; }
    </style>
</head>
<body>
    <header>
        <div>
            <h1>Linewatch</h1>
            <p class="subtitle">Factory process monitor</p>
        </div>
        <div class="sync">Sync: <span id="sync-time">--:--:--</span></div>
    </header>

    <main>
        <div class="camera">
            <img id="cam-feed" src="" alt="" hidden>
            <div id="no-signal" class="nosignal">[ WAITING FOR CAMERA STREAM ]</div>
        </div>
        <div id="cards"></div>
    </main>

    <script>
        const METRICS = {
            pultrusion: ["die_temp", "resin_temp", "motor_temp"],
            encapsulation: ["core_temp", "motor_temp", "psu_temp", "machine_temp"],
            conforming: ["strands_temp", "motor_temp", "psu_temp", "unit_temp"],
            stranding: ["psu_temp", "motor_temp"],
        };

        function render(data) {
            const cards = document.getElementById("cards");
            cards.innerHTML = "";
            cards.style.display = "contents";
            for (const [process, metrics] of Object.entries(METRICS)) {
                const block = data ? data[process] : null;
                const warn = block && block.status === "Warning";
                const card = document.createElement("div");
                card.className = warn ? "card warn" : "card";
                let rows = "";
                for (const metric of metrics) {
                    const value = block && typeof block[metric] === "number"
                        ? block[metric].toFixed(1) : "--";
                    rows += `<div><div class="label">${metric}</div>` +
                        `<div class="value">${value}<span class="unit">&deg;C</span></div></div>`;
                }
                card.innerHTML = `<h2>${process}<span class="badge">` +
                    `${block ? block.status : "WAIT"}</span></h2>${rows}`;
                cards.appendChild(card);
            }
            const feed = document.getElementById("cam-feed");
            const noSignal = document.getElementById("no-signal");
            if (data && data.image_base64) {
                feed.src = "data:image/jpeg;base64," + data.image_base64;
                feed.hidden = false;
                noSignal.hidden = true;
            } else {
                feed.hidden = true;
                noSignal.hidden = false;
            }
        }

        async function poll() {
            try {
                const res = await fetch("/api/status");
                const body = await res.json();
                document.getElementById("sync-time").textContent = body.last_updated;
                render(body.data);
            } catch (_) { /* keep last rendered state */ }
        }

        render(null);
        poll();
        setInterval(poll, 1000);
    </script>
</body>
</html>"##;
