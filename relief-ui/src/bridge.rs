use js_sys::{Object, Reflect};
use relief_core::{Incident, IncidentPatch, NewIncident, Status};
use report_schema::ReportDocument;
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

/// Reads `<meta name="relief-api" content="...">`; empty means same origin.
fn api_base() -> String {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.query_selector(r#"meta[name="relief-api"]"#).ok().flatten())
        .and_then(|meta| meta.get_attribute("content"))
        .map(|base| base.trim_end_matches('/').to_string())
        .unwrap_or_default()
}

pub fn live_url() -> String {
    format!("{}/api/reports/live", api_base())
}

fn set(target: &Object, key: &str, value: &JsValue) -> Result<(), String> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|e| format!("failed to build request: {e:?}"))
}

async fn text(resp: &Response) -> Result<String, String> {
    let promise = resp.text().map_err(|e| format!("unreadable response: {e:?}"))?;
    let val = JsFuture::from(promise)
        .await
        .map_err(|e| format!("unreadable response: {e:?}"))?;
    Ok(val.as_string().unwrap_or_default())
}

async fn call<A>(method: &str, path: &str, body: Option<&A>) -> Result<String, String>
where
    A: Serialize,
{
    let window = web_sys::window().ok_or_else(|| "window not available".to_string())?;
    let init = Object::new();
    set(&init, "method", &JsValue::from_str(method))?;
    if let Some(body) = body {
        let json = serde_json::to_string(body).map_err(|e| e.to_string())?;
        let headers = Object::new();
        set(&headers, "Content-Type", &JsValue::from_str("application/json"))?;
        set(&init, "headers", &headers)?;
        set(&init, "body", &JsValue::from_str(&json))?;
    }

    let url = format!("{}{}", api_base(), path);
    let val = JsFuture::from(window.fetch_with_str_and_init(&url, init.unchecked_ref()))
        .await
        .map_err(|e| format!("request failed: {e:?}"))?;
    let resp: Response = val
        .dyn_into()
        .map_err(|_| "fetch did not return a response".to_string())?;
    let body = text(&resp).await?;
    if resp.ok() {
        return Ok(body);
    }
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| format!("request failed with status {}", resp.status()));
    Err(message)
}

fn decode<R: DeserializeOwned>(body: &str) -> Result<R, String> {
    serde_json::from_str(body).map_err(|e| e.to_string())
}

pub async fn fetch_reports() -> Result<Vec<Incident>, String> {
    let body = call::<()>("GET", "/api/reports", None).await?;
    let docs: Vec<ReportDocument> = decode(&body)?;
    Ok(relief_core::incident::incidents_from_documents(docs))
}

pub async fn submit_report(report: &NewIncident) -> Result<Incident, String> {
    let body = call("POST", "/api/reports", Some(&report.to_submission())).await?;
    let doc: ReportDocument = decode(&body)?;
    Ok(Incident::from_document(doc))
}

pub async fn update_report(id: &str, patch: &IncidentPatch) -> Result<(), String> {
    call("PATCH", &format!("/api/reports/{id}"), Some(&patch.to_wire()))
        .await
        .map(|_| ())
}

pub async fn set_status(id: &str, status: Status) -> Result<(), String> {
    update_report(id, &IncidentPatch::status(status)).await
}

pub async fn delete_report(id: &str) -> Result<(), String> {
    call::<()>("DELETE", &format!("/api/reports/{id}"), None)
        .await
        .map(|_| ())
}
