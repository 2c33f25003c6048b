use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use serde::Deserialize;

// Exports:
// - engine_name() -> const char*
// - engine_ingest_json(graph_json) -> char* (owned by this library)
// - engine_free(ptr)

#[derive(Deserialize)]
struct GraphHeader {
    module: String,
    nodes: Vec<serde_json::Value>,
}

#[no_mangle]
pub extern "C" fn engine_name() -> *const c_char {
    static NAME: &[u8] = b"inproc_engine\0";
    NAME.as_ptr() as *const c_char
}

fn ingest(text: &str) -> serde_json::Value {
    match serde_json::from_str::<GraphHeader>(text) {
        Ok(graph) if graph.nodes.is_empty() => serde_json::json!({
            "ok": false,
            "error": format!("module '{}' has no nodes", graph.module),
        }),
        Ok(graph) => serde_json::json!({ "ok": true, "nodes": graph.nodes.len() }),
        Err(e) => serde_json::json!({ "ok": false, "error": format!("graph json: {}", e) }),
    }
}

#[no_mangle]
pub extern "C" fn engine_ingest_json(graph_json: *const c_char) -> *mut c_char {
    let reply = if graph_json.is_null() {
        serde_json::json!({ "ok": false, "error": "null graph" })
    } else {
        let text = unsafe { CStr::from_ptr(graph_json) }.to_string_lossy();
        ingest(&text)
    };
    match CString::new(reply.to_string()) {
        Ok(c) => c.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "C" fn engine_free(ptr: *mut c_char) {
    if ptr.is_null() {
        return;
    }
    unsafe {
        let _ = CString::from_raw(ptr);
    }
}

#[cfg(test)]
mod tests {
    use super::ingest;

    #[test]
    fn counts_nodes() {
        let reply = ingest(r#"{"module":"m","nodes":[{},{}]}"#);
        assert_eq!(reply["ok"], true);
        assert_eq!(reply["nodes"], 2);
    }

    #[test]
    fn rejects_empty_graph() {
        let reply = ingest(r#"{"module":"m","nodes":[]}"#);
        assert_eq!(reply["ok"], false);
    }
}
