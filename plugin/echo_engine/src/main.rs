use std::io::{self, Read};

use serde_json::json;
use sil2cast_core::CAstGraph;

fn reply_error(message: String) -> ! {
    println!("{}", json!({ "ok": false, "error": message }));
    std::process::exit(1);
}

fn main() {
    let cmd = std::env::args().nth(1).unwrap_or_default();
    if cmd != "ingest" {
        eprintln!("unsupported command '{}'", cmd);
        std::process::exit(2);
    }

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        reply_error(format!("read stdin: {}", e));
    }

    let graph: CAstGraph = match serde_json::from_str(&buf) {
        Ok(graph) => graph,
        Err(e) => reply_error(format!("graph json: {}", e)),
    };
    if let Err(e) = graph.validate() {
        reply_error(e.to_string());
    }

    // Logs go to stderr; stdout carries only the reply.
    eprintln!("echo: module '{}' with {} node(s)", graph.module, graph.nodes.len());
    println!("{}", json!({ "ok": true, "nodes": graph.nodes.len() }));
}
