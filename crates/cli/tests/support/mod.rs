#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;

/// Lines `unit_json(file)` produces, in order.
pub fn expected_lines(file: &str) -> Vec<String> {
    vec![format!("{file}:1:write"), format!("{file}:2"), format!("{file}:3:read")]
}

/// `g = x; memcpy(&g, src, 4); _1 = g; return;` with `g` global and `x` a
/// parameter.
pub fn unit_json(file: &str) -> serde_json::Value {
    json!({
        "source_file": file,
        "globals": [
            { "id": 1, "name": "g", "ty": { "name": "int", "size": 4 }, "storage": "global" }
        ],
        "functions": [{
            "name": "f",
            "decls": [
                {
                    "id": 10,
                    "name": "x",
                    "ty": { "name": "int", "size": 4 },
                    "storage": "parameter"
                }
            ],
            "blocks": [{
                "index": 2,
                "statements": [
                    {
                        "location": { "file": file, "line": 1 },
                        "op": "assign",
                        "lhs": { "expr": "var", "decl": 1 },
                        "rhs": { "rvalue": "use", "operand": { "expr": "var", "decl": 10 } }
                    },
                    {
                        "location": { "file": file, "line": 2 },
                        "op": "call",
                        "callee": { "direct": "memcpy" },
                        "args": [
                            { "expr": "address_of", "target": { "expr": "var", "decl": 1 } },
                            { "expr": "ssa", "name": "src_1" },
                            { "expr": "constant", "value": 4 }
                        ]
                    },
                    {
                        "location": { "file": file, "line": 3 },
                        "op": "assign",
                        "lhs": { "expr": "ssa", "name": "_1", "ty": { "name": "int", "size": 4 } },
                        "rhs": { "rvalue": "use", "operand": { "expr": "var", "decl": 1 } }
                    },
                    { "op": "return" }
                ]
            }]
        }]
    })
}

/// Write the sample unit for `file` under `dir` and return its path.
pub fn write_unit(dir: &Path, name: &str, file: &str) -> PathBuf {
    let path = dir.join(name);
    let body = serde_json::to_string_pretty(&unit_json(file)).expect("serialize unit");
    fs::write(&path, body).expect("write unit");
    path
}

pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("read output list")
        .lines()
        .map(str::to_string)
        .collect()
}
