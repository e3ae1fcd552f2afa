use std::fs;

use schemaform::{FormEvent, SchemaForm};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
enum Priority {
    Low,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
struct Line {
    sku: String,
    qty: u32,
}

/// A customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
struct Order {
    customer: String,
    express: bool,
    priority: Priority,
    notes: Option<String>,
    lines: Vec<Line>,
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn sample() -> Order {
    Order {
        customer: "ACME".into(),
        express: false,
        priority: Priority::Low,
        notes: Some("leave at door".into()),
        lines: vec![
            Line {
                sku: "A-1".into(),
                qty: 2,
            },
            Line {
                sku: "B-2".into(),
                qty: 1,
            },
        ],
    }
}

#[test]
fn derived_schema_round_trip() {
    init_logger();
    let mut form = SchemaForm::for_type::<Order>().unwrap();
    form.set_data(serde_json::to_value(sample()).unwrap());
    form.flush();

    let back: Order = form.get_typed().unwrap();
    assert_eq!(back, sample());
}

#[test]
fn derived_schema_edits() {
    init_logger();
    let mut form = SchemaForm::for_type::<Order>().unwrap();
    form.set_data(serde_json::to_value(sample()).unwrap());
    form.flush();

    let express = form.control("express").unwrap();
    form.set_checked(express, true).unwrap();
    form.input_path("priority", "High").unwrap();
    form.input_path("lines[1].qty", "5").unwrap();

    let first = form.items("lines")[0];
    let remove = form.remove_button(first).unwrap();
    form.click(remove).unwrap();
    let add = form.add_button("lines").unwrap();
    form.click(add).unwrap();

    let order: Order = form.get_typed().unwrap();
    assert!(order.express);
    assert_eq!(order.priority, Priority::High);
    assert_eq!(
        order.lines,
        vec![
            Line {
                sku: "B-2".into(),
                qty: 5,
            },
            Line {
                sku: String::new(),
                qty: 0,
            },
        ]
    );

    form.input_path("lines[1].sku", "C-3").unwrap();
    let submitted = form.submit().unwrap();
    assert_eq!(submitted["lines"][0]["qty"], json!(5));
}

#[test]
fn loads_from_files() {
    init_logger();
    let dir = std::env::temp_dir().join(format!("schemaform-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let data = dir.join("order.toml");
    fs::write(
        &data,
        "customer = \"ACME\"\nexpress = true\n\n[[lines]]\nsku = \"A-1\"\nqty = 3\n",
    )
    .unwrap();
    fs::write(
        dir.join("order-schema.json"),
        json!({
            "type": "object",
            "properties": {
                "customer": {"type": "string"},
                "express": {"type": "boolean"},
                "lines": {"type": "array", "items": {
                    "type": "object",
                    "properties": {"sku": {"type": "string"}, "qty": {"type": "integer"}}
                }}
            }
        })
        .to_string(),
    )
    .unwrap();

    let mut form = SchemaForm::from_files(&data, None::<&str>).unwrap();
    let events = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = events.clone();
    form.on(move |e| sink.lock().unwrap().push(e.name()));
    form.input_path("customer", "Initech").unwrap();

    assert_eq!(
        form.get_data().unwrap(),
        json!({"customer": "Initech", "express": true, "lines": [{"sku": "A-1", "qty": 3}]})
    );
    assert_eq!(events.lock().unwrap().as_slice(), &["form-change"]);
    assert!(form.submit().is_ok());

    let missing = SchemaForm::from_files(dir.join("other.json"), None::<&str>);
    assert!(missing.is_err());
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn submitted_event_carries_data() {
    init_logger();
    let mut form = SchemaForm::for_type::<Line>().unwrap();
    form.set_data(json!({"sku": "Z", "qty": 9}));
    form.flush();
    let seen = std::sync::Arc::new(std::sync::Mutex::new(None));
    let sink = seen.clone();
    form.on(move |e| {
        if let FormEvent::Submitted(data) = e {
            *sink.lock().unwrap() = Some(data.clone());
        }
    });
    form.submit().unwrap();
    assert_eq!(*seen.lock().unwrap(), Some(json!({"sku": "Z", "qty": 9})));
}
