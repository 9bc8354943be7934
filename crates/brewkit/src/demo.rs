//! Sample data for `--demo`, served from an in-memory gateway.

use brewkit_api::{Fields, MemoryGateway};
use brewkit_core::BEVERAGES;
use serde_json::{Value, json};

const BASES: &[(&str, &str, &str)] = &[
    ("black-tea", "Black Tea", "#8b4513"),
    ("green-tea", "Green Tea", "#c8e6c9"),
    ("coffee", "Coffee", "#6f4e37"),
];

const CREAMERS: &[(&str, &str, &str)] = &[
    ("none", "No Cream", "transparent"),
    ("milk", "Milk", "#faf0e6"),
    ("cream", "Cream", "#f5f5dc"),
    ("half-and-half", "Half & Half", "#fffacd"),
];

const SYRUPS: &[(&str, &str, &str)] = &[
    ("none", "No Syrup", "#c6c6c6"),
    ("vanilla", "Vanilla", "#f3e5ab"),
    ("caramel", "Caramel", "#da8c5c"),
    ("hazelnut", "Hazelnut", "#6b4423"),
];

fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => Fields::new(),
    }
}

fn option(id: &str, name: &str, color: &str) -> Value {
    json!({ "id": id, "name": name, "color": color })
}

/// An in-memory gateway seeded with options and two saved beverages.
pub fn gateway() -> MemoryGateway {
    let gw = MemoryGateway::new();

    for (collection, items) in [("bases", BASES), ("creamers", CREAMERS), ("syrups", SYRUPS)] {
        for (id, name, color) in items {
            gw.seed(collection, id, fields(json!({ "name": name, "color": color })));
        }
    }

    gw.seed(
        BEVERAGES,
        "demo-london-fog",
        fields(json!({
            "name": "London Fog",
            "base": option("black-tea", "Black Tea", "#8b4513"),
            "creamer": option("milk", "Milk", "#faf0e6"),
            "syrup": option("vanilla", "Vanilla", "#f3e5ab"),
            "temperature": { "id": 2, "name": "Hot", "value": "hot" },
            "createdAt": 1_700_000_000_000_i64,
        })),
    );
    gw.seed(
        BEVERAGES,
        "demo-iced-caramel",
        fields(json!({
            "name": "Iced Caramel Latte",
            "base": option("coffee", "Coffee", "#6f4e37"),
            "creamer": option("cream", "Cream", "#f5f5dc"),
            "syrup": option("caramel", "Caramel", "#da8c5c"),
            "temperature": { "id": 3, "name": "Iced", "value": "iced" },
            "createdAt": 1_700_000_600_000_i64,
        })),
    );

    gw
}
