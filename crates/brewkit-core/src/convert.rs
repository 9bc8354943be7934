// ── Document <-> domain conversion ──
//
// The document id becomes the record's `id`; every other field comes from
// the document body. Records are written whole, so the body repeats the id
// that keys the document.

use brewkit_api::{Document, Fields};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::CoreError;
use crate::model::{Beverage, Component};

/// Decode a document into `T`, using the document id as `T::id`.
fn decode<T: DeserializeOwned>(collection: &str, doc: Document) -> Result<T, CoreError> {
    let Document { id, mut fields } = doc;
    fields.insert("id".into(), Value::String(id.clone()));

    serde_json::from_value(Value::Object(fields)).map_err(|source| CoreError::Decode {
        collection: collection.to_owned(),
        id,
        source,
    })
}

pub(crate) fn component_from_document(
    collection: &str,
    doc: Document,
) -> Result<Component, CoreError> {
    decode(collection, doc)
}

pub(crate) fn beverage_from_document(
    collection: &str,
    doc: Document,
) -> Result<Beverage, CoreError> {
    decode(collection, doc)
}

/// Encode a record as document fields, `id` included.
pub(crate) fn to_fields<T: Serialize>(record: &T) -> Result<Fields, CoreError> {
    match serde_json::to_value(record).map_err(CoreError::Encode)? {
        Value::Object(fields) => Ok(fields),
        other => Err(CoreError::Encode(serde::ser::Error::custom(format!(
            "expected an object, got {other}"
        )))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Temperature;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn doc(id: &str, fields: Value) -> Document {
        Document::new(id, fields.as_object().cloned().unwrap())
    }

    fn component(id: &str, name: &str) -> Component {
        Component {
            id: id.into(),
            name: name.into(),
            color: "#ffffff".into(),
        }
    }

    #[test]
    fn component_takes_id_from_document() {
        let c = component_from_document(
            "bases",
            doc("b1", json!({ "name": "Espresso", "color": "#3c2218" })),
        )
        .unwrap();

        assert_eq!(c.id, "b1");
        assert_eq!(c.name, "Espresso");
        assert_eq!(c.color, "#3c2218");
    }

    #[test]
    fn document_id_overrides_stray_id_field() {
        let c = component_from_document(
            "syrups",
            doc("real", json!({ "id": "stale", "name": "Vanilla", "color": "#f3e5ab" })),
        )
        .unwrap();
        assert_eq!(c.id, "real");
    }

    #[test]
    fn missing_field_reports_document() {
        let err = component_from_document("creamers", doc("c9", json!({ "name": "Cream" })))
            .unwrap_err();

        match err {
            CoreError::Decode { collection, id, .. } => {
                assert_eq!(collection, "creamers");
                assert_eq!(id, "c9");
            }
            other => panic!("expected Decode, got {other:?}"),
        }
    }

    #[test]
    fn beverage_fields_are_camel_case_with_id() {
        let beverage = Beverage {
            id: "bev-1".into(),
            name: "Fog".into(),
            base: component("b1", "Black Tea"),
            creamer: component("c1", "Milk"),
            syrup: component("s1", "Vanilla"),
            temperature: Temperature {
                id: 2,
                name: "Hot".into(),
                value: "hot".into(),
            },
            created_at: 1_700_000_000_000,
        };

        let fields = to_fields(&beverage).unwrap();
        assert_eq!(fields["id"], "bev-1");
        assert_eq!(fields["createdAt"], json!(1_700_000_000_000_i64));
        assert_eq!(fields["base"]["id"], "b1");

        let back = beverage_from_document("beverages", Document::new("bev-1", fields)).unwrap();
        assert_eq!(back, beverage);
    }
}
