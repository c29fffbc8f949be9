use strata_core::{EdgeId, EdgeKind, ErrorInfo, StrataError, VertexId};

#[test]
fn errors_round_trip_json() {
    let err = StrataError::UndeterminedColor(
        ErrorInfo::new("undetermined-color", "edge shape outside the known rules")
            .with_context("from", 1)
            .with_context("to", 5),
    );
    let json = serde_json::to_string_pretty(&err).expect("serialize");
    assert!(json.contains("\"family\": \"UndeterminedColor\""));
    let decoded: StrataError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, err);
}

#[test]
fn identifiers_and_kinds_serialize_compactly() {
    let payload = (VertexId::from_raw(3), EdgeId::from_raw(9), EdgeKind::Yellow);
    let json = serde_json::to_string(&payload).expect("serialize");
    assert_eq!(json, "[3,9,\"yellow\"]");
    let decoded: (VertexId, EdgeId, EdgeKind) = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, payload);
}
