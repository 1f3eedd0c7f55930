use rdml_core::{
    DocumentError, DocumentProjection, ExperimenterDraft, FormatVersion, RdmlDocument,
    RecordProjection,
};
use std::collections::BTreeMap;

const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE rdml [<!ENTITY lab "Lab">]>
<rdml xmlns="http://www.rdml.org" xmlns:rdml="http://www.rdml.org" version="1.1">
  <dateMade>2023-03-01T08:00:00</dateMade>
  <dateUpdated>2023-04-02T09:30:00</dateUpdated>
  <experimenter id="exp1">
    <firstName>Ada</firstName>
    <lastName>Lovelace</lastName>
    <email>ada@example.org</email>
  </experimenter>
  <experimenter id="exp2">
    <firstName>Grace</firstName>
    <lastName>Hopper</lastName>
    <labName>Navy</labName>
  </experimenter>
  <dye id="FAM"/>
</rdml>
"#;

#[test]
fn load_reads_version_dates_and_records() {
    let document = RdmlDocument::parse(SAMPLE).unwrap();
    assert_eq!(document.version(), FormatVersion::V1_1);
    assert_eq!(document.created_at(), Some("2023-03-01T08:00:00"));
    assert_eq!(document.updated_at(), Some("2023-04-02T09:30:00"));

    let experimenters = document.experimenters();
    assert_eq!(experimenters.len(), 2);
    assert_eq!(experimenters[1].id(), "exp2");
    assert_eq!(experimenters[1].lab_name(), Some("Navy"));
    assert_eq!(experimenters[1].email(), None);
}

#[test]
fn load_rejects_foreign_roots_and_unsupported_versions() {
    for source in [
        "<other xmlns='http://www.rdml.org' version='1.2'/>",
        "<rdml version='1.2'/>",
        "<rdml xmlns='http://www.rdml.org' version='0.9'/>",
        "<rdml xmlns='http://www.rdml.org'/>",
        "<rdml xmlns='http://www.rdml.org' version=' 1.2 '/>",
    ] {
        let err = RdmlDocument::parse(source).unwrap_err();
        assert!(matches!(err, DocumentError::Format(_)), "{source}: {err}");
    }
}

#[test]
fn load_rejects_malformed_xml() {
    let err = RdmlDocument::parse("<rdml xmlns='http://www.rdml.org' version='1.2'><experimenter>")
        .unwrap_err();
    assert!(matches!(err, DocumentError::Xml(_)), "{err}");
}

#[test]
fn save_and_load_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.rdml");

    let mut document = RdmlDocument::new();
    document
        .add_experimenter(&ExperimenterDraft::new("exp1", "Ada", "Lovelace"), None)
        .unwrap();
    document.save_file(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));

    let reloaded = RdmlDocument::load_file(&path).unwrap();
    assert_eq!(reloaded.export(), document.export());
}

#[test]
fn load_file_reports_empty_and_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let empty = dir.path().join("empty.rdml");
    std::fs::write(&empty, "  \n").unwrap();

    let err = RdmlDocument::load_file(&empty).unwrap_err();
    assert!(matches!(err, DocumentError::Format(_)));
    assert!(err.to_string().contains("empty"));

    let err = RdmlDocument::load_file(dir.path().join("missing.rdml")).unwrap_err();
    assert!(matches!(err, DocumentError::Io { .. }));
}

#[test]
fn text_round_trip_preserves_projection() {
    let document = RdmlDocument::parse(SAMPLE).unwrap();
    let reloaded = RdmlDocument::parse(&document.to_xml_string().unwrap()).unwrap();
    assert_eq!(reloaded.export(), document.export());
    assert_eq!(reloaded.root().children().len(), 5);
}

#[test]
fn json_projection_uses_document_names() {
    let document = RdmlDocument::parse(SAMPLE).unwrap();
    let json = document.to_json().unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "rdml": {
                "version": "1.1",
                "dateMade": "2023-03-01T08:00:00",
                "dateUpdated": "2023-04-02T09:30:00",
                "experimenters": [
                    {"id": "exp1", "firstName": "Ada", "lastName": "Lovelace", "email": "ada@example.org"},
                    {"id": "exp2", "firstName": "Grace", "lastName": "Hopper", "labName": "Navy"}
                ]
            }
        })
    );
}

#[test]
fn import_then_export_is_identity() {
    let projection = RdmlDocument::parse(SAMPLE).unwrap().export();
    let imported = RdmlDocument::from_projection(&projection).unwrap();
    assert_eq!(imported.export(), projection);

    let reloaded = RdmlDocument::parse(&imported.to_xml_string().unwrap()).unwrap();
    assert_eq!(reloaded.export(), projection);
}

#[test]
fn import_rejects_unknown_fields_versions_and_duplicates() {
    let record = |id: &str, extra: Option<(&str, &str)>| {
        let mut fields = BTreeMap::from([
            ("firstName".to_string(), "A".to_string()),
            ("lastName".to_string(), "B".to_string()),
        ]);
        if let Some((key, value)) = extra {
            fields.insert(key.to_string(), value.to_string());
        }
        RecordProjection {
            id: id.to_string(),
            fields,
        }
    };
    let projection = |version: &str, experimenters: Vec<RecordProjection>| DocumentProjection {
        version: version.to_string(),
        date_made: None,
        date_updated: None,
        experimenters,
    };

    let err = RdmlDocument::from_projection(&projection("3.0", vec![])).unwrap_err();
    assert!(matches!(err, DocumentError::Format(_)));

    let err = RdmlDocument::from_projection(&projection(
        "1.2",
        vec![record("e1", Some(("phone", "123")))],
    ))
    .unwrap_err();
    assert!(matches!(err, DocumentError::Projection(ref message) if message.contains("phone")));

    let err = RdmlDocument::from_projection(&projection(
        "1.2",
        vec![record("e1", None), record("e1", None)],
    ))
    .unwrap_err();
    assert!(matches!(err, DocumentError::Repo(_)));
}

#[test]
fn failed_load_keeps_current_document() {
    let mut document = RdmlDocument::parse(SAMPLE).unwrap();
    let before = document.export();
    assert!(document.load("<rdml").is_err());
    assert_eq!(document.export(), before);

    document
        .load("<rdml xmlns='http://www.rdml.org' version='1.0'/>")
        .unwrap();
    assert_eq!(document.version(), FormatVersion::V1_0);
    assert!(document.experimenters().is_empty());
}

#[test]
fn field_whitespace_survives_save_and_load() {
    let mut document = RdmlDocument::new();
    document
        .add_experimenter(
            &ExperimenterDraft::new("exp1", " Ada", "Lovelace ").with_lab_name("  Engines "),
            None,
        )
        .unwrap();
    let projection = document.export();
    assert_eq!(projection.experimenters[0].fields["firstName"], " Ada");

    let reloaded = RdmlDocument::parse(&document.to_xml_string().unwrap()).unwrap();
    assert_eq!(reloaded.export(), projection);

    let imported = RdmlDocument::from_projection(&projection).unwrap();
    let reloaded = RdmlDocument::parse(&imported.to_xml_string().unwrap()).unwrap();
    assert_eq!(reloaded.export(), projection);
}
