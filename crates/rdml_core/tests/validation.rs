use rdml_core::{
    validate_file, BuiltinContract, ContractRegistry, DocumentError, ExperimenterDraft,
    FormatVersion, RdmlDocument,
};
use std::sync::Arc;

#[test]
fn new_document_with_experimenter_is_valid() {
    let registry = ContractRegistry::with_builtin_contracts();
    let mut document = RdmlDocument::new();
    document
        .add_experimenter(
            &ExperimenterDraft::new("exp1", "Ada", "Lovelace").with_email("ada@example.org"),
            None,
        )
        .unwrap();

    let report = document.validate(&registry).unwrap();
    assert!(report.is_valid(), "{:?}", report.diagnostics);
    assert_eq!(report.version, FormatVersion::V1_2);
    assert!(document.is_valid(&registry));
}

#[test]
fn diagnostics_point_at_source_lines() {
    let registry = ContractRegistry::with_builtin_contracts();
    let document = RdmlDocument::parse(
        "<rdml xmlns='http://www.rdml.org' version='1.2'>\n\
         <experimenter id='e1'>\n\
         <firstName>Ada</firstName>\n\
         </experimenter>\n\
         </rdml>",
    )
    .unwrap();

    let report = document.validate(&registry).unwrap();
    assert!(!report.is_valid());
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].line, 2);
    assert!(report.diagnostics[0]
        .message
        .contains("missing required child `lastName`"));
    assert!(!document.is_valid(&registry));
}

#[test]
fn validate_against_other_version_reports_mismatch() {
    let registry = ContractRegistry::with_builtin_contracts();
    let document = RdmlDocument::new();
    let report = document
        .validate_against(&registry, FormatVersion::V1_0)
        .unwrap();
    assert!(!report.is_valid());
    assert!(report.diagnostics[0].message.contains("does not match"));
}

#[test]
fn missing_contract_is_an_error() {
    let mut registry = ContractRegistry::new();
    registry
        .register(Arc::new(BuiltinContract::new(FormatVersion::V1_0)))
        .unwrap();
    let document = RdmlDocument::new();

    let err = document.validate(&registry).unwrap_err();
    assert!(matches!(
        err,
        DocumentError::ContractUnavailable(FormatVersion::V1_2)
    ));
    assert!(!document.is_valid(&registry));
}

#[test]
fn validation_does_not_mutate_the_document() {
    let registry = ContractRegistry::with_builtin_contracts();
    let document = RdmlDocument::parse(
        "<rdml xmlns='http://www.rdml.org' version='1.2'><dye id='x'/><dateMade>t</dateMade></rdml>",
    )
    .unwrap();
    let before = document.to_xml_string().unwrap();
    let report = document.validate(&registry).unwrap();
    assert!(!report.is_valid());
    assert_eq!(document.to_xml_string().unwrap(), before);
}

#[test]
fn validate_file_renders_report_table() {
    let registry = ContractRegistry::with_builtin_contracts();
    let dir = tempfile::tempdir().unwrap();

    let valid = dir.path().join("valid.rdml");
    let mut document = RdmlDocument::new();
    document
        .add_experimenter(&ExperimenterDraft::new("exp1", "Ada", "Lovelace"), None)
        .unwrap();
    document.save_file(&valid).unwrap();
    assert_eq!(
        validate_file(&valid, &registry),
        "RDML file structure:\tTrue\tValid file structure.\n\
         RDML version:\tTrue\t1.2\n\
         Schema validation result:\tTrue\tRDML file is valid.\n"
    );

    let broken = dir.path().join("broken.rdml");
    std::fs::write(&broken, "<notes/>").unwrap();
    let table = validate_file(&broken, &registry);
    assert!(table.starts_with("RDML file structure:\tFalse\t"), "{table}");
    assert_eq!(table.lines().count(), 1);

    let table = validate_file(&valid, &ContractRegistry::new());
    assert!(table.contains("RDML version:\tFalse\tno structural contract"), "{table}");
}
