//! End-to-end pipeline tests: SELECT text and JSON responses in, flat rows out.

use canopy_query::{
    page_from_json, AnalyzeError, CompiledQuery, EngineConfig, InMemoryResolver, ParseError,
    QueryEngine, QueryError, RawNode, ResolveError, ReshapeError, Row, SemanticType,
};
use serde_json::{json, Value};

const DESCRIBE: &str = include_str!("fixtures/describe.json");
const ACCOUNTS: &str = include_str!("fixtures/accounts.json");

fn engine() -> QueryEngine<InMemoryResolver> {
    QueryEngine::new(InMemoryResolver::from_json(DESCRIBE).unwrap())
}

fn table(compiled: &CompiledQuery, rows: &[Row]) -> Vec<Vec<Option<String>>> {
    rows.iter()
        .map(|row| {
            compiled
                .cells(row)
                .map(|cell| cell.value().map(str::to_string))
                .collect()
        })
        .collect()
}

fn s(value: &str) -> Option<String> {
    Some(value.to_string())
}

fn accounts(compiled: &CompiledQuery) -> Vec<RawNode> {
    let page: Value = serde_json::from_str(ACCOUNTS).unwrap();
    page_from_json(&compiled.root_entity, &page).unwrap()
}

#[test]
fn test_two_sub_selects_expand_to_cross_product() {
    let engine = engine();
    let compiled = engine
        .compile(
            "SELECT Name, Owner.Name, \
             (SELECT LastName, Email FROM Contacts), \
             (SELECT Name, Amount FROM Opportunities) \
             FROM Account ORDER BY Name",
        )
        .unwrap();

    assert_eq!(
        compiled.native,
        "SELECT Name, Owner.Name, (SELECT LastName, Email FROM Contacts), \
         (SELECT Name, Amount FROM Opportunities) FROM Account ORDER BY Name"
    );

    let rows = engine.reshape(&compiled, &accounts(&compiled)).unwrap();

    assert_eq!(
        table(&compiled, &rows),
        vec![
            vec![s("Acme"), s("Ada"), s("Ng"), s("ng@acme.test"), s("Big"), s("5000.5")],
            vec![s("Acme"), s("Ada"), s("Ng"), s("ng@acme.test"), s("Small"), s("10")],
            vec![s("Acme"), s("Ada"), s("Li"), None, s("Big"), s("5000.5")],
            vec![s("Acme"), s("Ada"), s("Li"), None, s("Small"), s("10")],
            vec![s("Globex"), s("Hank"), None, None, s("Deal"), s("100")],
        ]
    );
}

#[test]
fn test_column_metadata_follows_schema_order() {
    let compiled = engine()
        .compile(
            "SELECT Name acct, Owner.Name, (SELECT LastName, Email FROM Contacts) FROM Account",
        )
        .unwrap();

    let labels: Vec<_> = compiled.columns.iter().map(|c| c.label.as_str()).collect();
    let types: Vec<_> = compiled.columns.iter().map(|c| c.semantic_type).collect();

    assert_eq!(labels, vec!["acct", "Owner.Name", "LastName", "Email"]);
    assert_eq!(
        types,
        vec![
            SemanticType::String,
            SemanticType::String,
            SemanticType::String,
            SemanticType::Email
        ]
    );
    assert_eq!(compiled.columns[1].full_name, "Owner.Name");
    assert_eq!(compiled.columns[1].name, "Name");
}

#[test]
fn test_aggregate_query() {
    let engine = engine();
    let compiled = engine
        .compile(
            "SELECT StageName, COUNT(Id) total, MAX(Amount) FROM Opportunity GROUP BY StageName",
        )
        .unwrap();

    assert_eq!(
        compiled.native,
        "SELECT StageName, COUNT(Id) total, MAX(Amount) FROM Opportunity GROUP BY StageName"
    );
    assert_eq!(compiled.columns[1].semantic_type, SemanticType::Int);
    assert_eq!(compiled.columns[1].label, "total");
    assert_eq!(compiled.columns[2].semantic_type, SemanticType::Currency);
    assert_eq!(compiled.columns[2].label, "MAX");

    let page = json!({
        "totalSize": 2,
        "done": true,
        "records": [
            {"attributes": {"type": "AggregateResult"}, "StageName": "Won", "total": 3, "expr0": 5000.5},
            {"attributes": {"type": "AggregateResult"}, "StageName": "Lost", "total": 1, "expr0": null}
        ]
    });
    let records = page_from_json(&compiled.root_entity, &page).unwrap();
    let rows = engine.reshape(&compiled, &records).unwrap();

    assert_eq!(
        table(&compiled, &rows),
        vec![
            vec![s("Won"), s("3"), s("5000.5")],
            vec![s("Lost"), s("1"), None],
        ]
    );
}

#[test]
fn test_child_to_parent_traversal() {
    let engine = engine();
    let compiled = engine
        .compile("SELECT LastName, Account.Name, Account.Owner.Name FROM Contact")
        .unwrap();

    let page = json!([{
        "attributes": {"type": "Contact", "url": "/x/Contact/003A"},
        "LastName": "Ng",
        "Account": {
            "attributes": {"type": "Account", "url": "/x/Account/001A"},
            "Name": "Acme",
            "Owner": {"attributes": {"type": "User", "url": "/x/User/005A"}, "Name": "Ada"}
        }
    }]);
    let records = page_from_json("Contact", &page).unwrap();
    let rows = engine.reshape(&compiled, &records).unwrap();

    assert_eq!(table(&compiled, &rows), vec![vec![s("Ng"), s("Acme"), s("Ada")]]);
    let full_names: Vec<_> = rows[0]
        .iter()
        .flatten()
        .map(|field| field.full_name.as_str())
        .collect();
    assert_eq!(full_names, vec!["LastName", "Account.Name", "Account.Owner.Name"]);
}

#[test]
fn test_null_parent_fills_every_requested_column() {
    let engine = engine();
    let compiled = engine
        .compile("SELECT LastName, Account.Name, Account.Type, Email FROM Contact")
        .unwrap();

    let page = json!([
        {
            "attributes": {"type": "Contact", "url": "/x/Contact/003A"},
            "LastName": "Ng",
            "Account": null,
            "Email": "ng@acme.test"
        },
        {
            "attributes": {"type": "Contact", "url": "/x/Contact/003B"},
            "LastName": "Li",
            "Account": {
                "attributes": {"type": "Account", "url": "/x/Account/001A"},
                "Name": "Acme",
                "Type": "Customer"
            },
            "Email": null
        }
    ]);
    let records = page_from_json("Contact", &page).unwrap();
    let rows = engine.reshape(&compiled, &records).unwrap();

    assert_eq!(
        table(&compiled, &rows),
        vec![
            vec![s("Ng"), None, None, s("ng@acme.test")],
            vec![s("Li"), s("Acme"), s("Customer"), None],
        ]
    );
}

#[test]
fn test_type_field_is_data_not_bookkeeping() {
    let engine = engine();
    let compiled = engine.compile("SELECT Name, Type FROM Account").unwrap();

    let page = json!({
        "totalSize": 1,
        "done": true,
        "records": [{
            "attributes": {"type": "Account", "url": "/x/Account/001A"},
            "Name": "Acme",
            "Type": "Customer"
        }]
    });
    let records = page_from_json("Account", &page).unwrap();
    let rows = engine.reshape(&compiled, &records).unwrap();

    assert_eq!(table(&compiled, &rows), vec![vec![s("Acme"), s("Customer")]]);
}

#[test]
fn test_pages_concatenate_in_order() {
    let engine = engine();
    let compiled = engine.compile("SELECT Name FROM User").unwrap();

    let page = |names: &[&str]| -> Vec<RawNode> {
        let records: Vec<Value> = names
            .iter()
            .map(|name| json!({"attributes": {"type": "User", "url": "/x/User/005"}, "Name": name}))
            .collect();
        page_from_json("User", &Value::Array(records)).unwrap()
    };
    let pages = vec![page(&["a", "b"]), page(&[]), page(&["c"])];

    let rows = engine.reshape_pages(&compiled, &pages).unwrap();

    assert_eq!(table(&compiled, &rows), vec![vec![s("a")], vec![s("b")], vec![s("c")]]);
}

#[test]
fn test_records_without_leading_identity() {
    let config = EngineConfig {
        skip_leading_identity: false,
        ..EngineConfig::default()
    };
    let engine = QueryEngine::with_config(InMemoryResolver::from_json(DESCRIBE).unwrap(), config);
    let compiled = engine.compile("SELECT Id, Name FROM User").unwrap();

    let record = RawNode::record(
        "records",
        vec![
            RawNode::scalar("type", Some("User")),
            RawNode::scalar("Id", Some("005A")),
            RawNode::scalar("Name", Some("Ada")),
        ],
    );
    let rows = engine.reshape(&compiled, &[record]).unwrap();

    assert_eq!(table(&compiled, &rows), vec![vec![s("005A"), s("Ada")]]);
}

#[test]
fn test_unknown_entity() {
    let err = engine().compile("SELECT Name FROM Widget").unwrap_err();
    assert_eq!(
        err,
        QueryError::Analyze(AnalyzeError::Resolve(ResolveError::UnknownEntity {
            entity: "Widget".to_string()
        }))
    );
}

#[test]
fn test_unknown_relationship_names_path() {
    let err = engine()
        .compile("SELECT LastName, Account.Boss.Name FROM Contact")
        .unwrap_err();

    match err {
        QueryError::Analyze(AnalyzeError::UnknownRelationship {
            entity,
            relationship,
            path,
        }) => {
            assert_eq!(entity, "Account");
            assert_eq!(relationship, "Boss");
            assert_eq!(path, "Account.Boss.Name");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_unknown_child_relationship() {
    let err = engine()
        .compile("SELECT Name, (SELECT Subject FROM Cases) FROM Account")
        .unwrap_err();
    assert!(matches!(
        err,
        QueryError::Analyze(AnalyzeError::UnknownChildRelationship { .. })
    ));
}

#[test]
fn test_unknown_field_in_sub_select() {
    let err = engine()
        .compile("SELECT Name, (SELECT Phone FROM Contacts) FROM Account")
        .unwrap_err();
    assert!(err.to_string().contains("Phone"));
}

#[test]
fn test_parse_error() {
    let err = engine().compile("SELECT Name Account").unwrap_err();
    assert!(matches!(err, QueryError::Parse(ParseError::Syntax { .. })));
}

#[test]
fn test_response_missing_sub_collection_fails_fast() {
    let engine = engine();
    let compiled = engine
        .compile("SELECT Name, (SELECT LastName FROM Contacts) FROM Account")
        .unwrap();
    let page = json!([{"attributes": {"type": "Account", "url": "/x/Account/001A"}, "Name": "Acme"}]);
    let records = page_from_json("Account", &page).unwrap();

    let err = engine.reshape(&compiled, &records).unwrap_err();
    assert!(matches!(
        err,
        QueryError::Reshape(ReshapeError::StructuralMismatch { .. })
    ));
}

#[test]
fn test_null_sub_collection_pads_with_nulls() {
    let engine = engine();
    let compiled = engine
        .compile("SELECT Name, (SELECT LastName, Email FROM Contacts), Industry FROM Account")
        .unwrap();
    let page = json!([{
        "attributes": {"type": "Account", "url": "/x/Account/001A"},
        "Name": "Acme",
        "Contacts": null,
        "Industry": "Retail"
    }]);
    let records = page_from_json("Account", &page).unwrap();

    let rows = engine.reshape(&compiled, &records).unwrap();

    assert_eq!(
        table(&compiled, &rows),
        vec![vec![s("Acme"), None, None, s("Retail")]]
    );
}

#[test]
fn test_unknown_field_names_entity_reached_by_path() {
    let err = engine()
        .compile("SELECT LastName, Account.Nickname FROM Contact")
        .unwrap_err();
    assert_eq!(
        err,
        QueryError::Analyze(AnalyzeError::UnknownField {
            entity: "Account".to_string(),
            path: "Account.Nickname".to_string(),
        })
    );
}
