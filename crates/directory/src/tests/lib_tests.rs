use super::*;

const TWO_CENTERS: &str = r#"[
  {
    "id": "a",
    "name": "Alpha Institute",
    "address": "1 Main Road",
    "coordinates": { "latitude": 18.5, "longitude": 73.8 },
    "contact": { "website": "", "phone": "020-1234567" },
    "district": "Pune",
    "node": "Pune"
  },
  {
    "id": "b",
    "name": "Beta College",
    "address": "2 College Road",
    "coordinates": { "latitude": 20.0, "longitude": 73.7 },
    "district": "Nashik",
    "node": "Nashik"
  }
]"#;

#[test]
fn parses_records_and_normalizes_blank_contacts() {
    let store = DirectoryStore::from_json(TWO_CENTERS).expect("store");
    assert_eq!(store.len(), 2);

    let alpha = store.get(&CenterId::from("a")).expect("alpha");
    assert_eq!(alpha.contact.website, None);
    assert_eq!(alpha.contact.phone.as_deref(), Some("020-1234567"));

    let beta = store.get(&CenterId::from("b")).expect("beta");
    assert_eq!(beta.contact, shared::domain::Contact::default());
}

#[test]
fn districts_keep_first_appearance_order() {
    let store = DirectoryStore::from_json(TWO_CENTERS).expect("store");
    assert_eq!(store.districts(), ["Pune".to_string(), "Nashik".to_string()]);
    assert!(store.has_district("Nashik"));
    assert!(!store.has_district("Mumbai"));
}

#[test]
fn filter_without_district_returns_everything_in_order() {
    let store = DirectoryStore::from_json(TWO_CENTERS).expect("store");
    let ids: Vec<_> = store
        .filter_by_district(None)
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![CenterId::from("a"), CenterId::from("b")]);

    let nashik = store.filter_by_district(Some("Nashik"));
    assert_eq!(nashik.len(), 1);
    assert_eq!(nashik[0].id, CenterId::from("b"));

    assert!(store.filter_by_district(Some("Mumbai")).is_empty());
}

#[test]
fn rejects_out_of_range_latitude() {
    let raw = TWO_CENTERS.replace("\"latitude\": 20.0", "\"latitude\": 95.0");
    let err = DirectoryStore::from_json(&raw).expect_err("latitude out of range");
    assert!(matches!(
        err,
        DirectoryError::InvalidCoordinates { ref id, .. } if id.as_str() == "b"
    ));
}

#[test]
fn rejects_out_of_range_longitude() {
    let raw = TWO_CENTERS.replace("\"longitude\": 73.8", "\"longitude\": -181.0");
    let err = DirectoryStore::from_json(&raw).expect_err("longitude out of range");
    assert!(matches!(err, DirectoryError::InvalidCoordinates { .. }));
}

#[test]
fn rejects_non_finite_coordinates() {
    let mut centers: Vec<LearningCenter> = serde_json::from_str(TWO_CENTERS).expect("parse");
    centers[0].coordinates.latitude = f64::NAN;
    let err = DirectoryStore::from_centers(centers).expect_err("nan latitude");
    assert!(matches!(err, DirectoryError::InvalidCoordinates { .. }));
}

#[test]
fn rejects_missing_coordinates_as_parse_error() {
    let raw = r#"[{ "id": "x", "name": "n", "address": "a", "district": "d", "node": "n" }]"#;
    let err = DirectoryStore::from_json(raw).expect_err("missing coordinates");
    assert!(matches!(err, DirectoryError::Parse(_)));
}

#[test]
fn rejects_duplicate_and_empty_ids() {
    let duplicate = TWO_CENTERS.replace("\"id\": \"b\"", "\"id\": \"a\"");
    assert!(matches!(
        DirectoryStore::from_json(&duplicate),
        Err(DirectoryError::DuplicateId { .. })
    ));

    let empty = TWO_CENTERS.replace("\"id\": \"b\"", "\"id\": \" \"");
    assert!(matches!(
        DirectoryStore::from_json(&empty),
        Err(DirectoryError::MissingId { index: 1 })
    ));
}

#[test]
fn load_reports_missing_file_path() {
    let path = std::env::temp_dir().join("shikshan_directory_missing_file.json");
    let err = DirectoryStore::load(&path).expect_err("missing file");
    assert!(err.to_string().contains("shikshan_directory_missing_file.json"));
}
