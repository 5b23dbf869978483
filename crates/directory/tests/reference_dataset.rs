use directory::DirectoryStore;
use shared::domain::CenterId;

#[test]
fn reference_dataset_loads_and_validates() {
    let store = DirectoryStore::reference().expect("reference dataset");
    assert_eq!(store.len(), 24);
    assert_eq!(
        store.districts(),
        [
            "Pune".to_string(),
            "Ahilyanagar".to_string(),
            "Nashik".to_string()
        ]
    );
}

#[test]
fn reference_dataset_district_counts() {
    let store = DirectoryStore::reference().expect("reference dataset");
    assert_eq!(store.filter_by_district(Some("Pune")).len(), 16);
    assert_eq!(store.filter_by_district(Some("Ahilyanagar")).len(), 3);
    assert_eq!(store.filter_by_district(Some("Nashik")).len(), 5);
}

#[test]
fn reference_dataset_drops_empty_websites() {
    let store = DirectoryStore::reference().expect("reference dataset");
    let apcoer = store.get(&CenterId::from("1")).expect("center 1");
    assert_eq!(apcoer.contact.website, None);

    let modern = store.get(&CenterId::from("8")).expect("center 8");
    assert_eq!(
        modern.contact.website.as_deref(),
        Some("https://moderncoe.edu.in/")
    );
    assert_eq!(modern.node, "Pune");
}

#[test]
fn reference_dataset_loads_from_file() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data/learning_centers.json");
    let store = DirectoryStore::load(&path).expect("load from file");
    assert_eq!(store.len(), 24);
}
