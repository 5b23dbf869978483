use super::*;

fn directory() -> DirectoryStore {
    DirectoryStore::reference().expect("reference data")
}

fn valid_signup() -> SignupForm {
    SignupForm {
        name: "Asha Patil".into(),
        username: "asha_p".into(),
        phone: "9876543210".into(),
        email: "asha@example.com".into(),
        address: "12 Karve Road, Pune".into(),
        district: Some("Pune".into()),
        center_id: Some(CenterId::from("1")),
        password: "secret1".into(),
        confirm_password: "secret1".into(),
    }
}

#[test]
fn email_pattern_requires_local_domain_and_tld() {
    assert!(validate_email("a@b.co").is_ok());
    assert_eq!(validate_email(""), Err("Email is required"));
    assert!(validate_email("a@b").is_err());
    assert!(validate_email("a b@c.d").is_err());
    assert!(validate_email("@b.co").is_err());
}

#[test]
fn login_collects_both_field_errors() {
    let form = LoginForm {
        email: "not-an-email".into(),
        password: "12345".into(),
    };
    let errors = form.validate().expect_err("invalid form");
    assert_eq!(errors.errors().len(), 2);
    assert_eq!(
        errors.message_for(Field::Password),
        Some("Password must be at least 6 characters")
    );
    assert_eq!(
        errors.message_for(Field::Email),
        Some("Please enter a valid email")
    );
}

#[test]
fn valid_login_yields_credentials() {
    let form = LoginForm {
        email: "demo@example.com".into(),
        password: "hunter22".into(),
    };
    let credentials = form.validate().expect("valid");
    assert_eq!(credentials.email, "demo@example.com");
}

#[test]
fn signup_allows_blank_username() {
    let form = SignupForm {
        username: " ".into(),
        ..valid_signup()
    };
    let account = form.validate(&directory()).expect("blank username");
    assert_eq!(account.username, "");
}

#[test]
fn signup_resolves_center_name_from_directory() {
    let account = valid_signup().validate(&directory()).expect("valid signup");
    assert_eq!(account.district, "Pune");
    assert_eq!(account.center.id, "1");
    assert!(account.center.name.contains("APCOER"));
}

#[test]
fn signup_rejects_center_from_another_district() {
    let mut form = valid_signup();
    form.center_id = Some(CenterId::from("15"));
    let errors = form.validate(&directory()).expect_err("mismatched center");
    assert_eq!(
        errors.message_for(Field::Center),
        Some("Please select a learning center")
    );
    assert_eq!(errors.message_for(Field::District), None);
}

#[test]
fn signup_reports_every_bad_field() {
    let form = SignupForm {
        name: "A".into(),
        username: "a-b".into(),
        phone: "12345".into(),
        email: "x".into(),
        address: "ab".into(),
        district: Some("Mumbai".into()),
        center_id: None,
        password: "secret1".into(),
        confirm_password: "secret2".into(),
    };
    let errors = form.validate(&directory()).expect_err("invalid");
    for field in [
        Field::Name,
        Field::Username,
        Field::Phone,
        Field::Email,
        Field::Address,
        Field::District,
        Field::Center,
        Field::ConfirmPassword,
    ] {
        assert!(errors.message_for(field).is_some(), "{field} should fail");
    }
    assert_eq!(errors.message_for(Field::Password), None);
    assert_eq!(
        errors.message_for(Field::ConfirmPassword),
        Some("Passwords do not match")
    );
}

#[test]
fn username_charset_is_enforced() {
    assert!(validate_username("maker_42").is_ok());
    assert_eq!(
        validate_username("maker.42"),
        Err("Username can only contain letters, numbers, and underscores")
    );
    assert_eq!(
        validate_username("ab"),
        Err("Username must be at least 3 characters")
    );
}

#[test]
fn profile_update_only_checks_touched_fields() {
    assert!(validate_profile_update(&ProfileUpdate::default()).is_ok());

    let update = ProfileUpdate {
        phone: Some("98765".into()),
        ..ProfileUpdate::default()
    };
    let errors = validate_profile_update(&update).expect_err("short phone");
    assert_eq!(errors.errors().len(), 1);
    assert_eq!(errors.errors()[0].field, Field::Phone);
}
