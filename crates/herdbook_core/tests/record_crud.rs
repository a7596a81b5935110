use herdbook_core::db::open_db_in_memory;
use herdbook_core::{
    CowId, CowInput, CowRepository, FieldErrorKind, OwnerId, OwnerRepository, RecordInput,
    RecordService, ServiceError, SqliteCowRepository, SqliteOwnerRepository,
    SqliteRecordRepository,
};
use rusqlite::Connection;

const NO_PARAMS: [(&str, &str); 0] = [];

fn register(conn: &Connection, username: &str) -> OwnerId {
    SqliteOwnerRepository::try_new(conn)
        .unwrap()
        .create_owner(username)
        .unwrap()
}

fn add_cow(conn: &Connection, owner: OwnerId, number: &str) -> CowId {
    let fields = CowInput {
        number: Some(number.to_string()),
        sex: Some("female".to_string()),
        ..CowInput::default()
    }
    .validate()
    .unwrap();
    SqliteCowRepository::try_new(conn)
        .unwrap()
        .create_cow(owner, &fields)
        .unwrap()
}

fn service(
    conn: &Connection,
) -> RecordService<SqliteRecordRepository<'_>, SqliteCowRepository<'_>> {
    RecordService::new(
        SqliteRecordRepository::try_new(conn).unwrap(),
        SqliteCowRepository::try_new(conn).unwrap(),
    )
}

fn record_input(cow: CowId, content: &str, day: &str) -> RecordInput {
    RecordInput {
        cow: Some(cow),
        content: Some(content.to_string()),
        etc: None,
        day: Some(day.to_string()),
    }
}

#[test]
fn create_get_and_patch_record() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "keeper");
    let cow = add_cow(&conn, owner, "002-1023-1203-1");
    let service = service(&conn);

    let created = service
        .create_record(
            owner,
            &RecordInput {
                etc: Some("dose 2ml".to_string()),
                ..record_input(cow, "vaccinated", "2021-05-01")
            },
        )
        .unwrap();
    assert_eq!(created.cow, cow);
    assert_eq!(created.etc.as_deref(), Some("dose 2ml"));

    let patched = service
        .patch_record(
            owner,
            created.id,
            &RecordInput {
                content: Some("vaccinated (booster)".to_string()),
                ..RecordInput::default()
            },
        )
        .unwrap();
    assert_eq!(patched.content, "vaccinated (booster)");
    assert_eq!(patched.etc.as_deref(), Some("dose 2ml"));
    assert_eq!(service.get_record(owner, created.id).unwrap(), patched);
}

#[test]
fn replace_record_keeps_omitted_etc() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "keeper");
    let cow = add_cow(&conn, owner, "002-1023-1203-1");
    let service = service(&conn);

    let created = service
        .create_record(
            owner,
            &RecordInput {
                etc: Some("dose 2ml".to_string()),
                ..record_input(cow, "vaccinated", "2021-05-01")
            },
        )
        .unwrap();

    let missing = service
        .update_record(
            owner,
            created.id,
            &RecordInput {
                content: Some("dewormed".to_string()),
                ..RecordInput::default()
            },
        )
        .unwrap_err();
    match missing {
        ServiceError::Validation(errors) => assert_eq!(errors.fields(), vec!["cow", "day"]),
        other => panic!("expected validation error, got: {other}"),
    }

    let replaced = service
        .update_record(owner, created.id, &record_input(cow, "dewormed", "2021-06-01"))
        .unwrap();
    assert_eq!(replaced.content, "dewormed");
    assert_eq!(replaced.etc.as_deref(), Some("dose 2ml"));
}

#[test]
fn record_against_other_owners_cow_is_rejected_on_cow_field() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "keeper");
    let other = register(&conn, "neighbour");
    let foreign_cow = add_cow(&conn, other, "002-1023-1203-1");
    let service = service(&conn);

    let err = service
        .create_record(owner, &record_input(foreign_cow, "stolen", "2021-05-01"))
        .unwrap_err();
    match err {
        ServiceError::Validation(errors) => {
            assert_eq!(errors.fields(), vec!["cow"]);
            assert_eq!(errors.get("cow"), Some(&FieldErrorKind::NotOwner));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(service.list_records(owner, NO_PARAMS).unwrap().is_empty());
    assert!(service.list_records(other, NO_PARAMS).unwrap().is_empty());
}

#[test]
fn moving_record_to_other_owners_cow_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "keeper");
    let other = register(&conn, "neighbour");
    let cow = add_cow(&conn, owner, "002-1023-1203-1");
    let foreign_cow = add_cow(&conn, other, "002-1023-1203-1");
    let service = service(&conn);

    let record = service
        .create_record(owner, &record_input(cow, "weighed", "2021-05-01"))
        .unwrap();
    let err = service
        .patch_record(
            owner,
            record.id,
            &RecordInput {
                cow: Some(foreign_cow),
                ..RecordInput::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(ref errors)
        if errors.get("cow") == Some(&FieldErrorKind::NotOwner)));
}

#[test]
fn record_against_missing_cow_is_rejected_on_cow_field() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "keeper");
    let service = service(&conn);

    let err = service
        .create_record(owner, &record_input(404, "ghost", "2021-05-01"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(ref errors)
        if errors.get("cow") == Some(&FieldErrorKind::DoesNotExist(404))));
}

#[test]
fn cow_records_listing_requires_ownership() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "keeper");
    let other = register(&conn, "neighbour");
    let cow_a = add_cow(&conn, owner, "002-1023-1203-1");
    let cow_b = add_cow(&conn, owner, "002-1023-1203-2");
    let service = service(&conn);

    service
        .create_record(owner, &record_input(cow_a, "a1", "2021-05-02"))
        .unwrap();
    service
        .create_record(owner, &record_input(cow_a, "a2", "2021-05-01"))
        .unwrap();
    service
        .create_record(owner, &record_input(cow_b, "b1", "2021-05-01"))
        .unwrap();

    let listed = service.list_cow_records(owner, cow_a, NO_PARAMS).unwrap();
    let contents: Vec<&str> = listed.iter().map(|item| item.content.as_str()).collect();
    assert_eq!(contents, vec!["a2", "a1"]);

    let filtered = service
        .list_cow_records(owner, cow_a, [("day", "2021-05-02")])
        .unwrap();
    assert_eq!(filtered.len(), 1);

    assert!(matches!(
        service.list_cow_records(other, cow_a, NO_PARAMS),
        Err(ServiceError::NotFound { entity: "cow", .. })
    ));
}

#[test]
fn delete_record_is_owner_scoped() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "keeper");
    let other = register(&conn, "neighbour");
    let cow = add_cow(&conn, owner, "002-1023-1203-1");
    let service = service(&conn);
    let record = service
        .create_record(owner, &record_input(cow, "weighed", "2021-05-01"))
        .unwrap();

    assert!(matches!(
        service.delete_record(other, record.id),
        Err(ServiceError::NotFound {
            entity: "record",
            ..
        })
    ));
    service.delete_record(owner, record.id).unwrap();
    assert!(matches!(
        service.get_record(owner, record.id),
        Err(ServiceError::NotFound { .. })
    ));
}
