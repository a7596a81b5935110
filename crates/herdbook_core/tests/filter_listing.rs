use herdbook_core::db::open_db_in_memory;
use herdbook_core::{
    CowInput, CowService, CowView, OwnerId, OwnerRepository, RecordInput, RecordService,
    SqliteCowRepository, SqliteOwnerRepository, SqliteRecordRepository,
};
use rusqlite::Connection;

fn register(conn: &Connection, username: &str) -> OwnerId {
    SqliteOwnerRepository::try_new(conn)
        .unwrap()
        .create_owner(username)
        .unwrap()
}

fn cow_service(
    conn: &Connection,
) -> CowService<SqliteCowRepository<'_>, SqliteRecordRepository<'_>> {
    CowService::new(
        SqliteCowRepository::try_new(conn).unwrap(),
        SqliteRecordRepository::try_new(conn).unwrap(),
    )
}

fn add_cow(
    service: &CowService<SqliteCowRepository<'_>, SqliteRecordRepository<'_>>,
    owner: OwnerId,
    number: &str,
    birthday: Option<&str>,
    deleted: bool,
) -> CowView {
    service
        .create_cow(
            owner,
            &CowInput {
                number: Some(number.to_string()),
                sex: Some("female".to_string()),
                birthday: birthday.map(str::to_string),
                mother_number: None,
                deleted: Some(deleted),
            },
        )
        .unwrap()
}

fn numbers(cows: &[CowView]) -> Vec<&str> {
    cows.iter().map(|cow| cow.number.as_str()).collect()
}

#[test]
fn boolean_filter_selects_matching_cow_only() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "keeper");
    let service = cow_service(&conn);
    let gone = add_cow(&service, owner, "002-0000-0001-1", None, true);
    add_cow(&service, owner, "002-0000-0002-1", None, false);

    let listed = service.list_cows(owner, [("deleted", "True")]).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, gone.id);

    let listed = service.list_cows(owner, [("deleted", "False")]).unwrap();
    assert_eq!(numbers(&listed), vec!["002-0000-0002-1"]);
}

#[test]
fn unknown_parameter_is_dropped_and_ordering_applied() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "keeper");
    let service = cow_service(&conn);
    add_cow(&service, owner, "002-0000-0001-1", Some("2021-01-01"), false);
    add_cow(&service, owner, "002-0000-0002-1", Some("2019-01-01"), false);
    add_cow(&service, owner, "002-0000-0003-1", None, false);

    let ascending = service
        .list_cows(
            owner,
            [("order_by", "birthday"), ("nonexistent_field", "x")],
        )
        .unwrap();
    assert_eq!(
        numbers(&ascending),
        vec!["002-0000-0003-1", "002-0000-0002-1", "002-0000-0001-1"]
    );

    let descending = service.list_cows(owner, [("order_by", "-birthday")]).unwrap();
    assert_eq!(
        numbers(&descending),
        vec!["002-0000-0001-1", "002-0000-0002-1", "002-0000-0003-1"]
    );
}

#[test]
fn ordering_by_other_fields_overrides_default_order() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "keeper");
    let service = cow_service(&conn);
    add_cow(&service, owner, "002-0000-0002-1", Some("2019-01-01"), false);
    add_cow(&service, owner, "002-0000-0001-1", Some("2021-01-01"), false);

    let by_number = service.list_cows(owner, [("order_by", "-number")]).unwrap();
    assert_eq!(
        numbers(&by_number),
        vec!["002-0000-0002-1", "002-0000-0001-1"]
    );
}

#[test]
fn empty_or_invalid_ordering_keeps_default_order() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "keeper");
    let service = cow_service(&conn);
    add_cow(&service, owner, "002-0000-0001-1", Some("2021-01-01"), false);
    add_cow(&service, owner, "002-0000-0002-1", Some("2019-01-01"), false);

    let expected = vec!["002-0000-0002-1", "002-0000-0001-1"];
    for value in ["", "summary", "-"] {
        let listed = service.list_cows(owner, [("order_by", value)]).unwrap();
        assert_eq!(numbers(&listed), expected, "order_by=`{value}`");
    }
}

#[test]
fn listing_is_always_scoped_to_owner() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "keeper");
    let other = register(&conn, "neighbour");
    let service = cow_service(&conn);
    add_cow(&service, owner, "002-0000-0001-1", None, false);
    add_cow(&service, other, "002-0000-0002-1", None, false);

    let other_id = other.to_string();
    let listed = service.list_cows(owner, [("user", other_id.as_str())]).unwrap();
    assert!(listed.is_empty());

    let listed = service.list_cows(owner, [("sex", "female")]).unwrap();
    assert_eq!(numbers(&listed), vec!["002-0000-0001-1"]);
}

#[test]
fn record_listing_combines_filters_with_and() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "keeper");
    let cows = cow_service(&conn);
    let first = add_cow(&cows, owner, "002-0000-0001-1", None, false);
    let second = add_cow(&cows, owner, "002-0000-0002-1", None, false);
    let records = RecordService::new(
        SqliteRecordRepository::try_new(&conn).unwrap(),
        SqliteCowRepository::try_new(&conn).unwrap(),
    );

    for (cow, day, etc) in [
        (first.id, "2021-05-01", Some("note")),
        (first.id, "2021-05-02", None),
        (second.id, "2021-05-01", None),
    ] {
        records
            .create_record(
                owner,
                &RecordInput {
                    cow: Some(cow),
                    content: Some("checked".to_string()),
                    etc: etc.map(str::to_string),
                    day: Some(day.to_string()),
                },
            )
            .unwrap();
    }

    let first_id = first.id.to_string();
    let listed = records
        .list_records(owner, [("cow", first_id.as_str()), ("day", "2021-05-01")])
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].etc.as_deref(), Some("note"));

    let listed = records
        .list_records(owner, [("etc__isnull", "True"), ("order_by", "-cow")])
        .unwrap();
    let cows_listed: Vec<i64> = listed.iter().map(|item| item.cow).collect();
    assert_eq!(cows_listed, vec![second.id, first.id]);

    let listed = records
        .list_records(owner, [("day", "yesterday"), ("cow", "abc")])
        .unwrap();
    assert_eq!(listed.len(), 3);
}
