use serde_json::json;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tradestat_core::{
    create_record, delete_record, init_store, RepoError, SessionFactory, StoreConfig,
    TradeRecordRepository,
};

fn store() -> (tempfile::TempDir, SessionFactory) {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        db_path: dir.path().join("trade_data.db"),
    };
    let factory = init_store(&config).unwrap();
    (dir, factory)
}

#[test]
fn committed_writes_are_visible_to_later_sessions() {
    let (_dir, factory) = store();
    let fields = json!({ "hs_2_code": "27", "trading_partner": "Kazakhstan", "year": 2024 });

    let created = factory
        .with_session(|session| create_record(session, fields.as_object().unwrap()))
        .unwrap();

    let loaded = factory
        .with_session(|session| session.trade_records().get_record(created.id))
        .unwrap()
        .unwrap();
    assert_eq!(loaded, created);

    let deleted = factory
        .with_session(|session| delete_record(session, created.id))
        .unwrap();
    assert!(deleted);
    let deleted_again = factory
        .with_session(|session| delete_record(session, created.id))
        .unwrap();
    assert!(!deleted_again);
}

#[test]
fn session_leaves_no_transaction_open_after_failed_create() {
    let (_dir, factory) = store();
    let mut session = factory.open_session().unwrap();

    let result = create_record(&mut session, json!({ "hs_2_code": 1 }).as_object().unwrap());
    assert!(matches!(result, Err(RepoError::Validation(_))));
    assert!(session.connection().is_autocommit());
    assert_eq!(session.trade_records().count_records().unwrap(), 0);
    session.close().unwrap();
}

#[test]
fn session_is_released_when_closure_panics() {
    let (_dir, factory) = store();

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let _: Result<(), RepoError> = factory.with_session(|session| {
            session
                .connection()
                .execute_batch("BEGIN IMMEDIATE;")
                .unwrap();
            panic!("handler failed mid-request");
        });
    }));
    assert!(outcome.is_err());

    // The abandoned write lock was released with the connection.
    let created = factory
        .with_session(|session| create_record(session, json!({ "year": 2024 }).as_object().unwrap()))
        .unwrap();
    assert!(created.id > 0);
}

#[test]
fn sessions_serialize_writes_from_multiple_threads() {
    let (_dir, factory) = store();

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let factory = factory.clone();
            std::thread::spawn(move || {
                for round in 0..5 {
                    let fields = json!({ "hs_2_code": "84", "year": 2000 + worker * 10 + round });
                    factory
                        .with_session(|session| create_record(session, fields.as_object().unwrap()))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let total = factory
        .with_session(|session| session.trade_records().count_records())
        .unwrap();
    assert_eq!(total, 20);
}

#[test]
fn session_can_be_handed_to_another_thread() {
    let (_dir, factory) = store();
    let mut session = factory.open_session().unwrap();

    let id = std::thread::spawn(move || {
        let record = create_record(&mut session, json!({ "hs_4_code": "8703" }).as_object().unwrap())
            .unwrap();
        session.close().unwrap();
        record.id
    })
    .join()
    .unwrap();

    assert!(factory
        .with_session(|session| session.trade_records().get_record(id))
        .unwrap()
        .is_some());
}
