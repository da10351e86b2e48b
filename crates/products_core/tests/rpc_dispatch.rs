use products_core::db::open_db_in_memory;
use products_core::rpc::{
    CREATE_PRODUCT, DELETE_PRODUCT, FIND_ALL_PRODUCTS, FIND_ONE_PRODUCT, STATUS_NOT_FOUND,
    UPDATE_PRODUCT,
};
use products_core::{dispatch, ProductStore, SqliteProductRepository};
use serde_json::{json, Value};

#[test]
fn message_patterns_drive_full_lifecycle() {
    let conn = open_db_in_memory().expect("in-memory db should open");
    let store = ProductStore::new(
        SqliteProductRepository::try_new(&conn).expect("schema should be current"),
    );

    let created = dispatch(
        &store,
        CREATE_PRODUCT,
        json!({ "name": "Widget", "price": 4.5 }),
    )
    .expect("dispatch should succeed");
    assert_eq!(created["id"], 1);
    assert_eq!(created["available"], true);

    let listed = dispatch(&store, FIND_ALL_PRODUCTS, Value::Null).expect("dispatch should succeed");
    assert_eq!(listed["meta"], json!({ "total": 1, "page": 1, "lastPage": 1 }));
    assert_eq!(listed["data"][0]["name"], "Widget");

    let updated = dispatch(&store, UPDATE_PRODUCT, json!({ "id": 1, "price": 5.0 }))
        .expect("dispatch should succeed");
    assert_eq!(updated["price"], 5.0);
    assert_eq!(updated["name"], "Widget");

    let found = dispatch(&store, FIND_ONE_PRODUCT, json!({ "id": 1 }))
        .expect("dispatch should succeed");
    assert_eq!(found["price"], 5.0);

    let deleted = dispatch(&store, DELETE_PRODUCT, json!(1)).expect("dispatch should succeed");
    assert_eq!(deleted["available"], false);

    let err = dispatch(&store, FIND_ONE_PRODUCT, json!(1)).expect_err("dispatch should fail");
    assert_eq!(err.status, STATUS_NOT_FOUND);
    assert_eq!(err.message, "Product with id #1 not found");
}

#[test]
fn find_all_honors_page_and_limit() {
    let conn = open_db_in_memory().expect("in-memory db should open");
    let store = ProductStore::new(
        SqliteProductRepository::try_new(&conn).expect("schema should be current"),
    );
    for n in 0..3 {
        dispatch(
            &store,
            CREATE_PRODUCT,
            json!({ "name": format!("p{n}"), "price": 1 }),
        )
        .expect("dispatch should succeed");
    }

    let page = dispatch(&store, FIND_ALL_PRODUCTS, json!({ "page": 2, "limit": 2 }))
        .expect("dispatch should succeed");
    assert_eq!(page["data"].as_array().expect("data should be an array").len(), 1);
    assert_eq!(page["data"][0]["name"], "p2");
    assert_eq!(page["meta"], json!({ "total": 3, "page": 2, "lastPage": 2 }));

    let err = dispatch(&store, FIND_ALL_PRODUCTS, json!({ "limit": 0 }))
        .expect_err("dispatch should fail");
    assert_eq!(err.status, 400);
}
