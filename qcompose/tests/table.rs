use qcompose::ty::Kind;
use qcompose::{Instance, Table};

pub mod db {
    pub struct Book;

    #[qcompose::table("book")]
    impl Book {
        fn id() -> i64;
        fn title() -> String;
        #[column("page_count")]
        fn pages() -> Option<i32>;
    }
}

use db::Book;

#[test]
fn columns_follow_declaration_order() {
    let columns = Book::instance().columns();

    let names: Vec<_> = columns.iter().map(|column| column.name).collect();
    assert_eq!(names, vec!["id", "title", "page_count"]);
    assert!(columns.iter().all(|column| column.table == "book"));
}

#[test]
fn column_types_carry_kind_and_nullability() {
    let pages = Book::pages().column_ref();
    assert_eq!(pages.kind, Kind::Int32);
    assert!(pages.nullable);

    let title = Book::title().column_ref();
    assert_eq!(title.kind, Kind::Text);
    assert!(!title.nullable);
}

#[test]
fn table_name() {
    assert_eq!(Book::instance().name(), "book");
    assert_eq!(Book::pages().name(), "page_count");
}
