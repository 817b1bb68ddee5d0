#[test]
fn table_macro_expands() {
    let cases = trybuild::TestCases::new();
    cases.pass("tests/macro/*.rs");
}
