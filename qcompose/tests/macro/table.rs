use qcompose::Table;

pub struct Account;
pub struct Session;

#[qcompose::table("account")]
impl Account {
    /// Primary key
    fn id() -> i64;

    #[column("display_name")]
    fn name() -> Option<String>;

    fn active() -> bool;
}

#[qcompose::table("session")]
impl Table for Session {
    fn id() -> i64;
    fn account_id() -> i64;
}

fn main() {
    let _ = Account::name().eq("x") & Session::account_id().eq_column(Account::id());
}
