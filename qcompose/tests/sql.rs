use qcompose::demo::db::{Member, Team};
use qcompose::demo::MemberSearchCondition;
use qcompose::prelude::*;
use qcompose::value::Value;

#[test]
fn select_without_criteria_has_no_where_clause() {
    let statement = select_from::<Member>()
        .filter(compose(&MemberSearchCondition::default()))
        .build();

    assert_eq!(
        statement.sql,
        "SELECT\n member.id, member.username, member.age, member.team_id\nFROM member"
    );
    assert!(statement.params.is_empty());
}

#[test]
fn composed_criteria_render_as_one_conjunction() {
    let cond = MemberSearchCondition {
        username: Some("member1".to_owned()),
        age_goe: Some(10),
        age_loe: Some(20),
        ..Default::default()
    };
    let statement = select::<Member, _>((Member::username(), Member::age()))
        .filter(compose(&cond))
        .build();

    assert_eq!(
        statement.sql,
        "SELECT\n member.username, member.age\nFROM member\nWHERE\n member.username = $1 AND member.age >= $2 AND member.age <= $3"
    );
    assert_eq!(
        statement.params,
        vec![Value::from("member1"), Value::Int(10), Value::Int(20)]
    );
}

#[test]
fn nested_junctions_are_parenthesized() {
    let predicate = Member::age().goe(20)
        & (Member::username().eq("member1") | Member::username().is_null());

    let statement = predicate.to_sql();
    assert_eq!(
        statement.sql,
        "member.age >= $1 AND (member.username = $2 OR member.username IS NULL)"
    );
}

#[test]
fn between_in_and_not() {
    let predicate = Member::age()
        .between(10, 20)
        .and(!Member::id().is_in(vec![1i64, 2]));

    assert_eq!(
        predicate.to_sql().sql,
        "member.age BETWEEN $1 AND $2 AND NOT (member.id IN ($3, $4))"
    );

    let empty: Vec<i64> = vec![];
    assert_eq!(Member::id().is_in(empty).to_sql().sql, "FALSE");
}

#[test]
fn order_and_row_window() {
    let statement = select::<Team, _>(Team::name())
        .order_by(Team::name().desc())
        .order_by(Team::id().asc().nulls_last())
        .range(10..15)
        .build();

    assert_eq!(
        statement.sql,
        "SELECT\n team.name\nFROM team\nORDER BY team.name DESC, team.id ASC NULLS LAST\nLIMIT 5\nOFFSET 10"
    );
}

#[test]
fn paged_select_and_its_count() -> QResult<()> {
    let query = select_from::<Team>().filter(Team::name().ne("teamA"));

    let paged = query.clone().paged(Pageable::of_page(2, 10)?).build();
    assert!(paged.sql.ends_with("WHERE\n team.name <> $1\nLIMIT 10\nOFFSET 20"));

    let count = query.order_by(Team::id().asc()).range(0..1).build_count();
    assert_eq!(count.sql, "SELECT COUNT(*)\nFROM team\nWHERE\n team.name <> $1");
    assert_eq!(count.params, vec![Value::from("teamA")]);

    Ok(())
}

#[test]
fn bulk_update_statements() -> QResult<()> {
    let rename = update::<Member>()
        .set(Member::username(), "guest")
        .filter(Member::age().lt(28))
        .build()?;
    assert_eq!(
        rename.sql,
        "UPDATE member\nSET\n username = $1\nWHERE\n member.age < $2"
    );
    assert_eq!(rename.params, vec![Value::from("guest"), Value::Int(28)]);

    let shift = update::<Member>()
        .set_expr(Member::age(), Member::age().add(1))
        .set_null(Member::team_id())
        .build()?;
    assert_eq!(
        shift.sql,
        "UPDATE member\nSET\n age = member.age + $1,\n team_id = NULL"
    );

    let empty = update::<Member>().filter(Member::age().gt(1)).build();
    assert!(matches!(empty, Err(QError::EmptyUpdate)));

    Ok(())
}

#[test]
fn bulk_delete_statement() {
    let statement = delete::<Member>().filter(Member::age().gt(18)).build();

    assert_eq!(statement.sql, "DELETE FROM member\nWHERE\n member.age > $1");
    assert_eq!(statement.params, vec![Value::Int(18)]);

    assert_eq!(delete::<Team>().build().sql, "DELETE FROM team");
}

#[test]
fn left_join_select_and_its_count() {
    let cond = MemberSearchCondition {
        team_name: Some("teamA".to_owned()),
        age_goe: Some(10),
        ..Default::default()
    };
    let query = select::<Member, _>((Member::id(), Member::username(), Team::name()))
        .left_join::<Team>(Member::team_id().eq_column(Team::id()))
        .filter(compose(&cond))
        .order_by(Member::id().asc());

    assert_eq!(
        query.build().sql,
        "SELECT\n member.id, member.username, team.name\nFROM member\nLEFT JOIN team ON member.team_id = team.id\nWHERE\n member.age >= $1 AND team.name = $2\nORDER BY member.id ASC"
    );
    assert_eq!(
        query.build_count().sql,
        "SELECT COUNT(*)\nFROM member\nLEFT JOIN team ON member.team_id = team.id\nWHERE\n member.age >= $1 AND team.name = $2"
    );
    assert_eq!(query.tables(), vec!["member", "team"]);
}

#[test]
fn last_possible_page_does_not_overflow() -> QResult<()> {
    let statement = select_from::<Team>()
        .paged(Pageable::of_page(u64::MAX, 10)?)
        .build();
    assert!(statement.sql.ends_with(&format!("OFFSET {}", u64::MAX)));

    let statement = select_from::<Team>()
        .paged(Pageable::at_offset(10, u64::MAX)?)
        .build();
    assert!(statement
        .sql
        .ends_with(&format!("LIMIT {}\nOFFSET 10", u64::MAX - 10)));

    Ok(())
}

#[test]
fn typed_expression_assignment() -> QResult<()> {
    let statement = update::<Member>()
        .set_expr(Member::team_id(), Member::team_id().add(10))
        .set_expr(Member::username(), Member::username())
        .build()?;

    assert_eq!(
        statement.sql,
        "UPDATE member\nSET\n team_id = member.team_id + $1,\n username = member.username"
    );
    assert_eq!(statement.params, vec![Value::Int(10)]);

    Ok(())
}
