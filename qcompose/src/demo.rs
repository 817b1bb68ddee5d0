//!
//! The `member`/`team` sample schema, and a repository searching it.
//!

use serde::Deserialize;

use crate::compose::{compose, SearchCriteria};
use crate::engine::Engine;
use crate::filter::Filter;
use crate::page::{Page, Pageable};
use crate::predicate::Predicate;
use crate::aggregate::{aggregate, Tuple};
use crate::query::{select, Select};
use crate::row::{FromRow, IntoRow, Row};
use crate::update::{delete, update};
use crate::QResult;

pub mod db {
    pub struct Member;
    pub struct Team;

    #[qcompose::table("member")]
    impl Member {
        fn id() -> i64;
        fn username() -> Option<String>;
        fn age() -> i32;
        fn team_id() -> Option<i64>;
    }

    #[qcompose::table("team")]
    impl Team {
        fn id() -> i64;
        fn name() -> String;
    }
}

use db::{Member, Team};

#[derive(Clone, Debug, PartialEq)]
pub struct MemberEntity {
    pub id: i64,
    pub username: Option<String>,
    pub age: i32,
    pub team_id: Option<i64>,
}

impl MemberEntity {
    pub fn new(id: i64, username: Option<&str>, age: i32, team: Option<&TeamEntity>) -> Self {
        Self {
            id,
            username: username.map(str::to_owned),
            age,
            team_id: team.map(|team| team.id),
        }
    }
}

impl IntoRow for MemberEntity {
    type Table = Member;

    fn into_row(self) -> Row {
        Row::new()
            .with(Member::id(), self.id)
            .with(Member::username(), self.username)
            .with(Member::age(), self.age)
            .with(Member::team_id(), self.team_id)
    }
}

impl FromRow for MemberEntity {
    fn from_row(row: &Row) -> QResult<Self> {
        Ok(Self {
            id: row.get(Member::id())?,
            username: row.get(Member::username())?,
            age: row.get(Member::age())?,
            team_id: row.get(Member::team_id())?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TeamEntity {
    pub id: i64,
    pub name: String,
}

impl TeamEntity {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_owned(),
        }
    }
}

impl IntoRow for TeamEntity {
    type Table = Team;

    fn into_row(self) -> Row {
        Row::new()
            .with(Team::id(), self.id)
            .with(Team::name(), self.name)
    }
}

/// Username and age of a member, selected as a projection.
#[derive(Clone, Debug, PartialEq)]
pub struct MemberDto {
    pub username: Option<String>,
    pub age: i32,
}

impl FromRow for MemberDto {
    fn from_row(row: &Row) -> QResult<Self> {
        Ok(Self {
            username: row.get(Member::username())?,
            age: row.get(Member::age())?,
        })
    }
}

///
/// A member together with its team, if any, as read by the repository search.
///
/// The team columns come from an outer join and so are all `None` for a
/// member without a team.
///
#[derive(Clone, Debug, PartialEq)]
pub struct MemberTeamDto {
    pub member_id: i64,
    pub username: Option<String>,
    pub age: i32,
    pub team_id: Option<i64>,
    pub team_name: Option<String>,
}

impl FromRow for MemberTeamDto {
    fn from_row(row: &Row) -> QResult<Self> {
        Ok(Self {
            member_id: row.get(Member::id())?,
            username: row.get(Member::username())?,
            age: row.get(Member::age())?,
            team_id: row.get_optional(Team::id())?,
            team_name: row.get_optional(Team::name())?,
        })
    }
}

/// Average member age of one team.
#[derive(Clone, Debug, PartialEq)]
pub struct TeamAgeDto {
    pub team_name: String,
    pub average_age: Option<f64>,
}

impl TeamAgeDto {
    fn from_tuple(tuple: &Tuple) -> QResult<Self> {
        Ok(Self {
            team_name: tuple.get(0)?,
            average_age: tuple.get(1)?,
        })
    }
}

///
/// Member search parameters. Every field is optional, and an absent
/// field does not restrict the search.
///
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct MemberSearchCondition {
    pub username: Option<String>,
    pub age: Option<i32>,
    pub age_goe: Option<i32>,
    pub age_loe: Option<i32>,
    pub team_name: Option<String>,
}

impl SearchCriteria for MemberSearchCondition {
    type Table = Member;

    fn criteria(&self) -> Vec<Option<Predicate>> {
        vec![
            self.username
                .clone()
                .map(|username| Member::username().eq(username)),
            self.age.map(|age| Member::age().eq(age)),
            self.age_goe.map(|age| Member::age().goe(age)),
            self.age_loe.map(|age| Member::age().loe(age)),
            self.team_name.clone().map(|name| Team::name().eq(name)),
        ]
    }
}

pub struct MemberRepository<E> {
    engine: E,
}

impl<E: Engine> MemberRepository<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Members left joined with their team, filtered by `condition`.
    fn search_query(condition: &MemberSearchCondition) -> Select<Member> {
        select::<Member, _>((
            Member::id(),
            Member::username(),
            Member::age(),
            Team::id(),
            Team::name(),
        ))
        .left_join::<Team>(Member::team_id().eq_column(Team::id()))
        .filter(compose(condition))
        .order_by(Member::id().asc())
    }

    pub async fn search(&self, condition: &MemberSearchCondition) -> QResult<Vec<MemberTeamDto>> {
        let rows = self.engine.fetch(&Self::search_query(condition)).await?;
        rows.iter().map(MemberTeamDto::from_row).collect()
    }

    /// One page of the search, always counting the total.
    pub async fn search_page_simple(
        &self,
        condition: &MemberSearchCondition,
        pageable: Pageable,
    ) -> QResult<Page<MemberTeamDto>> {
        self.engine
            .fetch_page(&Self::search_query(condition), pageable)
            .await?
            .try_map(|row| MemberTeamDto::from_row(&row))
    }

    /// One page of the search, counting the total only when it can't be inferred.
    pub async fn search_page_complex(
        &self,
        condition: &MemberSearchCondition,
        pageable: Pageable,
    ) -> QResult<Page<MemberTeamDto>> {
        self.engine
            .fetch_page_lazy(&Self::search_query(condition), pageable)
            .await?
            .try_map(|row| MemberTeamDto::from_row(&row))
    }

    /// Average member age per team, for the members matching `condition`.
    pub async fn team_age_averages(
        &self,
        condition: &MemberSearchCondition,
    ) -> QResult<Vec<TeamAgeDto>> {
        let statement = aggregate::<Member>()
            .join::<Team>(Member::team_id().eq_column(Team::id()))
            .filter(compose(condition))
            .group_by(Team::name())
            .output(Team::name())
            .output(Member::age().avg());

        let tuples = self.engine.fetch_aggregate(&statement).await?;
        tuples.iter().map(TeamAgeDto::from_tuple).collect()
    }

    /// Usernames and ages only, filtered the same way as [`Self::search`].
    pub async fn search_dtos(&self, condition: &MemberSearchCondition) -> QResult<Vec<MemberDto>> {
        let query = select::<Member, _>((Member::username(), Member::age()))
            .left_join::<Team>(Member::team_id().eq_column(Team::id()))
            .filter(compose(condition))
            .order_by(Member::id().asc());

        let rows = self.engine.fetch(&query).await?;
        rows.iter().map(MemberDto::from_row).collect()
    }

    pub async fn bulk_rename_younger_than(&self, age: i32, username: &str) -> QResult<u64> {
        let statement = update::<Member>()
            .set(Member::username(), username)
            .filter(Member::age().lt(age));

        self.engine.execute_update(&statement).await
    }

    pub async fn bulk_add_age(&self, delta: i32) -> QResult<u64> {
        let statement = update::<Member>().set_expr(Member::age(), Member::age().add(delta));

        self.engine.execute_update(&statement).await
    }

    pub async fn bulk_delete_older_than(&self, age: i32) -> QResult<u64> {
        let statement = delete::<Member>().filter(Member::age().gt(age));

        self.engine.execute_delete(&statement).await
    }
}
