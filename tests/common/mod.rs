#![allow(dead_code)]

use lodge::config::Config;
use lodge::models::member::{Member, MemberForm, YearInSchool};
use lodge::models::schedule::{ScheduleForm, ScheduledWorkJob};
use lodge::models::term::{SchoolTerm, Term, TermForm};
use lodge::models::user::{User, UserForm};
use lodge::models::work_job::{WorkJob, WorkJobForm};
use lodge::models::{GqlDate, GqlDateTime, GqlTime};
use sqlx::SqlitePool;
use time::macros::{date, datetime, time};
use time::Date;

pub async fn setup() -> SqlitePool {
    lodge::db::connect(&Config::in_memory())
        .await
        .expect("in-memory database should open")
}

pub fn joined() -> GqlDateTime {
    GqlDateTime(datetime!(2024-01-08 12:00 UTC))
}

pub async fn new_user(username: &str, is_staff: bool, pool: &SqlitePool) -> User {
    let mut form = UserForm::new(username);
    form.is_staff = is_staff;
    let id = User::create(&form, None, joined(), pool).await.unwrap();

    User::with_id(id, pool).await.unwrap()
}

/// A user along with their membership.
pub async fn new_member(username: &str, pool: &SqlitePool) -> Member {
    let user = new_user(username, false, pool).await;
    let form = MemberForm {
        nickname: None,
        member_since: Some(GqlDate(date!(2023 - 09 - 01))),
        year: YearInSchool::Sophomore,
    };
    let id = Member::save_for_user(user.id, &form, pool).await.unwrap();

    Member::with_id(id, pool).await.unwrap()
}

/// Dishes, done Monday, Wednesday and Friday.
pub async fn dishes(pool: &SqlitePool) -> WorkJob {
    let form = WorkJobForm {
        title: "Dishes".to_owned(),
        description: "Wash, dry and put away the dinner dishes".to_owned(),
        time_start: GqlTime(time!(18:30)),
        time_due: GqlTime(time!(20:00)),
        length: 45,
        days: vec![1, 3, 5],
    };
    let id = WorkJob::create(&form, pool).await.unwrap();

    WorkJob::with_id(id, pool).await.unwrap()
}

pub async fn term(begin: Date, end: Date, school_term: SchoolTerm, pool: &SqlitePool) -> Term {
    let form = TermForm {
        begin_date: GqlDate(begin),
        end_date: GqlDate(end),
        school_term,
    };
    let id = Term::create(&form, pool).await.unwrap();

    Term::with_id(id, pool).await.unwrap()
}

pub async fn schedule(
    member: &Member,
    work_job: &WorkJob,
    date_due: Date,
    pool: &SqlitePool,
) -> ScheduledWorkJob {
    let form = ScheduleForm {
        date_due: GqlDate(date_due),
        member: member.id,
        work_job: work_job.id,
    };
    let id = ScheduledWorkJob::schedule(&form, pool).await.unwrap();

    ScheduledWorkJob::with_id(id, pool).await.unwrap()
}
