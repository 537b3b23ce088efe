mod common;

use lodge::error::LodgeError;
use lodge::models::fine::{Fine, FineAmount, FineForm, MakeUpJob, MakeUpJobForm};
use lodge::models::member::{Member, MemberForm, YearInSchool};
use lodge::models::position::{Position, PositionForm, PositionHeld, PositionHeldForm};
use lodge::models::schedule::ScheduledWorkJob;
use lodge::models::term::{SchoolTerm, Term, TermForm};
use lodge::models::trade::{Trade, TradeProposal};
use lodge::models::user::{User, UserForm};
use lodge::models::work_job::{
    DayOfWeek, ResponsibilityForm, WorkJob, WorkJobForm, WorkJobResponsibility,
};
use lodge::models::{GqlDate, GqlDateTime, GqlTime};
use sqlx::SqlitePool;
use time::macros::{date, datetime, time};

use common::{dishes, new_member, new_user, schedule, setup, term};

fn proposed_at() -> GqlDateTime {
    GqlDateTime(datetime!(2024-02-26 09:00 UTC))
}

fn approved_at() -> GqlDateTime {
    GqlDateTime(datetime!(2024-02-27 17:30 UTC))
}

async fn trash(pool: &SqlitePool) -> WorkJob {
    let form = WorkJobForm {
        title: "Trash".to_owned(),
        description: "Take the bins out to the curb".to_owned(),
        time_start: GqlTime(time!(7:00)),
        time_due: GqlTime(time!(9:00)),
        length: 15,
        days: vec![2, 4],
    };
    let id = WorkJob::create(&form, pool).await.unwrap();

    WorkJob::with_id(id, pool).await.unwrap()
}

async fn house_manager(pool: &SqlitePool) -> Position {
    let form = PositionForm {
        title: "House Manager".to_owned(),
        description: "Keeps the house in working order".to_owned(),
        seniority_points: 3,
        is_exec: true,
        percent_off_workjobs: 50,
    };
    let id = Position::create(&form, pool).await.unwrap();

    Position::with_id(id, pool).await.unwrap()
}

#[tokio::test]
async fn members_are_saved_alongside_their_users() {
    let pool = setup().await;
    let member = new_member("mleroy", &pool).await;

    assert_eq!(member.year, YearInSchool::Sophomore);
    assert_eq!(member.member_since, Some(GqlDate(date!(2023 - 09 - 01))));

    let form = MemberForm {
        nickname: Some("Leroy".to_owned()),
        member_since: None,
        year: YearInSchool::Junior,
    };
    let id = Member::save_for_user(member.user, &form, &pool).await.unwrap();
    assert_eq!(id, member.id);

    let updated = Member::for_user(member.user, &pool).await.unwrap().unwrap();
    assert_eq!(updated.nickname.as_deref(), Some("Leroy"));
    assert_eq!(updated.year, YearInSchool::Junior);
    assert_eq!(updated.member_since, None);
}

#[tokio::test]
async fn nicknames_are_limited_in_length() {
    let pool = setup().await;
    let user = new_user("longname", false, &pool).await;
    let form = MemberForm {
        nickname: Some("x".repeat(31)),
        member_since: None,
        year: YearInSchool::Freshman,
    };

    let result = Member::save_for_user(user.id, &form, &pool).await;
    assert!(matches!(result, Err(LodgeError::Invalid(_))));
}

#[tokio::test]
async fn usernames_are_unique() {
    let pool = setup().await;
    new_user("twin", false, &pool).await;

    let result = User::create(&UserForm::new("twin"), None, common::joined(), &pool).await;
    assert!(matches!(result, Err(LodgeError::Conflict(_))));
}

#[tokio::test]
async fn users_are_not_saved_with_an_invalid_membership() {
    let pool = setup().await;
    let member = MemberForm {
        nickname: Some("x".repeat(40)),
        member_since: None,
        year: YearInSchool::Freshman,
    };

    let result = User::create(&UserForm::new("bob"), Some(&member), common::joined(), &pool).await;
    assert!(matches!(result, Err(LodgeError::Invalid(_))));
    assert_eq!(User::with_username_opt("bob", &pool).await.unwrap(), None);

    let existing = new_user("mleroy", false, &pool).await;
    let mut renamed = UserForm::new("mleroy");
    renamed.first_name = "Marie".to_owned();
    let result = User::update(existing.id, &renamed, Some(&member), &pool).await;
    assert!(matches!(result, Err(LodgeError::Invalid(_))));
    assert_eq!(User::with_id(existing.id, &pool).await.unwrap().first_name, "");
    assert_eq!(Member::for_user(existing.id, &pool).await.unwrap(), None);
}

#[tokio::test]
async fn every_day_of_the_week_is_seeded() {
    let pool = setup().await;

    let days = DayOfWeek::all(&pool).await.unwrap();
    let names: Vec<_> = days.iter().map(|day| day.day.as_str()).collect();
    assert_eq!(
        names,
        ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"]
    );
}

#[tokio::test]
async fn work_jobs_keep_their_days_and_ordered_responsibilities() {
    let pool = setup().await;
    let job = dishes(&pool).await;

    let days = DayOfWeek::for_work_job(job.id, &pool).await.unwrap();
    let names: Vec<_> = days.iter().map(|day| day.day.as_str()).collect();
    assert_eq!(names, ["Monday", "Wednesday", "Friday"]);

    for (description, priority) in [("Put away", 3), ("Wash", 1), ("Dry", 2)] {
        let form = ResponsibilityForm {
            description: description.to_owned(),
            priority,
        };
        WorkJobResponsibility::add(job.id, &form, &pool).await.unwrap();
    }

    let responsibilities = WorkJobResponsibility::for_work_job(job.id, &pool).await.unwrap();
    let order: Vec<_> = responsibilities
        .iter()
        .map(|responsibility| responsibility.description.as_str())
        .collect();
    assert_eq!(order, ["Wash", "Dry", "Put away"]);
}

#[tokio::test]
async fn work_jobs_cannot_take_negative_time() {
    let pool = setup().await;
    let form = WorkJobForm {
        title: "Time travel".to_owned(),
        description: String::new(),
        time_start: GqlTime(time!(12:00)),
        time_due: GqlTime(time!(11:00)),
        length: -30,
        days: Vec::new(),
    };

    let result = WorkJob::create(&form, &pool).await;
    assert!(matches!(result, Err(LodgeError::Invalid(_))));
}

#[tokio::test]
async fn work_jobs_with_unknown_days_are_not_saved() {
    let pool = setup().await;
    let form = WorkJobForm {
        title: "Laundry".to_owned(),
        description: "Run the house towels".to_owned(),
        time_start: GqlTime(time!(10:00)),
        time_due: GqlTime(time!(12:00)),
        length: 60,
        days: vec![1, 99],
    };

    let result = WorkJob::create(&form, &pool).await;
    assert!(matches!(result, Err(LodgeError::Invalid(_))));
    assert!(WorkJob::all(&pool).await.unwrap().is_empty());

    let job = dishes(&pool).await;
    let mut update = form.clone();
    update.title = "Evening laundry".to_owned();
    assert!(matches!(
        WorkJob::update(job.id, &update, &pool).await,
        Err(LodgeError::Invalid(_))
    ));
    assert!(matches!(
        WorkJob::set_days(job.id, &[2, 99], &pool).await,
        Err(LodgeError::Invalid(_))
    ));

    let unchanged = WorkJob::with_id(job.id, &pool).await.unwrap();
    assert_eq!(unchanged.title, "Dishes");
    let days = DayOfWeek::for_work_job(job.id, &pool).await.unwrap();
    let ids: Vec<_> = days.iter().map(|day| day.id).collect();
    assert_eq!(ids, [1, 3, 5]);

    WorkJob::set_days(job.id, &[6, 7], &pool).await.unwrap();
    let days = DayOfWeek::for_work_job(job.id, &pool).await.unwrap();
    let ids: Vec<_> = days.iter().map(|day| day.id).collect();
    assert_eq!(ids, [6, 7]);
}

#[tokio::test]
async fn a_scheduled_work_job_belongs_to_one_member() {
    let pool = setup().await;
    let member = new_member("mleroy", &pool).await;
    let job = dishes(&pool).await;

    let scheduled = schedule(&member, &job, date!(2024 - 03 - 01), &pool).await;
    assert_eq!(scheduled.member, member.id);
    assert_eq!(scheduled.work_job, job.id);
    assert_eq!(scheduled.date_due, GqlDate(date!(2024 - 03 - 01)));

    let mine = ScheduledWorkJob::for_member(member.id, &pool).await.unwrap();
    assert_eq!(mine, vec![scheduled]);
}

#[tokio::test]
async fn a_week_is_scheduled_on_each_of_the_jobs_days() {
    let pool = setup().await;
    let member = new_member("mleroy", &pool).await;
    let job = dishes(&pool).await;

    let ids = ScheduledWorkJob::schedule_week(member.id, job.id, date!(2024 - 03 - 04), &pool)
        .await
        .unwrap();
    assert_eq!(ids.len(), 3);

    let week = ScheduledWorkJob::between(date!(2024 - 03 - 04), date!(2024 - 03 - 10), &pool)
        .await
        .unwrap();
    let dates: Vec<_> = week.iter().map(|scheduled| scheduled.date_due.0).collect();
    assert_eq!(
        dates,
        [date!(2024 - 03 - 04), date!(2024 - 03 - 06), date!(2024 - 03 - 08)]
    );

    let result =
        ScheduledWorkJob::schedule_week(member.id, job.id, date!(2024 - 03 - 05), &pool).await;
    assert!(matches!(result, Err(LodgeError::Invalid(_))));
}

#[tokio::test]
async fn weeks_are_only_scheduled_for_existing_records() {
    let pool = setup().await;
    let member = new_member("mleroy", &pool).await;
    let job = dishes(&pool).await;

    assert!(matches!(
        ScheduledWorkJob::schedule_week(member.id, 42, date!(2024 - 03 - 04), &pool).await,
        Err(LodgeError::NotFound(_))
    ));
    assert!(matches!(
        ScheduledWorkJob::schedule_week(42, job.id, date!(2024 - 03 - 04), &pool).await,
        Err(LodgeError::NotFound(_))
    ));
    assert!(ScheduledWorkJob::for_member(member.id, &pool)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn fines_of_zero_are_warnings() {
    let pool = setup().await;
    let member = new_member("mleroy", &pool).await;

    let warning = FineForm {
        member: member.id,
        offense: "Late to dishes".to_owned(),
        amount: 0,
    };
    let charged = FineForm {
        member: member.id,
        offense: "Skipped dishes".to_owned(),
        amount: 25,
    };
    let warning = Fine::with_id(Fine::issue(&warning, &pool).await.unwrap(), &pool)
        .await
        .unwrap();
    let charged = Fine::with_id(Fine::issue(&charged, &pool).await.unwrap(), &pool)
        .await
        .unwrap();

    assert_eq!(warning.charge(), FineAmount::Warning);
    assert_eq!(warning.charge().to_string(), "Warning");
    assert_eq!(charged.charge(), FineAmount::Charge(25));
    assert_eq!(charged.charge().to_string(), "25");
    assert!(!charged.paid);

    let negative = FineForm {
        member: member.id,
        offense: "Owed money".to_owned(),
        amount: -5,
    };
    assert!(matches!(
        Fine::issue(&negative, &pool).await,
        Err(LodgeError::Invalid(_))
    ));

    Fine::set_paid(charged.id, true, &pool).await.unwrap();
    let unpaid = Fine::unpaid(&pool).await.unwrap();
    assert_eq!(unpaid, vec![warning]);
}

#[tokio::test]
async fn make_up_jobs_must_match_the_fined_member() {
    let pool = setup().await;
    let absent = new_member("absent", &pool).await;
    let bystander = new_member("bystander", &pool).await;
    let job = dishes(&pool).await;
    let missed = schedule(&absent, &job, date!(2024 - 03 - 01), &pool).await;

    let wrong_fine = FineForm {
        member: bystander.id,
        offense: "Missed dishes".to_owned(),
        amount: 10,
    };
    let wrong_fine = Fine::issue(&wrong_fine, &pool).await.unwrap();
    let form = MakeUpJobForm {
        title: "Scrub the oven".to_owned(),
        description: String::new(),
        missed_workjob: missed.id,
        date_due: GqlDate(date!(2024 - 03 - 09)),
        fine: wrong_fine,
    };
    assert!(matches!(
        MakeUpJob::assign(&form, &pool).await,
        Err(LodgeError::Invalid(_))
    ));

    let right_fine = FineForm {
        member: absent.id,
        offense: "Missed dishes".to_owned(),
        amount: 10,
    };
    let right_fine = Fine::issue(&right_fine, &pool).await.unwrap();
    let form = MakeUpJobForm {
        fine: right_fine,
        ..form
    };
    let id = MakeUpJob::assign(&form, &pool).await.unwrap();
    assert_eq!(MakeUpJob::all(true, &pool).await.unwrap().len(), 1);

    MakeUpJob::set_completed(id, true, &pool).await.unwrap();
    assert!(MakeUpJob::all(true, &pool).await.unwrap().is_empty());

    // the missed job can't be unscheduled out from under its make-up job
    assert!(matches!(
        ScheduledWorkJob::unschedule(missed.id, &pool).await,
        Err(LodgeError::Conflict(_))
    ));

    Fine::delete(right_fine, &pool).await.unwrap();
    assert_eq!(MakeUpJob::with_id_opt(id, &pool).await.unwrap(), None);
}

#[tokio::test]
async fn terms_cannot_end_before_they_begin() {
    let pool = setup().await;
    let form = TermForm {
        begin_date: GqlDate(date!(2024 - 03 - 22)),
        end_date: GqlDate(date!(2024 - 01 - 08)),
        school_term: SchoolTerm::Winter,
    };

    assert!(matches!(
        Term::create(&form, &pool).await,
        Err(LodgeError::Invalid(_))
    ));
}

#[tokio::test]
async fn the_current_term_contains_today() {
    let pool = setup().await;
    let fall = term(date!(2023 - 09 - 01), date!(2023 - 12 - 15), SchoolTerm::Fall, &pool).await;
    let winter = term(date!(2024 - 01 - 08), date!(2024 - 03 - 22), SchoolTerm::Winter, &pool).await;

    assert_eq!(Term::current(date!(2023 - 12 - 15), &pool).await.unwrap(), Some(fall));
    assert_eq!(Term::current(date!(2024 - 01 - 08), &pool).await.unwrap(), Some(winter));
    assert_eq!(Term::current(date!(2023 - 12 - 25), &pool).await.unwrap(), None);
}

#[tokio::test]
async fn current_positions_follow_active_assignments_within_their_terms() {
    let pool = setup().await;
    let member = new_member("mleroy", &pool).await;
    let position = house_manager(&pool).await;
    let fall = term(date!(2023 - 09 - 01), date!(2023 - 12 - 15), SchoolTerm::Fall, &pool).await;
    let winter = term(date!(2024 - 01 - 08), date!(2024 - 03 - 22), SchoolTerm::Winter, &pool).await;

    let held = PositionHeld::assign(
        &PositionHeldForm {
            position: position.id,
            member: member.id,
            begin_term: fall.id,
            end_term: winter.id,
            is_active: true,
        },
        &pool,
    )
    .await
    .unwrap();

    let during = Member::current_positions_on(member.id, date!(2024 - 02 - 01), &pool)
        .await
        .unwrap();
    assert_eq!(during, vec![position.clone()]);

    let after = Member::current_positions_on(member.id, date!(2024 - 06 - 01), &pool)
        .await
        .unwrap();
    assert!(after.is_empty());

    PositionHeld::set_active(held, false, &pool).await.unwrap();
    let inactive = Member::current_positions_on(member.id, date!(2024 - 02 - 01), &pool)
        .await
        .unwrap();
    assert!(inactive.is_empty());
}

#[tokio::test]
async fn a_position_is_actively_held_only_once_per_member() {
    let pool = setup().await;
    let member = new_member("mleroy", &pool).await;
    let position = house_manager(&pool).await;
    let fall = term(date!(2023 - 09 - 01), date!(2023 - 12 - 15), SchoolTerm::Fall, &pool).await;
    let winter = term(date!(2024 - 01 - 08), date!(2024 - 03 - 22), SchoolTerm::Winter, &pool).await;

    let form = PositionHeldForm {
        position: position.id,
        member: member.id,
        begin_term: fall.id,
        end_term: fall.id,
        is_active: true,
    };
    PositionHeld::assign(&form, &pool).await.unwrap();

    let again = PositionHeldForm {
        begin_term: winter.id,
        end_term: winter.id,
        ..form.clone()
    };
    assert!(matches!(
        PositionHeld::assign(&again, &pool).await,
        Err(LodgeError::Invalid(_))
    ));

    let inactive = PositionHeldForm {
        is_active: false,
        ..again
    };
    let second = PositionHeld::assign(&inactive, &pool).await.unwrap();
    assert!(matches!(
        PositionHeld::set_active(second, true, &pool).await,
        Err(LodgeError::Invalid(_))
    ));

    let backwards = PositionHeldForm {
        begin_term: winter.id,
        end_term: fall.id,
        is_active: false,
        ..form
    };
    assert!(matches!(
        PositionHeld::assign(&backwards, &pool).await,
        Err(LodgeError::Invalid(_))
    ));
}

#[tokio::test]
async fn trades_only_swap_once_approved() {
    let pool = setup().await;
    let alice = new_member("alice", &pool).await;
    let bob = new_member("bob", &pool).await;
    let job = dishes(&pool).await;
    let alices = schedule(&alice, &job, date!(2024 - 03 - 01), &pool).await;
    let bobs = schedule(&bob, &job, date!(2024 - 03 - 08), &pool).await;

    let proposal = TradeProposal {
        proposed_by: alice.id,
        proposed_by_workjob: alices.id,
        recipient: None,
        recipient_workjob: None,
        is_permanent_trade: false,
    };
    let id = Trade::propose(&proposal, proposed_at(), &pool).await.unwrap();

    let open = Trade::with_id(id, &pool).await.unwrap();
    assert_eq!(open.recipient, None);
    assert!(!open.resolved());
    assert!(matches!(
        Trade::approve(id, approved_at(), &pool).await,
        Err(LodgeError::Invalid(_))
    ));

    Trade::accept(id, bob.id, bobs.id, &pool).await.unwrap();
    let accepted = Trade::with_id(id, &pool).await.unwrap();
    assert_eq!(accepted.recipient, Some(bob.id));
    assert!(!accepted.resolved());
    assert_eq!(ScheduledWorkJob::with_id(alices.id, &pool).await.unwrap().member, alice.id);
    assert_eq!(ScheduledWorkJob::with_id(bobs.id, &pool).await.unwrap().member, bob.id);

    Trade::approve(id, approved_at(), &pool).await.unwrap();
    let approved = Trade::with_id(id, &pool).await.unwrap();
    assert_eq!(approved.approved_date, Some(approved_at()));
    assert!(approved.resolved());
    assert_eq!(ScheduledWorkJob::with_id(alices.id, &pool).await.unwrap().member, bob.id);
    assert_eq!(ScheduledWorkJob::with_id(bobs.id, &pool).await.unwrap().member, alice.id);

    assert!(matches!(
        Trade::approve(id, approved_at(), &pool).await,
        Err(LodgeError::Invalid(_))
    ));
    assert!(matches!(
        Trade::withdraw(id, &pool).await,
        Err(LodgeError::Invalid(_))
    ));
    assert!(Trade::all(true, &pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn approving_fills_in_the_recipient() {
    let pool = setup().await;
    let alice = new_member("alice", &pool).await;
    let bob = new_member("bob", &pool).await;
    let job = dishes(&pool).await;
    let alices = schedule(&alice, &job, date!(2024 - 03 - 01), &pool).await;
    let bobs = schedule(&bob, &job, date!(2024 - 03 - 08), &pool).await;

    let proposal = TradeProposal {
        proposed_by: alice.id,
        proposed_by_workjob: alices.id,
        recipient: None,
        recipient_workjob: Some(bobs.id),
        is_permanent_trade: false,
    };
    let id = Trade::propose(&proposal, proposed_at(), &pool).await.unwrap();

    let pending = Trade::with_id(id, &pool).await.unwrap();
    assert_eq!(pending.recipient, None);
    assert!(!pending.resolved());
    assert_eq!(ScheduledWorkJob::with_id(alices.id, &pool).await.unwrap().member, alice.id);
    assert_eq!(ScheduledWorkJob::with_id(bobs.id, &pool).await.unwrap().member, bob.id);

    Trade::approve(id, approved_at(), &pool).await.unwrap();
    let approved = Trade::with_id(id, &pool).await.unwrap();
    assert_eq!(approved.recipient, Some(bob.id));
    assert!(approved.resolved());
    assert_eq!(ScheduledWorkJob::with_id(alices.id, &pool).await.unwrap().member, bob.id);
    assert_eq!(ScheduledWorkJob::with_id(bobs.id, &pool).await.unwrap().member, alice.id);
}

#[tokio::test]
async fn trades_are_checked_for_ownership() {
    let pool = setup().await;
    let alice = new_member("alice", &pool).await;
    let bob = new_member("bob", &pool).await;
    let job = dishes(&pool).await;
    let alices = schedule(&alice, &job, date!(2024 - 03 - 01), &pool).await;
    let bobs = schedule(&bob, &job, date!(2024 - 03 - 08), &pool).await;

    let not_hers = TradeProposal {
        proposed_by: alice.id,
        proposed_by_workjob: bobs.id,
        recipient: Some(bob.id),
        recipient_workjob: Some(alices.id),
        is_permanent_trade: false,
    };
    assert!(matches!(
        Trade::propose(&not_hers, proposed_at(), &pool).await,
        Err(LodgeError::Invalid(_))
    ));

    let with_herself = TradeProposal {
        proposed_by: alice.id,
        proposed_by_workjob: alices.id,
        recipient: Some(alice.id),
        recipient_workjob: None,
        is_permanent_trade: false,
    };
    assert!(matches!(
        Trade::propose(&with_herself, proposed_at(), &pool).await,
        Err(LodgeError::Invalid(_))
    ));

    let offered_to_bob = TradeProposal {
        proposed_by: alice.id,
        proposed_by_workjob: alices.id,
        recipient: Some(bob.id),
        recipient_workjob: None,
        is_permanent_trade: false,
    };
    let id = Trade::propose(&offered_to_bob, proposed_at(), &pool).await.unwrap();
    let carol = new_member("carol", &pool).await;
    let carols = schedule(&carol, &job, date!(2024 - 03 - 04), &pool).await;
    assert!(matches!(
        Trade::accept(id, carol.id, carols.id, &pool).await,
        Err(LodgeError::Invalid(_))
    ));

    Trade::withdraw(id, &pool).await.unwrap();
    assert_eq!(Trade::with_id_opt(id, &pool).await.unwrap(), None);
}

#[tokio::test]
async fn members_cannot_trade_with_themselves() {
    let pool = setup().await;
    let alice = new_member("alice", &pool).await;
    let bob = new_member("bob", &pool).await;
    let job = dishes(&pool).await;
    let alices = schedule(&alice, &job, date!(2024 - 03 - 01), &pool).await;
    let alices_next = schedule(&alice, &job, date!(2024 - 03 - 08), &pool).await;
    let bobs = schedule(&bob, &job, date!(2024 - 03 - 04), &pool).await;

    let for_her_own = TradeProposal {
        proposed_by: alice.id,
        proposed_by_workjob: alices.id,
        recipient: None,
        recipient_workjob: Some(alices_next.id),
        is_permanent_trade: false,
    };
    assert!(matches!(
        Trade::propose(&for_her_own, proposed_at(), &pool).await,
        Err(LodgeError::Invalid(_))
    ));

    let for_bobs = TradeProposal {
        recipient_workjob: Some(bobs.id),
        ..for_her_own
    };
    let id = Trade::propose(&for_bobs, proposed_at(), &pool).await.unwrap();
    ScheduledWorkJob::reassign(bobs.id, alice.id, &pool).await.unwrap();

    assert!(matches!(
        Trade::approve(id, approved_at(), &pool).await,
        Err(LodgeError::Invalid(_))
    ));
    let pending = Trade::with_id(id, &pool).await.unwrap();
    assert!(!pending.resolved());
    assert_eq!(pending.recipient, None);
}

#[tokio::test]
async fn accepting_keeps_the_job_already_asked_for() {
    let pool = setup().await;
    let alice = new_member("alice", &pool).await;
    let bob = new_member("bob", &pool).await;
    let job = dishes(&pool).await;
    let alices = schedule(&alice, &job, date!(2024 - 03 - 01), &pool).await;
    let bobs = schedule(&bob, &job, date!(2024 - 03 - 08), &pool).await;
    let bobs_other = schedule(&bob, &job, date!(2024 - 03 - 11), &pool).await;

    let proposal = TradeProposal {
        proposed_by: alice.id,
        proposed_by_workjob: alices.id,
        recipient: Some(bob.id),
        recipient_workjob: Some(bobs.id),
        is_permanent_trade: false,
    };
    let id = Trade::propose(&proposal, proposed_at(), &pool).await.unwrap();

    assert!(matches!(
        Trade::accept(id, bob.id, bobs_other.id, &pool).await,
        Err(LodgeError::Invalid(_))
    ));
    let trade = Trade::with_id(id, &pool).await.unwrap();
    assert_eq!(trade.recipient_workjob, Some(bobs.id));
}

#[tokio::test]
async fn a_trade_is_approved_only_once() {
    let pool = setup().await;
    let alice = new_member("alice", &pool).await;
    let bob = new_member("bob", &pool).await;
    let job = dishes(&pool).await;
    let alices = schedule(&alice, &job, date!(2024 - 03 - 01), &pool).await;
    let bobs = schedule(&bob, &job, date!(2024 - 03 - 08), &pool).await;

    let proposal = TradeProposal {
        proposed_by: alice.id,
        proposed_by_workjob: alices.id,
        recipient: Some(bob.id),
        recipient_workjob: Some(bobs.id),
        is_permanent_trade: false,
    };
    let id = Trade::propose(&proposal, proposed_at(), &pool).await.unwrap();

    let (first, second) = tokio::join!(
        Trade::approve(id, approved_at(), &pool),
        Trade::approve(id, approved_at(), &pool)
    );
    assert_eq!([&first, &second].iter().filter(|result| result.is_ok()).count(), 1);
    assert!(matches!(
        [first, second].into_iter().find(Result::is_err),
        Some(Err(LodgeError::Invalid(_)))
    ));

    assert_eq!(ScheduledWorkJob::with_id(alices.id, &pool).await.unwrap().member, bob.id);
    assert_eq!(ScheduledWorkJob::with_id(bobs.id, &pool).await.unwrap().member, alice.id);
}

#[tokio::test]
async fn permanent_trades_swap_every_later_occurrence() {
    let pool = setup().await;
    let alice = new_member("alice", &pool).await;
    let bob = new_member("bob", &pool).await;
    let dishes = dishes(&pool).await;
    let trash = trash(&pool).await;

    let alice_before = schedule(&alice, &dishes, date!(2024 - 03 - 04), &pool).await;
    let alice_traded = schedule(&alice, &dishes, date!(2024 - 03 - 06), &pool).await;
    let alice_later = schedule(&alice, &dishes, date!(2024 - 03 - 11), &pool).await;
    let bob_traded = schedule(&bob, &trash, date!(2024 - 03 - 05), &pool).await;
    let bob_later = schedule(&bob, &trash, date!(2024 - 03 - 12), &pool).await;

    let proposal = TradeProposal {
        proposed_by: alice.id,
        proposed_by_workjob: alice_traded.id,
        recipient: Some(bob.id),
        recipient_workjob: Some(bob_traded.id),
        is_permanent_trade: true,
    };
    let id = Trade::propose(&proposal, proposed_at(), &pool).await.unwrap();
    Trade::approve(id, approved_at(), &pool).await.unwrap();

    let member_of = |scheduled: ScheduledWorkJob| {
        let pool = pool.clone();
        async move {
            ScheduledWorkJob::with_id(scheduled.id, &pool)
                .await
                .unwrap()
                .member
        }
    };
    assert_eq!(member_of(alice_before).await, alice.id);
    assert_eq!(member_of(alice_traded).await, bob.id);
    assert_eq!(member_of(alice_later).await, bob.id);
    assert_eq!(member_of(bob_traded).await, alice.id);
    assert_eq!(member_of(bob_later).await, alice.id);
}

#[tokio::test]
async fn records_with_history_cannot_be_deleted() {
    let pool = setup().await;
    let member = new_member("mleroy", &pool).await;
    let job = dishes(&pool).await;
    let scheduled = schedule(&member, &job, date!(2024 - 03 - 01), &pool).await;

    assert!(matches!(
        WorkJob::delete(job.id, &pool).await,
        Err(LodgeError::Conflict(_))
    ));
    assert!(matches!(
        User::delete(member.user, &pool).await,
        Err(LodgeError::Conflict(_))
    ));

    ScheduledWorkJob::unschedule(scheduled.id, &pool).await.unwrap();
    WorkJob::delete(job.id, &pool).await.unwrap();
    assert!(WorkJobResponsibility::for_work_job(job.id, &pool)
        .await
        .unwrap()
        .is_empty());

    User::delete(member.user, &pool).await.unwrap();
    assert_eq!(Member::with_id_opt(member.id, &pool).await.unwrap(), None);
}

#[tokio::test]
async fn terms_in_use_cannot_be_deleted() {
    let pool = setup().await;
    let member = new_member("mleroy", &pool).await;
    let position = house_manager(&pool).await;
    let fall = term(date!(2023 - 09 - 01), date!(2023 - 12 - 15), SchoolTerm::Fall, &pool).await;
    let held = PositionHeld::assign(
        &PositionHeldForm {
            position: position.id,
            member: member.id,
            begin_term: fall.id,
            end_term: fall.id,
            is_active: true,
        },
        &pool,
    )
    .await
    .unwrap();

    assert!(matches!(
        Term::delete(fall.id, &pool).await,
        Err(LodgeError::Conflict(_))
    ));
    assert!(matches!(
        Position::delete(position.id, &pool).await,
        Err(LodgeError::Conflict(_))
    ));

    PositionHeld::delete(held, &pool).await.unwrap();
    Term::delete(fall.id, &pool).await.unwrap();
    Position::delete(position.id, &pool).await.unwrap();
}

#[tokio::test]
async fn missing_records_are_not_found() {
    let pool = setup().await;

    assert!(matches!(
        Member::with_id(42, &pool).await,
        Err(LodgeError::NotFound(_))
    ));
    assert!(matches!(
        Trade::with_id(42, &pool).await,
        Err(LodgeError::NotFound(_))
    ));
}
