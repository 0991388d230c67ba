mod common;

use chrono::Duration;
use common::Harness;
use outreach_allocator::framework::ActorClient;
use outreach_allocator::model::{Capability, SignupRole, SignupStatus};
use outreach_allocator::notification::NotificationKind;
use outreach_allocator::AllocationError;

#[tokio::test]
async fn test_lottery_fills_seats_lowest_numbers_first() {
    let h = Harness::start().await;
    let round_id = h.round(2, Duration::days(3), None).await;

    let mut signups = Vec::new();
    for name in ["Ana", "Ben", "Cat"] {
        let user = h.volunteer(name).await;
        let signup = h
            .system
            .signups
            .signup_for_round(round_id, user, None)
            .await
            .expect("Signup failed");
        assert_eq!(signup.status, SignupStatus::Waitlisted);
        assert!(signup.lottery_number.is_some());
        signups.push(signup);
    }

    let winners = h
        .system
        .lottery
        .run_lottery_for_round(round_id)
        .await
        .expect("Lottery failed");
    assert_eq!(winners.len(), 2);

    let mut numbers: Vec<u32> = signups.iter().filter_map(|s| s.lottery_number).collect();
    numbers.sort();
    let mut won: Vec<u32> = winners.iter().filter_map(|s| s.lottery_number).collect();
    won.sort();
    assert_eq!(won, numbers[..2].to_vec());

    let round = h.system.rounds.fetch(round_id).await.unwrap();
    assert_eq!(round.confirmed_volunteer_count(), 2);
    assert_eq!(round.waitlist().len(), 1);

    // A second run has nothing left to fill.
    let again = h.system.lottery.run_lottery_for_round(round_id).await.unwrap();
    assert!(again.is_empty());

    assert_eq!(h.sink.wait_for(NotificationKind::LotteryWon, 2).await, 2);
    assert_eq!(h.sink.count_of(NotificationKind::SignupWaitlisted), 3);
    h.shutdown().await;
}

#[tokio::test]
async fn test_team_lead_is_confirmed_immediately() {
    let h = Harness::start().await;
    let round_id = h.round(2, Duration::days(3), None).await;
    let lead = h.user_with("Lee", Some(Capability::TeamLead)).await;
    let other_lead = h.user_with("Lou", Some(Capability::TeamLead)).await;

    let signup = h
        .system
        .signups
        .signup_for_round(round_id, lead, Some(SignupRole::TeamLead))
        .await
        .expect("Lead signup failed");
    assert_eq!(signup.status, SignupStatus::Confirmed);
    assert_eq!(signup.lottery_number, None);

    let err = h
        .system
        .signups
        .signup_for_round(round_id, other_lead, Some(SignupRole::TeamLead))
        .await
        .unwrap_err();
    assert!(matches!(err, AllocationError::Conflict(_)));

    // The lead's seat is not one of the volunteer seats.
    let round = h.system.rounds.fetch(round_id).await.unwrap();
    assert_eq!(round.confirmed_volunteer_count(), 0);
    assert_eq!(round.confirmed_count(), 1);

    assert_eq!(h.sink.wait_for(NotificationKind::SignupConfirmed, 1).await, 1);
    h.shutdown().await;
}

#[tokio::test]
async fn test_role_signup_without_capability_is_unauthorized() {
    let h = Harness::start().await;
    let round_id = h.round(2, Duration::days(3), None).await;
    let user = h.volunteer("Max").await;

    let err = h
        .system
        .signups
        .signup_for_round(round_id, user, Some(SignupRole::Clinician))
        .await
        .unwrap_err();
    assert!(matches!(err, AllocationError::Unauthorized(_)));

    // Granting the capability afterwards is enough.
    h.system.users.grant(user, Capability::Clinician).await.unwrap();
    let signup = h
        .system
        .signups
        .signup_for_round(round_id, user, Some(SignupRole::Clinician))
        .await
        .unwrap();
    assert_eq!(signup.status, SignupStatus::Confirmed);
    h.shutdown().await;
}

#[tokio::test]
async fn test_duplicate_and_unknown_signups_are_rejected() {
    let h = Harness::start().await;
    let round_id = h.round(2, Duration::days(3), None).await;
    let user = h.volunteer("Kim").await;

    h.system
        .signups
        .signup_for_round(round_id, user, None)
        .await
        .unwrap();
    let err = h
        .system
        .signups
        .signup_for_round(round_id, user, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AllocationError::Conflict(_)));

    let missing_round = outreach_allocator::model::RoundId(999);
    let err = h
        .system
        .signups
        .signup_for_round(missing_round, user, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AllocationError::NotFound(_)));
    h.shutdown().await;
}

#[tokio::test]
async fn test_cancel_outside_floor_backfills_from_waitlist() {
    let h = Harness::start().await;
    let round_id = h.round(1, Duration::days(3), None).await;
    let first = h.volunteer("Ada").await;
    let second = h.volunteer("Bo").await;

    let a = h.system.signups.signup_for_round(round_id, first, None).await.unwrap();
    let b = h.system.signups.signup_for_round(round_id, second, None).await.unwrap();
    let winners = h.system.lottery.run_lottery_for_round(round_id).await.unwrap();
    assert_eq!(winners.len(), 1);
    let (confirmed, waiting) = if winners[0].user_id == first { (a, b) } else { (b, a) };

    // 30 hours before the start.
    let round = h.system.rounds.fetch(round_id).await.unwrap();
    h.clock.set(round.starts_at - Duration::hours(30));

    let removed = h
        .system
        .signups
        .cancel_signup(confirmed.id, confirmed.user_id)
        .await
        .expect("Cancellation failed");
    assert_eq!(removed.status, SignupStatus::Confirmed);

    let round = h.system.rounds.fetch(round_id).await.unwrap();
    assert!(round.is_confirmed_participant(waiting.user_id));
    assert!(round.active_signup_of(confirmed.user_id).is_none());
    assert_eq!(round.confirmed_volunteer_count(), 1);
    h.shutdown().await;
}

#[tokio::test]
async fn test_cancel_inside_floor_is_refused() {
    let h = Harness::start().await;
    let round_id = h.round(2, Duration::days(3), None).await;
    let user = h.volunteer("Eve").await;
    let signup = h.system.signups.signup_for_round(round_id, user, None).await.unwrap();

    let round = h.system.rounds.fetch(round_id).await.unwrap();
    h.clock.set(round.starts_at - Duration::hours(10));

    let err = h
        .system
        .signups
        .cancel_signup(signup.id, user)
        .await
        .unwrap_err();
    match err {
        AllocationError::InvalidState(msg) => assert!(msg.contains("24 hours"), "{}", msg),
        other => panic!("Expected InvalidState, got {:?}", other),
    }

    // Staff removal ignores the floor.
    h.system
        .signups
        .admin_cancel_signup(signup.id, h.staff)
        .await
        .expect("Staff removal failed");
    let round = h.system.rounds.fetch(round_id).await.unwrap();
    assert!(round.active_signup_of(user).is_none());
    h.shutdown().await;
}

#[tokio::test]
async fn test_cancel_someone_elses_signup_is_unauthorized() {
    let h = Harness::start().await;
    let round_id = h.round(2, Duration::days(3), None).await;
    let owner = h.volunteer("Owen").await;
    let intruder = h.volunteer("Ivy").await;
    let signup = h.system.signups.signup_for_round(round_id, owner, None).await.unwrap();

    let err = h
        .system
        .signups
        .cancel_signup(signup.id, intruder)
        .await
        .unwrap_err();
    assert!(matches!(err, AllocationError::Unauthorized(_)));
    h.shutdown().await;
}

#[tokio::test]
async fn test_manual_confirmation_respects_seat_limit() {
    let h = Harness::start().await;
    let round_id = h.round(1, Duration::days(3), None).await;
    let first = h.volunteer("Pat").await;
    let second = h.volunteer("Quinn").await;
    let a = h.system.signups.signup_for_round(round_id, first, None).await.unwrap();
    let b = h.system.signups.signup_for_round(round_id, second, None).await.unwrap();

    let confirmed = h.system.signups.confirm_signup_manually(a.id).await.unwrap();
    assert_eq!(confirmed.status, SignupStatus::Confirmed);

    let err = h.system.signups.confirm_signup_manually(b.id).await.unwrap_err();
    assert!(matches!(err, AllocationError::Conflict(_)));

    let err = h.system.signups.confirm_signup_manually(a.id).await.unwrap_err();
    assert!(matches!(err, AllocationError::InvalidState(_)));
    h.shutdown().await;
}

#[tokio::test]
async fn test_concurrent_signups_keep_round_consistent() {
    let h = Harness::start().await;
    let round_id = h.round(3, Duration::days(3), None).await;

    let mut users = Vec::new();
    for i in 0..10 {
        users.push(h.user_with(&format!("Vol{}", i), Some(Capability::TeamLead)).await);
    }

    // Everyone also tries for the single lead seat.
    let mut tasks = Vec::new();
    for user in users.iter().copied() {
        let signups = h.system.signups.clone();
        tasks.push(tokio::spawn(async move {
            signups
                .signup_for_round(round_id, user, Some(SignupRole::TeamLead))
                .await
        }));
    }
    let mut leads = 0;
    for task in tasks {
        if task.await.unwrap().is_ok() {
            leads += 1;
        }
    }
    assert_eq!(leads, 1);

    let round = h.system.rounds.fetch(round_id).await.unwrap();
    let lead = round.signups.values().find(|s| s.role == SignupRole::TeamLead).unwrap().user_id;

    let mut tasks = Vec::new();
    for user in users.iter().copied().filter(|u| *u != lead) {
        let signups = h.system.signups.clone();
        tasks.push(tokio::spawn(async move {
            signups.signup_for_round(round_id, user, None).await
        }));
    }
    for task in tasks {
        task.await.unwrap().expect("Volunteer signup failed");
    }

    let lottery = h.system.lottery.clone();
    let (x, y) = tokio::join!(
        lottery.run_lottery_for_round(round_id),
        h.system.lottery.run_lottery_for_round(round_id)
    );
    assert_eq!(x.unwrap().len() + y.unwrap().len(), 3);

    let round = h.system.rounds.fetch(round_id).await.unwrap();
    assert_eq!(round.confirmed_volunteer_count(), 3);
    assert_eq!(round.waitlist().len(), 6);
    for user in &users {
        let count = round
            .signups
            .values()
            .filter(|s| s.user_id == *user && s.is_active())
            .count();
        assert_eq!(count, 1, "{} should hold exactly one signup", user);
    }
    h.shutdown().await;
}

#[tokio::test]
async fn test_round_cancellation_notifies_everyone_signed_up() {
    let h = Harness::start().await;
    let round_id = h.round(2, Duration::days(3), None).await;
    for name in ["Nia", "Oli", "Pia"] {
        let user = h.volunteer(name).await;
        h.system.signups.signup_for_round(round_id, user, None).await.unwrap();
    }

    let volunteer = h.volunteer("Rex").await;
    let err = h.system.scheduler.cancel_round(volunteer, round_id).await.unwrap_err();
    assert!(matches!(err, AllocationError::Unauthorized(_)));

    let affected = h.system.scheduler.cancel_round(h.staff, round_id).await.unwrap();
    assert_eq!(affected.len(), 3);
    assert_eq!(h.sink.wait_for(NotificationKind::RoundCanceled, 3).await, 3);

    let round = h.system.rounds.get(round_id).await.unwrap().unwrap();
    assert!(round.signups.values().all(|s| s.status == SignupStatus::Canceled));

    let late = h.volunteer("Sol").await;
    let err = h.system.signups.signup_for_round(round_id, late, None).await.unwrap_err();
    assert!(matches!(err, AllocationError::InvalidState(_)));

    let delivered = h.sink.delivered();
    assert!(delivered.iter().any(|(to, _)| to == "nia@example.org"));
    h.shutdown().await;
}
