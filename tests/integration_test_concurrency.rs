mod common;

use common::{tomorrow_at, TestApp, USER};
use std::sync::Arc;
use tokio::task::JoinSet;
use venue_booking::domain::models::order::OrderState;
use venue_booking::domain::models::page::PageRequest;
use venue_booking::error::AppError;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submits_for_same_slot_admit_exactly_one() {
    let app = TestApp::new().await;
    app.seed_venue("Court A", 50, "08:00", "22:00").await;

    let mut tasks = JoinSet::new();
    for i in 0..10 {
        let scheduler = Arc::clone(&app.state.scheduler);
        tasks.spawn(async move {
            scheduler.submit("Court A", tomorrow_at(10), 2, &format!("user-{}", i)).await
        });
    }

    let mut admitted = 0;
    let mut conflicts = 0;
    while let Some(result) = tasks.join_next().await {
        match result.unwrap() {
            Ok(_) => admitted += 1,
            Err(AppError::Conflict(msg)) => {
                assert_eq!(msg, "Time slot already booked");
                conflicts += 1;
            }
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(admitted, 1);
    assert_eq!(conflicts, 9);

    let pending = app.state.scheduler.find_no_audit_order(PageRequest::new(1, 100)).await.unwrap();
    assert_eq!(pending.total, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_overlapping_submits_never_double_book() {
    let app = TestApp::new().await;
    app.seed_venue("Court A", 50, "08:00", "22:00").await;

    // Every request overlaps 12:00-13:00, so at most one of them can be admitted.
    let mut tasks = JoinSet::new();
    for (i, (hour, hours)) in [(10, 3), (11, 2), (12, 1), (12, 2), (9, 4), (11, 3)].into_iter().enumerate() {
        let scheduler = Arc::clone(&app.state.scheduler);
        tasks.spawn(async move {
            scheduler.submit("Court A", tomorrow_at(hour), hours, &format!("user-{}", i)).await
        });
    }

    let mut admitted = 0;
    while let Some(result) = tasks.join_next().await {
        if result.unwrap().is_ok() {
            admitted += 1;
        }
    }
    assert_eq!(admitted, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_confirm_and_reject_have_one_winner() {
    let app = TestApp::new().await;
    app.seed_venue("Court A", 50, "08:00", "22:00").await;
    let order = app.state.scheduler.submit("Court A", tomorrow_at(10), 2, USER).await.unwrap();

    let mut tasks = JoinSet::new();
    for i in 0..8 {
        let scheduler = Arc::clone(&app.state.scheduler);
        let id = order.id;
        tasks.spawn(async move {
            let result = if i % 2 == 0 {
                scheduler.confirm_order(id).await
            } else {
                scheduler.reject_order(id).await
            };
            (i % 2 == 0, result)
        });
    }

    let mut winners = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (confirming, result) = joined.unwrap();
        match result {
            Ok(()) => winners.push(confirming),
            Err(err) => assert!(err.is_conflict(), "unexpected error: {:?}", err),
        }
    }

    assert_eq!(winners.len(), 1);
    let expected = if winners[0] { OrderState::Approved } else { OrderState::Rejected };
    let stored = app.state.scheduler.find_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(stored.state, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_different_venues_book_in_parallel() {
    let app = TestApp::new().await;
    for name in ["A", "B", "C", "D"] {
        app.seed_venue(name, 10, "08:00", "22:00").await;
    }

    let mut tasks = JoinSet::new();
    for name in ["A", "B", "C", "D"] {
        let scheduler = Arc::clone(&app.state.scheduler);
        tasks.spawn(async move { scheduler.submit(name, tomorrow_at(10), 2, USER).await });
    }

    while let Some(result) = tasks.join_next().await {
        result.unwrap().unwrap();
    }
}
