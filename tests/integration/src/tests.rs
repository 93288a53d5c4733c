//! Integration tests for the sweepstakes draw engine.
//!
//! These tests exercise the contract entry points directly using
//! `cosmwasm_std::testing` mocks, driving full flows across create, award,
//! freeze, winner selection, mini-draw cycling, and the unrouted queue.
//!
//! Run:
//! ```bash
//! cargo test -p sweepstakes-integration-tests
//! ```

use cosmwasm_std::testing::{message_info, mock_dependencies, mock_env, MockApi, MockQuerier};
use cosmwasm_std::{from_json, Addr, Env, MemoryStorage, OwnedDeps, Response, Timestamp, Uint128};
use sweepstakes_common::selection::{derive_randomness, locate_ticket, winning_ticket};
use sweepstakes_common::types::{DrawKind, DrawStatus, EntrySource};
use sweepstakes_draw_engine::contract;
use sweepstakes_draw_engine::error::ContractError;
use sweepstakes_draw_engine::msg::{
    DrawStatusResponse, DrawSummary, EntriesResponse, ExecuteMsg, InstantiateMsg, QueryMsg,
    WinnerHistoryEntry, WinnerSelection,
};
use sweepstakes_draw_engine::state::{Prize, UnroutedEvent};

type TestDeps = OwnedDeps<MemoryStorage, MockApi, MockQuerier>;

// ─── Helpers ───

fn env_at(seconds: u64) -> Env {
    let mut env = mock_env();
    env.block.time = Timestamp::from_seconds(seconds);
    env
}

fn setup_engine(deps: &mut TestDeps) {
    let admin = deps.api.addr_make("admin");
    let operator = deps.api.addr_make("operator");
    let msg = InstantiateMsg {
        operator: operator.to_string(),
        freeze_lead_seconds: None,
        default_gap_grace_seconds: None,
    };
    let info = message_info(&admin, &[]);
    contract::instantiate(deps.as_mut(), mock_env(), info, msg).unwrap();
}

fn sample_prize() -> Prize {
    Prize {
        name: "Off-grid camper".to_string(),
        description: "Fully kitted dual-axle camper trailer".to_string(),
        value: Uint128::new(68_000),
        image_urls: vec!["https://cdn.example/camper.jpg".to_string()],
        category: "vehicle".to_string(),
    }
}

fn create_draw(
    deps: &mut TestDeps,
    now: u64,
    kind: DrawKind,
    activation: u64,
    freeze: u64,
    draw_at: u64,
) -> u64 {
    let admin = deps.api.addr_make("admin");
    let info = message_info(&admin, &[]);
    let res = contract::execute(
        deps.as_mut(),
        env_at(now),
        info,
        ExecuteMsg::CreateDraw {
            kind,
            name: "Integration draw".to_string(),
            description: "".to_string(),
            prize: sample_prize(),
            activation_at: Timestamp::from_seconds(activation),
            freeze_entries_at: Some(Timestamp::from_seconds(freeze)),
            draw_at: Timestamp::from_seconds(draw_at),
            min_entries: None,
            gap_grace_seconds: None,
        },
    )
    .unwrap();
    res.attributes
        .iter()
        .find(|a| a.key == "draw_id")
        .unwrap()
        .value
        .parse()
        .unwrap()
}

fn award(
    deps: &mut TestDeps,
    now: u64,
    user: &Addr,
    source: EntrySource,
    count: u64,
) -> Result<Response, ContractError> {
    let operator = deps.api.addr_make("operator");
    let info = message_info(&operator, &[]);
    contract::execute(
        deps.as_mut(),
        env_at(now),
        info,
        ExecuteMsg::AwardEntries {
            user: user.to_string(),
            source,
            count,
            draw_id: None,
            kind: None,
            event_type: None,
            payment_intent_id: None,
        },
    )
}

fn select_winner(
    deps: &mut TestDeps,
    now: u64,
    draw_id: u64,
    selection: WinnerSelection,
) -> Result<Response, ContractError> {
    let admin = deps.api.addr_make("admin");
    let info = message_info(&admin, &[]);
    contract::execute(
        deps.as_mut(),
        env_at(now),
        info,
        ExecuteMsg::SelectWinner { draw_id, selection },
    )
}

fn draw_status(deps: &TestDeps, now: u64, draw_id: u64) -> DrawStatusResponse {
    let res = contract::query(
        deps.as_ref(),
        env_at(now),
        QueryMsg::DrawStatus { draw_id },
    )
    .unwrap();
    from_json(res).unwrap()
}

fn entries(deps: &TestDeps, draw_id: u64) -> EntriesResponse {
    let res = contract::query(
        deps.as_ref(),
        mock_env(),
        QueryMsg::Entries {
            draw_id,
            start_after: None,
            limit: None,
        },
    )
    .unwrap();
    from_json(res).unwrap()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_full_major_draw_lifecycle() {
    // Create a draw, accumulate entries from several users and sources,
    // watch the lifecycle advance, select a winner, notify them.
    let mut deps = mock_dependencies();
    setup_engine(&mut deps);

    let draw_id = create_draw(&mut deps, 1_000, DrawKind::Major, 2_000, 9_000, 10_000);

    // Queued before activation
    let status = draw_status(&deps, 1_500, draw_id);
    assert_eq!(status.effective_status, DrawStatus::Queued);
    assert!(!status.locked);

    // Purchases land while queued and active
    let alice = deps.api.addr_make("alice");
    let bob = deps.api.addr_make("bob");
    let carol = deps.api.addr_make("carol");
    award(&mut deps, 1_800, &alice, EntrySource::Membership, 20).unwrap();
    award(&mut deps, 2_500, &bob, EntrySource::OneTimePackage, 60).unwrap();
    award(&mut deps, 3_000, &carol, EntrySource::Upsell, 15).unwrap();
    award(&mut deps, 3_500, &alice, EntrySource::Upsell, 5).unwrap();

    let listed = entries(&deps, draw_id);
    assert_eq!(listed.total_entries, 100);
    assert_eq!(listed.entries.len(), 3);
    let sum: u64 = listed.entries.iter().map(|a| a.total_entries).sum();
    assert_eq!(sum, listed.total_entries);
    for aggregate in &listed.entries {
        assert_eq!(aggregate.by_source.total(), aggregate.total_entries);
    }

    // The sweep persists the derived transition
    let anyone = deps.api.addr_make("anyone");
    let info = message_info(&anyone, &[]);
    contract::execute(
        deps.as_mut(),
        env_at(9_100),
        info,
        ExecuteMsg::SweepStatus { limit: None },
    )
    .unwrap();
    let status = draw_status(&deps, 9_100, draw_id);
    assert_eq!(status.persisted_status, DrawStatus::Frozen);
    assert!(status.locked);

    // Frozen: a late purchase is rejected even though draw_at is ahead
    let err = award(&mut deps, 9_200, &alice, EntrySource::Membership, 10).unwrap_err();
    assert!(matches!(err, ContractError::NoAvailableDraw { .. }));

    // Winner selection after the draw instant
    let res = select_winner(
        &mut deps,
        10_060,
        draw_id,
        WinnerSelection::Seeded {
            seed_hex: hex::encode(b"broadcast-2026-08-06"),
        },
    )
    .unwrap();
    let event = res
        .events
        .iter()
        .find(|e| e.ty == "sweep_winner_selected")
        .unwrap();
    assert!(event.attributes.iter().any(|a| a.key == "entry_number"));

    // Reproducible from the pure pipeline
    let randomness = derive_randomness(b"broadcast-2026-08-06", draw_id, 1, 100);
    let ticket = winning_ticket(&randomness, 100);
    // Insertion order: alice (20+5), bob (60), carol (15)
    let expected = match locate_ticket(&[25, 60, 15], ticket).unwrap() {
        0 => alice.clone(),
        1 => bob.clone(),
        _ => carol.clone(),
    };
    let res = contract::query(deps.as_ref(), mock_env(), QueryMsg::Winner { draw_id }).unwrap();
    let winner: Option<sweepstakes_draw_engine::state::WinnerRecord> = from_json(res).unwrap();
    let winner = winner.unwrap();
    assert_eq!(winner.user, expected);
    assert_eq!(winner.entry_number, ticket + 1);
    assert!(!winner.notified);

    // Notification flip is the only mutation the record receives
    let operator = deps.api.addr_make("operator");
    let info = message_info(&operator, &[]);
    contract::execute(
        deps.as_mut(),
        env_at(10_120),
        info,
        ExecuteMsg::MarkWinnerNotified { draw_id },
    )
    .unwrap();
    let res = contract::query(deps.as_ref(), mock_env(), QueryMsg::Winner { draw_id }).unwrap();
    let winner: Option<sweepstakes_draw_engine::state::WinnerRecord> = from_json(res).unwrap();
    assert!(winner.unwrap().notified);

    let res = contract::query(
        deps.as_ref(),
        mock_env(),
        QueryMsg::UserWinCount {
            address: expected.to_string(),
        },
    )
    .unwrap();
    let wins: u32 = from_json(res).unwrap();
    assert_eq!(wins, 1);
}

#[test]
fn test_gap_routing_scenario() {
    // Draw A completes at t=10_000; draw B activates hours later. During the
    // gap, entries route to B while the storefront keeps showing A, and
    // after the grace window the storefront moves on to B.
    let mut deps = mock_dependencies();
    setup_engine(&mut deps);

    let draw_a = create_draw(&mut deps, 1_000, DrawKind::Major, 500, 9_000, 10_000);
    let draw_b = create_draw(&mut deps, 1_000, DrawKind::Major, 40_000, 80_000, 86_400);

    let alice = deps.api.addr_make("alice");

    // t=10_000: A just completed, B queued
    let res = contract::query(
        deps.as_ref(),
        env_at(10_000),
        QueryMsg::EntryTarget {
            kind: DrawKind::Major,
        },
    )
    .unwrap();
    let target: DrawSummary = from_json(res).unwrap();
    assert_eq!(target.draw.id, draw_b);

    let res = contract::query(
        deps.as_ref(),
        env_at(10_000),
        QueryMsg::DisplayDraw {
            kind: DrawKind::Major,
        },
    )
    .unwrap();
    let display: Option<DrawSummary> = from_json(res).unwrap();
    let display = display.unwrap();
    assert_eq!(display.draw.id, draw_a);
    assert_eq!(display.effective_status, DrawStatus::Completed);

    // An award during the gap accrues to B
    award(&mut deps, 11_000, &alice, EntrySource::Membership, 5).unwrap();
    let listed = entries(&deps, draw_b);
    assert_eq!(listed.total_entries, 5);
    let listed = entries(&deps, draw_a);
    assert_eq!(listed.total_entries, 0);

    // t=10_000 + 4h grace + 1h: grace elapsed, B still queued
    let res = contract::query(
        deps.as_ref(),
        env_at(10_000 + 14_400 + 3_600),
        QueryMsg::DisplayDraw {
            kind: DrawKind::Major,
        },
    )
    .unwrap();
    let display: Option<DrawSummary> = from_json(res).unwrap();
    assert_eq!(display.unwrap().draw.id, draw_b);

    // t=40_000: B activates, both selectors converge
    let res = contract::query(
        deps.as_ref(),
        env_at(40_000),
        QueryMsg::EntryTarget {
            kind: DrawKind::Major,
        },
    )
    .unwrap();
    let target: DrawSummary = from_json(res).unwrap();
    assert_eq!(target.draw.id, draw_b);
    assert_eq!(target.effective_status, DrawStatus::Active);
}

#[test]
fn test_winner_exclusivity() {
    // A draw gets exactly one winner no matter how many selection attempts
    // land; later attempts observe the already-selected winner.
    let mut deps = mock_dependencies();
    setup_engine(&mut deps);
    let draw_id = create_draw(&mut deps, 1_000, DrawKind::Major, 500, 9_000, 10_000);

    let alice = deps.api.addr_make("alice");
    let bob = deps.api.addr_make("bob");
    award(&mut deps, 2_000, &alice, EntrySource::Membership, 40).unwrap();
    award(&mut deps, 2_100, &bob, EntrySource::Membership, 60).unwrap();

    select_winner(
        &mut deps,
        10_060,
        draw_id,
        WinnerSelection::Seeded {
            seed_hex: hex::encode(b"first-attempt"),
        },
    )
    .unwrap();

    let res = contract::query(deps.as_ref(), mock_env(), QueryMsg::Winner { draw_id }).unwrap();
    let first: Option<sweepstakes_draw_engine::state::WinnerRecord> = from_json(res).unwrap();
    let first = first.unwrap();

    // A retried or concurrent attempt cannot overwrite the record
    let err = select_winner(
        &mut deps,
        10_061,
        draw_id,
        WinnerSelection::Seeded {
            seed_hex: hex::encode(b"second-attempt"),
        },
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::WinnerAlreadySelected { .. }));

    let res = contract::query(deps.as_ref(), mock_env(), QueryMsg::Winner { draw_id }).unwrap();
    let second: Option<sweepstakes_draw_engine::state::WinnerRecord> = from_json(res).unwrap();
    assert_eq!(second.unwrap(), first);
}

#[test]
fn test_weighted_selection_is_exactly_proportional() {
    // Enumerating every ticket of a 10/90 population maps exactly 10 tickets
    // to the first holder and 90 to the second.
    let weights = [10u64, 90];
    let mut counts = [0u64; 2];
    for ticket in 0..100 {
        counts[locate_ticket(&weights, ticket).unwrap()] += 1;
    }
    assert_eq!(counts, [10, 90]);
}

#[test]
fn test_weighted_fairness_statistical() {
    // 100k seeded draws over a 10/90 population: the 10-entry holder wins
    // close to 10% of the time. The band is generous (±1% absolute is >10
    // standard deviations) so this never flakes while still catching a
    // broken weighting.
    let weights = [10u64, 90];
    let total = 100u64;
    let trials = 100_000u64;

    let mut wins_small = 0u64;
    for i in 0..trials {
        let randomness = derive_randomness(&i.to_be_bytes(), 7, 1, total);
        let ticket = winning_ticket(&randomness, total);
        if locate_ticket(&weights, ticket).unwrap() == 0 {
            wins_small += 1;
        }
    }

    assert!(
        (9_000..=11_000).contains(&wins_small),
        "10-entry holder won {} of {} trials, outside the expected ~10% band",
        wins_small,
        trials
    );
}

#[test]
fn test_entry_sum_invariant_after_many_awards() {
    let mut deps = mock_dependencies();
    setup_engine(&mut deps);
    let draw_id = create_draw(&mut deps, 1_000, DrawKind::Major, 500, 90_000, 100_000);

    let users: Vec<Addr> = (0..5)
        .map(|i| deps.api.addr_make(&format!("user{}", i)))
        .collect();

    let mut expected_total = 0u64;
    for round in 0u64..20 {
        let user = &users[(round % 5) as usize];
        let source = EntrySource::ALL[(round % 4) as usize].clone();
        let count = round + 1;
        award(&mut deps, 2_000 + round * 10, user, source, count).unwrap();
        expected_total += count;
    }

    let listed = entries(&deps, draw_id);
    assert_eq!(listed.total_entries, expected_total);
    // One aggregate per user no matter how many awards landed
    assert_eq!(listed.entries.len(), 5);
    let sum: u64 = listed.entries.iter().map(|a| a.total_entries).sum();
    assert_eq!(sum, expected_total);
    for aggregate in &listed.entries {
        assert_eq!(aggregate.by_source.total(), aggregate.total_entries);
    }
}

#[test]
fn test_mini_cycle_flow() {
    // A mini draw completes, restarts on the same document, and runs a
    // fresh second cycle; the first cycle's winner stays archived.
    let mut deps = mock_dependencies();
    setup_engine(&mut deps);
    let draw_id = create_draw(&mut deps, 1_000, DrawKind::Mini, 500, 4_000, 5_000);

    let alice = deps.api.addr_make("alice");
    let bob = deps.api.addr_make("bob");

    let operator = deps.api.addr_make("operator");
    let info = message_info(&operator, &[]);
    contract::execute(
        deps.as_mut(),
        env_at(2_000),
        info,
        ExecuteMsg::AwardEntries {
            user: alice.to_string(),
            source: EntrySource::Membership,
            count: 10,
            draw_id: None,
            kind: Some(DrawKind::Mini),
            event_type: None,
            payment_intent_id: None,
        },
    )
    .unwrap();

    select_winner(
        &mut deps,
        5_060,
        draw_id,
        WinnerSelection::Seeded {
            seed_hex: hex::encode(b"mini-cycle-1"),
        },
    )
    .unwrap();

    let admin = deps.api.addr_make("admin");
    let info = message_info(&admin, &[]);
    contract::execute(
        deps.as_mut(),
        env_at(6_000),
        info,
        ExecuteMsg::RestartMiniDraw {
            draw_id,
            activation_at: Timestamp::from_seconds(7_000),
            freeze_entries_at: Some(Timestamp::from_seconds(12_000)),
            draw_at: Timestamp::from_seconds(13_000),
        },
    )
    .unwrap();

    let status = draw_status(&deps, 6_100, draw_id);
    assert_eq!(status.cycle, 2);
    assert_eq!(status.total_entries, 0);
    assert_eq!(status.effective_status, DrawStatus::Queued);
    assert!(!status.locked);

    // Second cycle runs with its own pool and winner
    let info = message_info(&operator, &[]);
    contract::execute(
        deps.as_mut(),
        env_at(8_000),
        info,
        ExecuteMsg::AwardEntries {
            user: bob.to_string(),
            source: EntrySource::OneTimePackage,
            count: 3,
            draw_id: None,
            kind: Some(DrawKind::Mini),
            event_type: None,
            payment_intent_id: None,
        },
    )
    .unwrap();

    select_winner(
        &mut deps,
        13_060,
        draw_id,
        WinnerSelection::Seeded {
            seed_hex: hex::encode(b"mini-cycle-2"),
        },
    )
    .unwrap();

    let res = contract::query(
        deps.as_ref(),
        mock_env(),
        QueryMsg::WinnerHistory {
            draw_id,
            start_after: None,
            limit: None,
        },
    )
    .unwrap();
    let history: Vec<WinnerHistoryEntry> = from_json(res).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].cycle, 1);
    assert_eq!(history[0].winner.user, alice);
    assert_eq!(history[1].cycle, 2);
    assert_eq!(history[1].winner.user, bob);
}

#[test]
fn test_unrouted_queue_and_replay() {
    // With no draw configured at all, a paid purchase's entries are parked
    // instead of dropped, then replayed once a draw exists.
    let mut deps = mock_dependencies();
    setup_engine(&mut deps);

    let alice = deps.api.addr_make("alice");
    let operator = deps.api.addr_make("operator");

    let info = message_info(&operator, &[]);
    let res = contract::execute(
        deps.as_mut(),
        env_at(1_000),
        info,
        ExecuteMsg::AwardEntries {
            user: alice.to_string(),
            source: EntrySource::Membership,
            count: 12,
            draw_id: None,
            kind: None,
            event_type: Some("subscription_renewal".to_string()),
            payment_intent_id: Some("pi_gap".to_string()),
        },
    )
    .unwrap();
    assert!(res.events.iter().any(|e| e.ty == "sweep_entries_unrouted"));

    let res = contract::query(
        deps.as_ref(),
        mock_env(),
        QueryMsg::UnroutedEvents {
            start_after: None,
            limit: None,
        },
    )
    .unwrap();
    let pending: Vec<UnroutedEvent> = from_json(res).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].user, alice);

    let draw_id = create_draw(&mut deps, 2_000, DrawKind::Major, 2_500, 9_000, 10_000);

    let info = message_info(&operator, &[]);
    contract::execute(
        deps.as_mut(),
        env_at(3_000),
        info,
        ExecuteMsg::ReplayUnrouted { limit: None },
    )
    .unwrap();

    let listed = entries(&deps, draw_id);
    assert_eq!(listed.total_entries, 12);

    let res = contract::query(
        deps.as_ref(),
        mock_env(),
        QueryMsg::UnroutedEvents {
            start_after: None,
            limit: None,
        },
    )
    .unwrap();
    let pending: Vec<UnroutedEvent> = from_json(res).unwrap();
    assert!(pending.is_empty());
}

#[test]
fn test_lock_monotonicity_over_reads() {
    // Once the freeze locks a draw, every later read observes it locked,
    // with or without any persisted write in between.
    let mut deps = mock_dependencies();
    setup_engine(&mut deps);
    let draw_id = create_draw(&mut deps, 1_000, DrawKind::Major, 500, 9_000, 10_000);

    assert!(!draw_status(&deps, 8_999, draw_id).locked);
    for t in [9_000, 9_500, 10_000, 50_000, 1_000_000] {
        assert!(draw_status(&deps, t, draw_id).locked, "unlocked at t={}", t);
    }
}

#[test]
fn test_config_lock_blocks_admin_edits() {
    let mut deps = mock_dependencies();
    setup_engine(&mut deps);
    let draw_id = create_draw(&mut deps, 1_000, DrawKind::Major, 500, 9_000, 10_000);

    let admin = deps.api.addr_make("admin");
    let info = message_info(&admin, &[]);
    contract::execute(
        deps.as_mut(),
        env_at(2_000),
        info,
        ExecuteMsg::LockConfiguration { draw_id },
    )
    .unwrap();

    // Locked long before the freeze instant
    assert!(draw_status(&deps, 2_100, draw_id).locked);

    let info = message_info(&admin, &[]);
    let err = contract::execute(
        deps.as_mut(),
        env_at(2_200),
        info,
        ExecuteMsg::UpdateDraw {
            draw_id,
            name: None,
            description: None,
            prize: Some(sample_prize()),
            activation_at: None,
            freeze_entries_at: None,
            draw_at: None,
            min_entries: None,
            gap_grace_seconds: None,
        },
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::ConfigurationLocked { .. }));
}

#[test]
fn test_seeded_selection_reproducible() {
    // Same population + same seed ⇒ same ticket, across fresh engines.
    let mut ticket_runs = Vec::new();
    for _ in 0..2 {
        let randomness = derive_randomness(b"audit-seed", 3, 2, 555);
        ticket_runs.push(winning_ticket(&randomness, 555));
    }
    assert_eq!(ticket_runs[0], ticket_runs[1]);

    // And a different cycle of the same draw lands elsewhere (with
    // overwhelming probability for this population size)
    let other = derive_randomness(b"audit-seed", 3, 3, 555);
    assert_ne!(derive_randomness(b"audit-seed", 3, 2, 555), other);
}
