use cosmwasm_std::{
    Addr, DepsMut, Env, Event, MessageInfo, Order, Response, StdError, StdResult, Storage,
    Timestamp,
};
use sweepstakes_common::selection::{derive_randomness, locate_ticket, winning_ticket};
use sweepstakes_common::types::{
    DrawKind, DrawStatus, EntryBreakdown, EntrySource, SelectionMethod,
};

use crate::error::ContractError;
use crate::lifecycle::{is_locked, resolve_status};
use crate::msg::{AwardEntriesParams, CreateDrawParams, UpdateDrawParams, WinnerSelection};
use crate::selector;
use crate::state::{
    BenefitEvent, Draw, EngineConfig, EntryAggregate, UnroutedEvent, WinnerRecord, BENEFIT_EVENTS,
    CONFIG, DRAWS, ENGINE_STATE, ENTRIES, ENTRY_SEQ, NEXT_UNROUTED_ID, UNROUTED_EVENTS,
    USER_WIN_COUNT, WINNERS,
};

const MIN_FREEZE_LEAD_SECS: u64 = 60;
const MAX_FREEZE_LEAD_SECS: u64 = 86_400;
/// 7 days
const MAX_GAP_GRACE_SECS: u64 = 604_800;

pub fn validate_freeze_lead(seconds: u64) -> Result<(), ContractError> {
    if !(MIN_FREEZE_LEAD_SECS..=MAX_FREEZE_LEAD_SECS).contains(&seconds) {
        return Err(ContractError::InvalidConfigValue {
            field: "freeze_lead_seconds".to_string(),
            value: seconds,
        });
    }
    Ok(())
}

pub fn validate_gap_grace(seconds: u64) -> Result<(), ContractError> {
    if seconds > MAX_GAP_GRACE_SECS {
        return Err(ContractError::InvalidConfigValue {
            field: "gap_grace_seconds".to_string(),
            value: seconds,
        });
    }
    Ok(())
}

fn ensure_admin(config: &EngineConfig, sender: &Addr, action: &str) -> Result<(), ContractError> {
    if sender != &config.admin {
        return Err(ContractError::Unauthorized {
            reason: format!("only admin can {}", action),
        });
    }
    Ok(())
}

/// Operator endpoints also accept the admin.
fn ensure_operator(
    config: &EngineConfig,
    sender: &Addr,
    action: &str,
) -> Result<(), ContractError> {
    if sender != &config.operator && sender != &config.admin {
        return Err(ContractError::Unauthorized {
            reason: format!("only operator can {}", action),
        });
    }
    Ok(())
}

fn validate_schedule(
    activation_at: Timestamp,
    freeze_entries_at: Timestamp,
    draw_at: Timestamp,
) -> Result<(), ContractError> {
    if activation_at >= freeze_entries_at {
        return Err(ContractError::InvalidSchedule {
            reason: "activation_at must precede freeze_entries_at".to_string(),
        });
    }
    if freeze_entries_at > draw_at {
        return Err(ContractError::InvalidSchedule {
            reason: "freeze_entries_at must not follow draw_at".to_string(),
        });
    }
    Ok(())
}

/// An omitted freeze instant defaults to the configured lead before draw_at.
fn resolve_freeze(
    explicit: Option<Timestamp>,
    draw_at: Timestamp,
    lead_seconds: u64,
) -> Result<Timestamp, ContractError> {
    match explicit {
        Some(t) => Ok(t),
        None => {
            if draw_at.seconds() <= lead_seconds {
                return Err(ContractError::InvalidSchedule {
                    reason: "draw_at too early to derive freeze_entries_at".to_string(),
                });
            }
            Ok(draw_at.minus_seconds(lead_seconds))
        }
    }
}

/// Create a draw. Admin only.
pub fn create_draw(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    params: CreateDrawParams,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info.sender, "create draws")?;

    let CreateDrawParams {
        kind,
        name,
        description,
        prize,
        activation_at,
        freeze_entries_at,
        draw_at,
        min_entries,
        gap_grace_seconds,
    } = params;

    let now = env.block.time;
    if draw_at <= now {
        return Err(ContractError::InvalidSchedule {
            reason: "draw_at must be in the future".to_string(),
        });
    }
    let freeze_entries_at = resolve_freeze(freeze_entries_at, draw_at, config.freeze_lead_seconds)?;
    if freeze_entries_at <= now {
        return Err(ContractError::InvalidSchedule {
            reason: "freeze_entries_at must be in the future".to_string(),
        });
    }
    validate_schedule(activation_at, freeze_entries_at, draw_at)?;
    if let Some(grace) = gap_grace_seconds {
        validate_gap_grace(grace)?;
    }

    let mut engine = ENGINE_STATE.load(deps.storage)?;
    let draw_id = engine.next_draw_id;
    engine.next_draw_id += 1;
    ENGINE_STATE.save(deps.storage, &engine)?;

    let status = if now < activation_at {
        DrawStatus::Queued
    } else {
        DrawStatus::Active
    };

    let draw = Draw {
        id: draw_id,
        kind: kind.clone(),
        name: name.clone(),
        description,
        prize,
        activation_at,
        freeze_entries_at,
        draw_at,
        status: status.clone(),
        is_active: status == DrawStatus::Active,
        configuration_locked: false,
        locked_at: None,
        total_entries: 0,
        num_entrants: 0,
        winner: None,
        cycle: 1,
        min_entries,
        gap_grace_seconds,
        created_at: now,
        cancelled_at: None,
    };
    DRAWS.save(deps.storage, draw_id, &draw)?;

    Ok(Response::new()
        .add_attribute("action", "create_draw")
        .add_attribute("draw_id", draw_id.to_string())
        .add_event(
            Event::new("sweep_draw_created")
                .add_attribute("draw_id", draw_id.to_string())
                .add_attribute("kind", kind.as_str())
                .add_attribute("name", name)
                .add_attribute("status", status.as_str())
                .add_attribute("activation_at", activation_at.seconds().to_string())
                .add_attribute("freeze_entries_at", freeze_entries_at.seconds().to_string())
                .add_attribute("draw_at", draw_at.seconds().to_string()),
        ))
}

/// Patch an unlocked draw's configuration. Admin only.
pub fn update_draw(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    params: UpdateDrawParams,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info.sender, "update draws")?;

    let UpdateDrawParams {
        draw_id,
        name,
        description,
        prize,
        activation_at,
        freeze_entries_at,
        draw_at,
        min_entries,
        gap_grace_seconds,
    } = params;

    let mut draw = DRAWS
        .may_load(deps.storage, draw_id)?
        .ok_or(ContractError::DrawNotFound { draw_id })?;

    let now = env.block.time;
    if is_locked(&draw, now) {
        return Err(ContractError::ConfigurationLocked { draw_id });
    }

    if let Some(name) = name {
        draw.name = name;
    }
    if let Some(description) = description {
        draw.description = description;
    }
    if let Some(prize) = prize {
        draw.prize = prize;
    }
    if let Some(min) = min_entries {
        draw.min_entries = Some(min);
    }
    if let Some(grace) = gap_grace_seconds {
        validate_gap_grace(grace)?;
        draw.gap_grace_seconds = Some(grace);
    }

    if activation_at.is_some() || freeze_entries_at.is_some() || draw_at.is_some() {
        let new_activation = activation_at.unwrap_or(draw.activation_at);
        let new_freeze = freeze_entries_at.unwrap_or(draw.freeze_entries_at);
        let new_draw_at = draw_at.unwrap_or(draw.draw_at);
        validate_schedule(new_activation, new_freeze, new_draw_at)?;
        draw.activation_at = new_activation;
        draw.freeze_entries_at = new_freeze;
        draw.draw_at = new_draw_at;
    }

    DRAWS.save(deps.storage, draw_id, &draw)?;

    Ok(Response::new()
        .add_attribute("action", "update_draw")
        .add_attribute("draw_id", draw_id.to_string())
        .add_event(Event::new("sweep_draw_updated").add_attribute("draw_id", draw_id.to_string())))
}

/// One-way configuration lock. Admin only.
pub fn lock_configuration(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    draw_id: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info.sender, "lock draw configuration")?;

    let mut draw = DRAWS
        .may_load(deps.storage, draw_id)?
        .ok_or(ContractError::DrawNotFound { draw_id })?;

    if draw.configuration_locked {
        return Err(ContractError::ConfigurationLocked { draw_id });
    }

    draw.configuration_locked = true;
    draw.locked_at = Some(env.block.time);
    DRAWS.save(deps.storage, draw_id, &draw)?;

    Ok(Response::new()
        .add_attribute("action", "lock_configuration")
        .add_attribute("draw_id", draw_id.to_string())
        .add_event(
            Event::new("sweep_draw_locked")
                .add_attribute("draw_id", draw_id.to_string())
                .add_attribute("locked_at", env.block.time.seconds().to_string()),
        ))
}

/// Cancel a draw at any point before completion. Admin only.
pub fn cancel_draw(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    draw_id: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info.sender, "cancel draws")?;

    let mut draw = DRAWS
        .may_load(deps.storage, draw_id)?
        .ok_or(ContractError::DrawNotFound { draw_id })?;

    let now = env.block.time;
    let effective = resolve_status(&draw, now);
    if effective.is_terminal() {
        return Err(ContractError::DrawLocked {
            draw_id,
            status: effective.as_str().to_string(),
        });
    }

    draw.status = DrawStatus::Cancelled;
    draw.is_active = false;
    draw.cancelled_at = Some(now);
    DRAWS.save(deps.storage, draw_id, &draw)?;

    Ok(Response::new()
        .add_attribute("action", "cancel_draw")
        .add_attribute("draw_id", draw_id.to_string())
        .add_event(
            Event::new("sweep_draw_cancelled")
                .add_attribute("draw_id", draw_id.to_string())
                .add_attribute("cancelled_at", now.seconds().to_string()),
        ))
}

/// Atomic upsert-and-increment of a user's aggregate on one draw.
/// Returns whether this was the user's first contribution.
fn credit_entries(
    storage: &mut dyn Storage,
    now: Timestamp,
    draw: &mut Draw,
    user: &Addr,
    source: &EntrySource,
    count: u64,
) -> Result<bool, ContractError> {
    let next_seq = ENTRY_SEQ.may_load(storage, draw.id)?.unwrap_or(0);
    let mut created = false;
    ENTRIES.update(
        storage,
        (draw.id, user),
        |existing| -> StdResult<EntryAggregate> {
            match existing {
                Some(mut aggregate) => {
                    aggregate.total_entries += count;
                    aggregate.by_source.add(source, count);
                    aggregate.last_updated_at = now;
                    Ok(aggregate)
                }
                None => {
                    created = true;
                    let mut by_source = EntryBreakdown::default();
                    by_source.add(source, count);
                    Ok(EntryAggregate {
                        user: user.clone(),
                        seq: next_seq,
                        total_entries: count,
                        by_source,
                        first_added_at: now,
                        last_updated_at: now,
                    })
                }
            }
        },
    )?;
    if created {
        ENTRY_SEQ.save(storage, draw.id, &(next_seq + 1))?;
        draw.num_entrants += 1;
    }
    draw.total_entries += count;
    Ok(created)
}

/// Park a paid award that found no draw; the operator replays the queue
/// once a draw exists. A paid purchase's entries are never silently
/// dropped.
fn queue_unrouted(
    deps: DepsMut,
    now: Timestamp,
    user: Addr,
    kind: DrawKind,
    source: EntrySource,
    count: u64,
    idempotency: (String, String),
) -> Result<Response, ContractError> {
    let id = NEXT_UNROUTED_ID.load(deps.storage)?;
    NEXT_UNROUTED_ID.save(deps.storage, &(id + 1))?;

    let (event_type, payment_intent_id) = idempotency;
    UNROUTED_EVENTS.save(
        deps.storage,
        id,
        &UnroutedEvent {
            id,
            user: user.clone(),
            kind: kind.clone(),
            source: source.clone(),
            count,
            event_type: event_type.clone(),
            payment_intent_id: payment_intent_id.clone(),
            received_at: now,
        },
    )?;

    // The idempotency ledger still records the benefit so a retried payment
    // webhook cannot queue the same purchase twice.
    BENEFIT_EVENTS.save(
        deps.storage,
        (event_type.as_str(), payment_intent_id.as_str()),
        &BenefitEvent {
            event_type: event_type.clone(),
            payment_intent_id: payment_intent_id.clone(),
            user: user.clone(),
            draw_id: None,
            source: source.clone(),
            count,
            granted_at: now,
        },
    )?;

    Ok(Response::new()
        .add_attribute("action", "award_entries")
        .add_attribute("routed", "false")
        .add_attribute("unrouted_id", id.to_string())
        .add_event(
            Event::new("sweep_entries_unrouted")
                .add_attribute("unrouted_id", id.to_string())
                .add_attribute("user", user.to_string())
                .add_attribute("kind", kind.as_str())
                .add_attribute("source", source.as_str())
                .add_attribute("count", count.to_string()),
        ))
}

/// Credit entries to a user. Operator only.
///
/// The target draw is either explicit or routed through the entry-target
/// selector; during the gap between draws the selector routes to the next
/// queued draw.
pub fn award_entries(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    params: AwardEntriesParams,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_operator(&config, &info.sender, "award entries")?;

    let AwardEntriesParams {
        user,
        source,
        count,
        draw_id,
        kind,
        event_type,
        payment_intent_id,
    } = params;

    if count == 0 {
        return Err(ContractError::InvalidEntryCount { count });
    }

    let idempotency = match (event_type, payment_intent_id) {
        (Some(et), Some(pid)) => Some((et, pid)),
        (None, None) => None,
        _ => {
            return Err(StdError::generic_err(
                "event_type and payment_intent_id must be provided together",
            )
            .into())
        }
    };
    if let Some((et, pid)) = &idempotency {
        if BENEFIT_EVENTS.has(deps.storage, (et.as_str(), pid.as_str())) {
            return Err(ContractError::BenefitAlreadyGranted {
                event_type: et.clone(),
                payment_intent_id: pid.clone(),
            });
        }
    }

    let user_addr = deps.api.addr_validate(&user)?;
    let now = env.block.time;
    let routing_kind = kind.unwrap_or(DrawKind::Major);

    let mut draw = match draw_id {
        Some(id) => DRAWS
            .may_load(deps.storage, id)?
            .ok_or(ContractError::DrawNotFound { draw_id: id })?,
        None => match selector::entry_target(deps.storage, &routing_kind, now) {
            Some(draw) => draw,
            // Purchase-driven awards (keyed) are parked for reconciliation;
            // a manual grant has nothing to reconcile and fails fast.
            None => {
                return match idempotency {
                    Some(key) => {
                        queue_unrouted(deps, now, user_addr, routing_kind, source, count, key)
                    }
                    None => Err(ContractError::NoAvailableDraw {
                        kind: routing_kind.as_str().to_string(),
                    }),
                }
            }
        },
    };

    let effective = resolve_status(&draw, now);
    if !matches!(effective, DrawStatus::Queued | DrawStatus::Active) {
        return Err(ContractError::DrawLocked {
            draw_id: draw.id,
            status: effective.as_str().to_string(),
        });
    }

    let new_entrant = credit_entries(deps.storage, now, &mut draw, &user_addr, &source, count)?;
    DRAWS.save(deps.storage, draw.id, &draw)?;

    let mut engine = ENGINE_STATE.load(deps.storage)?;
    engine.total_entries_awarded += count;
    ENGINE_STATE.save(deps.storage, &engine)?;

    if let Some((et, pid)) = &idempotency {
        BENEFIT_EVENTS.save(
            deps.storage,
            (et.as_str(), pid.as_str()),
            &BenefitEvent {
                event_type: et.clone(),
                payment_intent_id: pid.clone(),
                user: user_addr.clone(),
                draw_id: Some(draw.id),
                source: source.clone(),
                count,
                granted_at: now,
            },
        )?;
    }

    Ok(Response::new()
        .add_attribute("action", "award_entries")
        .add_attribute("draw_id", draw.id.to_string())
        .add_attribute("user", user_addr.to_string())
        .add_attribute("count", count.to_string())
        .add_event(
            Event::new("sweep_entries_awarded")
                .add_attribute("draw_id", draw.id.to_string())
                .add_attribute("cycle", draw.cycle.to_string())
                .add_attribute("user", user_addr.to_string())
                .add_attribute("source", source.as_str())
                .add_attribute("count", count.to_string())
                .add_attribute("total_entries", draw.total_entries.to_string())
                .add_attribute("new_entrant", new_entrant.to_string()),
        ))
}

/// Pick the winner of a completed draw, weighted by entry count. Admin or
/// operator.
///
/// The winner write and the absent-winner check commit in one transaction,
/// so concurrent selection attempts cannot both succeed.
pub fn select_winner(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    draw_id: u64,
    selection: WinnerSelection,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_operator(&config, &info.sender, "select winners")?;

    let mut draw = DRAWS
        .may_load(deps.storage, draw_id)?
        .ok_or(ContractError::DrawNotFound { draw_id })?;

    if draw.winner.is_some() {
        return Err(ContractError::WinnerAlreadySelected { draw_id });
    }

    let now = env.block.time;
    let effective = resolve_status(&draw, now);
    if effective != DrawStatus::Completed {
        return Err(ContractError::DrawNotCompleted {
            draw_id,
            status: effective.as_str().to_string(),
        });
    }
    if draw.total_entries == 0 {
        return Err(ContractError::NoEntries { draw_id });
    }

    let mut aggregates: Vec<EntryAggregate> = ENTRIES
        .prefix(draw_id)
        .range(deps.storage, None, None, Order::Ascending)
        .filter_map(|r| r.ok())
        .map(|(_, aggregate)| aggregate)
        .collect();
    if aggregates.is_empty() {
        return Err(ContractError::NoEntries { draw_id });
    }
    // The virtual ticket sequence walks aggregates in insertion order.
    aggregates.sort_by_key(|aggregate| aggregate.seq);

    let (ticket, method) = match selection {
        WinnerSelection::Seeded { seed_hex } => {
            let seed = hex::decode(&seed_hex).map_err(|_| ContractError::InvalidSeed {
                reason: "not valid hex".to_string(),
            })?;
            if seed.is_empty() {
                return Err(ContractError::InvalidSeed {
                    reason: "seed must not be empty".to_string(),
                });
            }
            let randomness = derive_randomness(&seed, draw.id, draw.cycle, draw.total_entries);
            (
                winning_ticket(&randomness, draw.total_entries),
                SelectionMethod::Seeded,
            )
        }
        WinnerSelection::Manual { entry_number } => {
            if entry_number == 0 || entry_number > draw.total_entries {
                return Err(ContractError::EntryNumberOutOfRange {
                    entry_number,
                    total_entries: draw.total_entries,
                });
            }
            (entry_number - 1, SelectionMethod::Manual)
        }
    };

    let weights: Vec<u64> = aggregates.iter().map(|a| a.total_entries).collect();
    let winner_idx = locate_ticket(&weights, ticket)
        .ok_or_else(|| StdError::generic_err("cached total_entries exceeds ledger sum"))?;
    let winner_user = aggregates[winner_idx].user.clone();

    let record = WinnerRecord {
        user: winner_user.clone(),
        entry_number: ticket + 1,
        selected_at: now,
        notified: false,
        method: method.clone(),
        selected_by: info.sender.clone(),
    };

    draw.winner = Some(record.clone());
    draw.status = DrawStatus::Completed;
    draw.is_active = false;
    DRAWS.save(deps.storage, draw_id, &draw)?;

    WINNERS.save(deps.storage, (draw_id, draw.cycle), &record)?;
    let wins = USER_WIN_COUNT
        .may_load(deps.storage, &winner_user)?
        .unwrap_or(0);
    USER_WIN_COUNT.save(deps.storage, &winner_user, &(wins + 1))?;

    let mut engine = ENGINE_STATE.load(deps.storage)?;
    engine.total_draws_completed += 1;
    ENGINE_STATE.save(deps.storage, &engine)?;

    // Notification boundary: the notifier listens for this event; the
    // engine itself sends nothing.
    Ok(Response::new()
        .add_attribute("action", "select_winner")
        .add_attribute("draw_id", draw_id.to_string())
        .add_attribute("winner", winner_user.to_string())
        .add_event(
            Event::new("sweep_winner_selected")
                .add_attribute("draw_id", draw_id.to_string())
                .add_attribute("cycle", draw.cycle.to_string())
                .add_attribute("winner", winner_user.to_string())
                .add_attribute("entry_number", (ticket + 1).to_string())
                .add_attribute("total_entries", draw.total_entries.to_string())
                .add_attribute("num_entrants", draw.num_entrants.to_string())
                .add_attribute("method", method.as_str())
                .add_attribute("selected_by", info.sender.to_string())
                .add_attribute("timestamp", now.seconds().to_string()),
        ))
}

/// Record that the winner has been notified. Operator only.
/// The only mutation a winner record ever receives.
pub fn mark_winner_notified(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    draw_id: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_operator(&config, &info.sender, "mark winners notified")?;

    let mut draw = DRAWS
        .may_load(deps.storage, draw_id)?
        .ok_or(ContractError::DrawNotFound { draw_id })?;

    let winner_user = match draw.winner.as_mut() {
        Some(winner) => {
            winner.notified = true;
            winner.user.clone()
        }
        None => return Err(ContractError::NoWinnerSelected { draw_id }),
    };
    DRAWS.save(deps.storage, draw_id, &draw)?;

    // Mirror into the per-cycle archive.
    if let Some(mut archived) = WINNERS.may_load(deps.storage, (draw_id, draw.cycle))? {
        archived.notified = true;
        WINNERS.save(deps.storage, (draw_id, draw.cycle), &archived)?;
    }

    Ok(Response::new()
        .add_attribute("action", "mark_winner_notified")
        .add_attribute("draw_id", draw_id.to_string())
        .add_event(
            Event::new("sweep_winner_notified")
                .add_attribute("draw_id", draw_id.to_string())
                .add_attribute("winner", winner_user.to_string()),
        ))
}

/// Persist derived statuses for non-terminal draws. Anyone can call.
///
/// The persisted status is only a write-cache: a missed sweep delays
/// nothing but this refresh, reads self-correct.
pub fn sweep_status(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    limit: Option<u32>,
) -> Result<Response, ContractError> {
    let limit = limit.unwrap_or(50).min(100) as usize;
    let now = env.block.time;

    let candidates: Vec<Draw> = DRAWS
        .range(deps.storage, None, None, Order::Ascending)
        .filter_map(|r| r.ok())
        .map(|(_, draw)| draw)
        .filter(|draw| !draw.status.is_terminal())
        .take(limit)
        .collect();

    let mut transitions: u32 = 0;
    let mut events = Vec::new();
    for mut draw in candidates {
        let effective = resolve_status(&draw, now);
        if effective != draw.status {
            let previous = draw.status.clone();
            draw.status = effective.clone();
            draw.is_active = effective == DrawStatus::Active;
            DRAWS.save(deps.storage, draw.id, &draw)?;
            transitions += 1;
            events.push(
                Event::new("sweep_status_transition")
                    .add_attribute("draw_id", draw.id.to_string())
                    .add_attribute("from", previous.as_str())
                    .add_attribute("to", effective.as_str()),
            );
        }
    }

    let mut response = Response::new()
        .add_attribute("action", "sweep_status")
        .add_attribute("transitions", transitions.to_string());
    for event in events {
        response = response.add_event(event);
    }
    Ok(response)
}

/// Start the next cycle of a finished mini draw on the same document.
/// Admin only.
///
/// Major draws never cycle: repeating a major draw means creating a new
/// document, so each period keeps an immutable history record.
pub fn restart_mini_draw(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    draw_id: u64,
    activation_at: Timestamp,
    freeze_entries_at: Option<Timestamp>,
    draw_at: Timestamp,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info.sender, "restart mini draws")?;

    let mut draw = DRAWS
        .may_load(deps.storage, draw_id)?
        .ok_or(ContractError::DrawNotFound { draw_id })?;

    if draw.kind != DrawKind::Mini {
        return Err(ContractError::NotAMiniDraw { draw_id });
    }

    let now = env.block.time;
    let effective = resolve_status(&draw, now);
    if !effective.is_terminal() {
        return Err(ContractError::CycleStillRunning {
            draw_id,
            status: effective.as_str().to_string(),
        });
    }

    if draw_at <= now {
        return Err(ContractError::InvalidSchedule {
            reason: "draw_at must be in the future".to_string(),
        });
    }
    let freeze_entries_at = resolve_freeze(freeze_entries_at, draw_at, config.freeze_lead_seconds)?;
    if freeze_entries_at <= now {
        return Err(ContractError::InvalidSchedule {
            reason: "freeze_entries_at must be in the future".to_string(),
        });
    }
    validate_schedule(activation_at, freeze_entries_at, draw_at)?;

    // Clear the finished cycle's live ledger; the winner archive keeps the
    // historical record.
    let entrants: Vec<Addr> = ENTRIES
        .prefix(draw_id)
        .range(deps.storage, None, None, Order::Ascending)
        .filter_map(|r| r.ok())
        .map(|(addr, _)| addr)
        .collect();
    for addr in &entrants {
        ENTRIES.remove(deps.storage, (draw_id, addr));
    }
    ENTRY_SEQ.remove(deps.storage, draw_id);

    draw.activation_at = activation_at;
    draw.freeze_entries_at = freeze_entries_at;
    draw.draw_at = draw_at;
    draw.total_entries = 0;
    draw.num_entrants = 0;
    draw.winner = None;
    draw.configuration_locked = false;
    draw.locked_at = None;
    draw.cancelled_at = None;
    draw.cycle += 1;
    draw.status = if now < activation_at {
        DrawStatus::Queued
    } else {
        DrawStatus::Active
    };
    draw.is_active = draw.status == DrawStatus::Active;
    DRAWS.save(deps.storage, draw_id, &draw)?;

    Ok(Response::new()
        .add_attribute("action", "restart_mini_draw")
        .add_attribute("draw_id", draw_id.to_string())
        .add_attribute("cycle", draw.cycle.to_string())
        .add_event(
            Event::new("sweep_mini_cycle_restarted")
                .add_attribute("draw_id", draw_id.to_string())
                .add_attribute("cycle", draw.cycle.to_string())
                .add_attribute("activation_at", activation_at.seconds().to_string())
                .add_attribute("freeze_entries_at", freeze_entries_at.seconds().to_string())
                .add_attribute("draw_at", draw_at.seconds().to_string()),
        ))
}

/// Re-route awards that previously found no draw. Operator only.
pub fn replay_unrouted(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    limit: Option<u32>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_operator(&config, &info.sender, "replay unrouted awards")?;

    let limit = limit.unwrap_or(20).min(100) as usize;
    let now = env.block.time;

    let pending: Vec<UnroutedEvent> = UNROUTED_EVENTS
        .range(deps.storage, None, None, Order::Ascending)
        .take(limit)
        .filter_map(|r| r.ok())
        .map(|(_, event)| event)
        .collect();

    let mut replayed: u32 = 0;
    let mut skipped: u32 = 0;
    let mut credited: u64 = 0;
    let mut events = Vec::new();

    for pending_event in pending {
        let Some(mut draw) = selector::entry_target(deps.storage, &pending_event.kind, now) else {
            skipped += 1;
            continue;
        };

        let new_entrant = credit_entries(
            deps.storage,
            now,
            &mut draw,
            &pending_event.user,
            &pending_event.source,
            pending_event.count,
        )?;
        DRAWS.save(deps.storage, draw.id, &draw)?;

        let key = (
            pending_event.event_type.as_str(),
            pending_event.payment_intent_id.as_str(),
        );
        if let Some(mut benefit) = BENEFIT_EVENTS.may_load(deps.storage, key)? {
            benefit.draw_id = Some(draw.id);
            BENEFIT_EVENTS.save(deps.storage, key, &benefit)?;
        }

        UNROUTED_EVENTS.remove(deps.storage, pending_event.id);
        replayed += 1;
        credited += pending_event.count;
        events.push(
            Event::new("sweep_entries_awarded")
                .add_attribute("draw_id", draw.id.to_string())
                .add_attribute("cycle", draw.cycle.to_string())
                .add_attribute("user", pending_event.user.to_string())
                .add_attribute("source", pending_event.source.as_str())
                .add_attribute("count", pending_event.count.to_string())
                .add_attribute("total_entries", draw.total_entries.to_string())
                .add_attribute("new_entrant", new_entrant.to_string())
                .add_attribute("replayed_from", pending_event.id.to_string()),
        );
    }

    if credited > 0 {
        let mut engine = ENGINE_STATE.load(deps.storage)?;
        engine.total_entries_awarded += credited;
        ENGINE_STATE.save(deps.storage, &engine)?;
    }

    let mut response = Response::new()
        .add_attribute("action", "replay_unrouted")
        .add_attribute("replayed", replayed.to_string())
        .add_attribute("skipped", skipped.to_string());
    for event in events {
        response = response.add_event(event);
    }
    Ok(response)
}

/// Update engine configuration. Admin only.
pub fn update_config(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    admin: Option<String>,
    operator: Option<String>,
    freeze_lead_seconds: Option<u64>,
    default_gap_grace_seconds: Option<u64>,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info.sender, "update config")?;

    if let Some(admin) = admin {
        config.admin = deps.api.addr_validate(&admin)?;
    }
    if let Some(operator) = operator {
        config.operator = deps.api.addr_validate(&operator)?;
    }
    if let Some(lead) = freeze_lead_seconds {
        validate_freeze_lead(lead)?;
        config.freeze_lead_seconds = lead;
    }
    if let Some(grace) = default_gap_grace_seconds {
        validate_gap_grace(grace)?;
        config.default_gap_grace_seconds = grace;
    }

    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new().add_attribute("action", "update_config"))
}
