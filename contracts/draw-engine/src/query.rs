use cosmwasm_std::{to_json_binary, Binary, Deps, Env, Order, StdError, StdResult};
use cw_storage_plus::Bound;
use sweepstakes_common::types::DrawKind;

use crate::lifecycle::{is_locked, resolve_status, seconds_until};
use crate::msg::{DrawStatusResponse, DrawSummary, EntriesResponse, WinnerHistoryEntry};
use crate::selector;
use crate::state::{
    BENEFIT_EVENTS, CONFIG, DRAWS, ENGINE_STATE, ENTRIES, UNROUTED_EVENTS, USER_WIN_COUNT, WINNERS,
};

pub fn query_config(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config)
}

pub fn query_engine_state(deps: Deps) -> StdResult<Binary> {
    let state = ENGINE_STATE.load(deps.storage)?;
    to_json_binary(&state)
}

pub fn query_draw(deps: Deps, draw_id: u64) -> StdResult<Binary> {
    let draw = DRAWS.load(deps.storage, draw_id)?;
    to_json_binary(&draw)
}

pub fn query_draw_status(deps: Deps, env: Env, draw_id: u64) -> StdResult<Binary> {
    let draw = DRAWS.load(deps.storage, draw_id)?;
    let now = env.block.time;
    let effective = resolve_status(&draw, now);
    to_json_binary(&DrawStatusResponse {
        draw_id,
        persisted_status: draw.status.clone(),
        effective_status: effective,
        locked: is_locked(&draw, now),
        cycle: draw.cycle,
        total_entries: draw.total_entries,
        seconds_until_activation: seconds_until(now, draw.activation_at),
        seconds_until_freeze: seconds_until(now, draw.freeze_entries_at),
        seconds_until_draw: seconds_until(now, draw.draw_at),
    })
}

pub fn query_display_draw(deps: Deps, env: Env, kind: DrawKind) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    let now = env.block.time;
    let summary =
        selector::display_draw(deps.storage, &kind, now, config.default_gap_grace_seconds).map(
            |draw| {
                let effective_status = resolve_status(&draw, now);
                DrawSummary {
                    draw,
                    effective_status,
                }
            },
        );
    to_json_binary(&summary)
}

pub fn query_entry_target(deps: Deps, env: Env, kind: DrawKind) -> StdResult<Binary> {
    let now = env.block.time;
    let draw = selector::entry_target(deps.storage, &kind, now).ok_or_else(|| {
        StdError::generic_err(format!(
            "no active or queued {} draw available",
            kind.as_str()
        ))
    })?;
    let effective_status = resolve_status(&draw, now);
    to_json_binary(&DrawSummary {
        draw,
        effective_status,
    })
}

pub fn query_draws(
    deps: Deps,
    env: Env,
    kind: Option<DrawKind>,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(20).min(100) as usize;
    let start = start_after.map(Bound::exclusive);
    let now = env.block.time;

    let draws: Vec<DrawSummary> = DRAWS
        .range(deps.storage, start, None, Order::Ascending)
        .filter_map(|r| r.ok())
        .map(|(_, draw)| draw)
        .filter(|draw| kind.as_ref().map(|k| &draw.kind == k).unwrap_or(true))
        .take(limit)
        .map(|draw| {
            let effective_status = resolve_status(&draw, now);
            DrawSummary {
                draw,
                effective_status,
            }
        })
        .collect();

    to_json_binary(&draws)
}

pub fn query_entries(
    deps: Deps,
    draw_id: u64,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let draw = DRAWS.load(deps.storage, draw_id)?;
    let limit = limit.unwrap_or(20).min(100) as usize;
    let start_addr = start_after
        .map(|s| deps.api.addr_validate(&s))
        .transpose()?;
    let start = start_addr.as_ref().map(Bound::exclusive);

    let entries = ENTRIES
        .prefix(draw_id)
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .filter_map(|r| r.ok())
        .map(|(_, aggregate)| aggregate)
        .collect();

    to_json_binary(&EntriesResponse {
        draw_id,
        total_entries: draw.total_entries,
        entries,
    })
}

pub fn query_user_entries(deps: Deps, draw_id: u64, address: String) -> StdResult<Binary> {
    let addr = deps.api.addr_validate(&address)?;
    let aggregate = ENTRIES.may_load(deps.storage, (draw_id, &addr))?;
    to_json_binary(&aggregate)
}

pub fn query_winner(deps: Deps, draw_id: u64) -> StdResult<Binary> {
    let draw = DRAWS.load(deps.storage, draw_id)?;
    to_json_binary(&draw.winner)
}

pub fn query_winner_history(
    deps: Deps,
    draw_id: u64,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(20).min(100) as usize;
    let start = start_after.map(Bound::exclusive);

    let history: Vec<WinnerHistoryEntry> = WINNERS
        .prefix(draw_id)
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .filter_map(|r| r.ok())
        .map(|(cycle, winner)| WinnerHistoryEntry { cycle, winner })
        .collect();

    to_json_binary(&history)
}

pub fn query_user_win_count(deps: Deps, address: String) -> StdResult<Binary> {
    let addr = deps.api.addr_validate(&address)?;
    let count = USER_WIN_COUNT.may_load(deps.storage, &addr)?.unwrap_or(0);
    to_json_binary(&count)
}

pub fn query_unrouted_events(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(20).min(100) as usize;
    let start = start_after.map(Bound::exclusive);

    let events: Vec<_> = UNROUTED_EVENTS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .filter_map(|r| r.ok())
        .map(|(_, event)| event)
        .collect();

    to_json_binary(&events)
}

pub fn query_benefit_event(
    deps: Deps,
    event_type: String,
    payment_intent_id: String,
) -> StdResult<Binary> {
    let event =
        BENEFIT_EVENTS.may_load(deps.storage, (event_type.as_str(), payment_intent_id.as_str()))?;
    to_json_binary(&event)
}
