use cosmwasm_std::{
    entry_point, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult,
};
use cw2::{get_contract_version, set_contract_version};

use crate::error::ContractError;
use crate::execute;
use crate::msg::{
    AwardEntriesParams, CreateDrawParams, ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg,
    UpdateDrawParams,
};
use crate::query;
use crate::state::{EngineConfig, EngineState, CONFIG, ENGINE_STATE, NEXT_UNROUTED_ID};

const CONTRACT_NAME: &str = "crates.io:sweepstakes-draw-engine";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// 30 minutes
const DEFAULT_FREEZE_LEAD_SECS: u64 = 1_800;
/// 4 hours
const DEFAULT_GAP_GRACE_SECS: u64 = 14_400;

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let freeze_lead_seconds = msg.freeze_lead_seconds.unwrap_or(DEFAULT_FREEZE_LEAD_SECS);
    execute::validate_freeze_lead(freeze_lead_seconds)?;
    let default_gap_grace_seconds = msg
        .default_gap_grace_seconds
        .unwrap_or(DEFAULT_GAP_GRACE_SECS);
    execute::validate_gap_grace(default_gap_grace_seconds)?;

    let config = EngineConfig {
        admin: info.sender.clone(),
        operator: deps.api.addr_validate(&msg.operator)?,
        freeze_lead_seconds,
        default_gap_grace_seconds,
    };
    CONFIG.save(deps.storage, &config)?;

    let engine_state = EngineState {
        next_draw_id: 0,
        total_draws_completed: 0,
        total_entries_awarded: 0,
    };
    ENGINE_STATE.save(deps.storage, &engine_state)?;
    NEXT_UNROUTED_ID.save(deps.storage, &0)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "draw-engine")
        .add_attribute("admin", info.sender.to_string()))
}

#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::CreateDraw {
            kind,
            name,
            description,
            prize,
            activation_at,
            freeze_entries_at,
            draw_at,
            min_entries,
            gap_grace_seconds,
        } => execute::create_draw(
            deps,
            env,
            info,
            CreateDrawParams {
                kind,
                name,
                description,
                prize,
                activation_at,
                freeze_entries_at,
                draw_at,
                min_entries,
                gap_grace_seconds,
            },
        ),
        ExecuteMsg::UpdateDraw {
            draw_id,
            name,
            description,
            prize,
            activation_at,
            freeze_entries_at,
            draw_at,
            min_entries,
            gap_grace_seconds,
        } => execute::update_draw(
            deps,
            env,
            info,
            UpdateDrawParams {
                draw_id,
                name,
                description,
                prize,
                activation_at,
                freeze_entries_at,
                draw_at,
                min_entries,
                gap_grace_seconds,
            },
        ),
        ExecuteMsg::LockConfiguration { draw_id } => {
            execute::lock_configuration(deps, env, info, draw_id)
        }
        ExecuteMsg::CancelDraw { draw_id } => execute::cancel_draw(deps, env, info, draw_id),
        ExecuteMsg::AwardEntries {
            user,
            source,
            count,
            draw_id,
            kind,
            event_type,
            payment_intent_id,
        } => execute::award_entries(
            deps,
            env,
            info,
            AwardEntriesParams {
                user,
                source,
                count,
                draw_id,
                kind,
                event_type,
                payment_intent_id,
            },
        ),
        ExecuteMsg::SelectWinner { draw_id, selection } => {
            execute::select_winner(deps, env, info, draw_id, selection)
        }
        ExecuteMsg::MarkWinnerNotified { draw_id } => {
            execute::mark_winner_notified(deps, env, info, draw_id)
        }
        ExecuteMsg::SweepStatus { limit } => execute::sweep_status(deps, env, info, limit),
        ExecuteMsg::RestartMiniDraw {
            draw_id,
            activation_at,
            freeze_entries_at,
            draw_at,
        } => execute::restart_mini_draw(
            deps,
            env,
            info,
            draw_id,
            activation_at,
            freeze_entries_at,
            draw_at,
        ),
        ExecuteMsg::ReplayUnrouted { limit } => execute::replay_unrouted(deps, env, info, limit),
        ExecuteMsg::UpdateConfig {
            admin,
            operator,
            freeze_lead_seconds,
            default_gap_grace_seconds,
        } => execute::update_config(
            deps,
            env,
            info,
            admin,
            operator,
            freeze_lead_seconds,
            default_gap_grace_seconds,
        ),
    }
}

#[entry_point]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => query::query_config(deps),
        QueryMsg::EngineState {} => query::query_engine_state(deps),
        QueryMsg::Draw { draw_id } => query::query_draw(deps, draw_id),
        QueryMsg::DrawStatus { draw_id } => query::query_draw_status(deps, env, draw_id),
        QueryMsg::DisplayDraw { kind } => query::query_display_draw(deps, env, kind),
        QueryMsg::EntryTarget { kind } => query::query_entry_target(deps, env, kind),
        QueryMsg::Draws {
            kind,
            start_after,
            limit,
        } => query::query_draws(deps, env, kind, start_after, limit),
        QueryMsg::Entries {
            draw_id,
            start_after,
            limit,
        } => query::query_entries(deps, draw_id, start_after, limit),
        QueryMsg::UserEntries { draw_id, address } => {
            query::query_user_entries(deps, draw_id, address)
        }
        QueryMsg::Winner { draw_id } => query::query_winner(deps, draw_id),
        QueryMsg::WinnerHistory {
            draw_id,
            start_after,
            limit,
        } => query::query_winner_history(deps, draw_id, start_after, limit),
        QueryMsg::UserWinCount { address } => query::query_user_win_count(deps, address),
        QueryMsg::UnroutedEvents { start_after, limit } => {
            query::query_unrouted_events(deps, start_after, limit)
        }
        QueryMsg::BenefitEvent {
            event_type,
            payment_intent_id,
        } => query::query_benefit_event(deps, event_type, payment_intent_id),
    }
}

#[entry_point]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let stored = get_contract_version(deps.storage)?;
    if stored.contract != CONTRACT_NAME {
        return Err(ContractError::Unauthorized {
            reason: "Cannot migrate from different contract type".to_string(),
        });
    }

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("from_version", stored.version)
        .add_attribute("to_version", CONTRACT_VERSION))
}
