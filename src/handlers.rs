use crate::auth::{AuthStatus, LoginAttempt};
use crate::effects::{Feedback, TracingEffects};
use crate::errors::AppError;
use crate::models::{
    AddRunnerRequest, ConfirmQuery, DeleteResponse, DistanceRequest, DraftResponse,
    EventSavedResponse, EventView, LeaderboardResponse, LoginRequest, LoginResponse,
    RunnerResponse, RunnerView, SpinRequest, ThemeResponse, WheelResponse,
};
use crate::runners::RunnerTracker;
use crate::schedule::EventDraft;
use crate::state::{AppData, AppState};
use crate::storage::persist_data;
use crate::ui::render_index;
use crate::wheel::Candidate;
use axum::{
    extract::{Path, Query, State},
    response::Html,
    Json,
};
use chrono::{DateTime, Local, NaiveDateTime};
use serde_json::{Map, Value};
use tokio::sync::MutexGuard;
use tracing::{error, info};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let data = current_month(&state).await;
    Html(render_index(data.theme.as_str(), data.runners.storage_key()))
}

pub async fn auth_status(State(state): State<AppState>) -> Json<AuthStatus> {
    let data = state.data.lock().await;
    Json(data.auth.status())
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Json<LoginResponse> {
    let mut guard = state.data.lock().await;
    let data = &mut *guard;
    let mut feedback = Feedback::default();

    let attempt = data.auth.try_login(&payload.code, &mut feedback);
    match attempt {
        LoginAttempt::Accepted => {
            data.timers.error_flash.cancel();
            let task_state = state.clone();
            data.timers
                .login
                .schedule(state.config.login_delay, finish_login(task_state));
        }
        LoginAttempt::Rejected => {
            let task_state = state.clone();
            data.timers
                .error_flash
                .schedule(state.config.error_flash, clear_login_error(task_state));
        }
    }

    Json(LoginResponse {
        accepted: attempt == LoginAttempt::Accepted,
        status: data.auth.status(),
        feedback,
    })
}

async fn finish_login(state: AppState) {
    let mut guard = state.data.lock().await;
    let data = &mut *guard;
    data.auth
        .complete_login(&mut data.storage, || info!("session unlocked"));
    if let Err(err) = persist_data(state.data_path(), &data.storage).await {
        error!("failed to persist login: {}", err.message);
    }
}

async fn clear_login_error(state: AppState) {
    state.data.lock().await.auth.clear_error();
}

pub async fn logout(State(state): State<AppState>) -> Result<Json<AuthStatus>, AppError> {
    let mut guard = state.data.lock().await;
    let data = &mut *guard;
    data.timers.login.cancel();
    data.auth.logout(&mut data.storage);
    commit(&state, data).await?;
    Ok(Json(data.auth.status()))
}

pub async fn get_theme(State(state): State<AppState>) -> Json<ThemeResponse> {
    let data = state.data.lock().await;
    Json(ThemeResponse {
        theme: data.theme.as_str(),
    })
}

pub async fn toggle_theme(State(state): State<AppState>) -> Result<Json<ThemeResponse>, AppError> {
    let mut guard = state.data.lock().await;
    let data = &mut *guard;
    data.theme.toggle(&mut data.storage);
    commit(&state, data).await?;
    Ok(Json(ThemeResponse {
        theme: data.theme.as_str(),
    }))
}

pub async fn list_runners(State(state): State<AppState>) -> Json<LeaderboardResponse> {
    let data = current_month(&state).await;
    Json(leaderboard(&data.runners))
}

pub async fn add_runner(
    State(state): State<AppState>,
    Json(payload): Json<AddRunnerRequest>,
) -> Result<Json<RunnerResponse>, AppError> {
    let mut guard = current_month(&state).await;
    let data = &mut *guard;
    let mut feedback = Feedback::default();

    let runner = data.runners.add_member(
        &payload.name,
        payload.goal,
        &payload.avatar,
        local_now(),
        &mut feedback,
    )?;
    let view = RunnerView::from(runner);
    commit(&state, data).await?;

    Ok(Json(RunnerResponse {
        runner: view,
        feedback,
    }))
}

pub async fn get_runner(State(state): State<AppState>, Path(id): Path<i64>) -> Json<RunnerView> {
    let data = current_month(&state).await;
    Json(RunnerView::from(&data.runners.get_runner(id)))
}

pub async fn log_distance(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<DistanceRequest>,
) -> Result<Json<RunnerResponse>, AppError> {
    let mut guard = current_month(&state).await;
    let data = &mut *guard;
    if data.runners.find(id).is_none() {
        return Err(runner_not_found(id));
    }

    let mut feedback = Feedback::default();
    if !data
        .runners
        .log_distance(id, payload.distance, local_now(), &mut feedback)
    {
        return Err(AppError::bad_request("distance must be a non-zero number"));
    }
    commit(&state, data).await?;

    Ok(Json(RunnerResponse {
        runner: RunnerView::from(&data.runners.get_runner(id)),
        feedback,
    }))
}

pub async fn cheer_runner(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RunnerView>, AppError> {
    let mut guard = current_month(&state).await;
    let data = &mut *guard;
    if !data.runners.cheer(id) {
        return Err(runner_not_found(id));
    }
    commit(&state, data).await?;
    Ok(Json(RunnerView::from(&data.runners.get_runner(id))))
}

pub async fn delete_runner(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ConfirmQuery>,
) -> Result<Json<DeleteResponse>, AppError> {
    let mut guard = current_month(&state).await;
    let data = &mut *guard;
    let deleted = data
        .runners
        .delete_member(id, &mut Feedback::new(query.confirm));
    if deleted {
        commit(&state, data).await?;
    }
    Ok(Json(DeleteResponse { deleted }))
}

pub async fn get_wheel(State(state): State<AppState>) -> Json<WheelResponse> {
    let data = current_month(&state).await;
    Json(wheel_view(&data))
}

pub async fn spin_wheel(
    State(state): State<AppState>,
    payload: Option<Json<SpinRequest>>,
) -> Json<WheelResponse> {
    let mut guard = current_month(&state).await;
    let data = &mut *guard;

    let requested = payload.and_then(|Json(request)| request.candidates);
    let candidates = requested
        .clone()
        .unwrap_or_else(|| finisher_candidates(&data.runners));

    let plan = data.wheel.spin(&candidates, &mut rand::thread_rng());
    if let Some(plan) = plan {
        info!(candidates = candidates.len(), "wheel spinning");
        data.wheel_candidates = requested;
        let task_state = state.clone();
        data.timers
            .wheel_settle
            .schedule(state.config.settle_delay, settle_wheel(task_state, plan.ticket));
    }

    Json(wheel_view(data))
}

async fn settle_wheel(state: AppState, ticket: u64) {
    let mut data = state.data.lock().await;
    data.wheel.settle(ticket, &mut TracingEffects);
}

pub async fn reset_wheel(State(state): State<AppState>) -> Json<WheelResponse> {
    let mut guard = current_month(&state).await;
    let data = &mut *guard;
    data.timers.wheel_settle.cancel();
    data.wheel.reset();
    data.wheel_candidates = None;
    Json(wheel_view(data))
}

pub async fn list_events(State(state): State<AppState>) -> Json<Vec<EventView>> {
    let data = state.data.lock().await;
    let now = local_now().naive_local();
    Json(
        data.schedule
            .sorted_at(now)
            .into_iter()
            .map(|event| EventView::at(event, now))
            .collect(),
    )
}

pub async fn event_draft() -> Json<DraftResponse> {
    Json(DraftResponse {
        draft: EventDraft::blank_at(local_now().naive_local()),
    })
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(payload): Json<EventDraft>,
) -> Result<Json<EventSavedResponse>, AppError> {
    let mut guard = state.data.lock().await;
    let data = &mut *guard;
    let now = local_now().naive_local();

    let draft = data.schedule.open_editor(None, now);
    *draft = EventDraft { id: None, ..payload };
    save_event(&state, data, now).await
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<EventDraft>,
) -> Result<Json<EventSavedResponse>, AppError> {
    let mut guard = state.data.lock().await;
    let data = &mut *guard;
    let now = local_now().naive_local();

    let existing = data
        .schedule
        .find(id)
        .cloned()
        .ok_or_else(|| event_not_found(id))?;
    let draft = data.schedule.open_editor(Some(&existing), now);
    *draft = EventDraft {
        id: Some(id),
        ..payload
    };
    save_event(&state, data, now).await
}

async fn save_event(
    state: &AppState,
    data: &mut AppData,
    now: NaiveDateTime,
) -> Result<Json<EventSavedResponse>, AppError> {
    let mut feedback = Feedback::default();
    let saved = data.schedule.save_editor(now, &mut feedback);
    if saved.is_err() {
        data.schedule.close_editor();
    }
    let id = saved?;
    commit(state, data).await?;
    Ok(Json(EventSavedResponse { id, feedback }))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ConfirmQuery>,
) -> Result<Json<DeleteResponse>, AppError> {
    let mut guard = state.data.lock().await;
    let data = &mut *guard;

    let existing = data
        .schedule
        .find(id)
        .cloned()
        .ok_or_else(|| event_not_found(id))?;
    data.schedule.open_editor(Some(&existing), local_now().naive_local());
    let deleted = data
        .schedule
        .delete_editor(&mut Feedback::new(query.confirm));
    data.schedule.close_editor();
    if deleted {
        commit(&state, data).await?;
    }
    Ok(Json(DeleteResponse { deleted }))
}

/// Locks the app data, first moving the runner list to this month if the month has turned.
async fn current_month(state: &AppState) -> MutexGuard<'_, AppData> {
    let mut data = state.data.lock().await;
    data.roll_over(local_now().date_naive());
    data
}

async fn commit(state: &AppState, data: &mut AppData) -> Result<(), AppError> {
    data.sync_storage()?;
    persist_data(state.data_path(), &data.storage).await
}

fn leaderboard(runners: &RunnerTracker) -> LeaderboardResponse {
    LeaderboardResponse {
        month_key: runners.storage_key().to_string(),
        ranked: runners.ranked().into_iter().map(RunnerView::from).collect(),
        completed: runners.completed().into_iter().map(RunnerView::from).collect(),
    }
}

fn finisher_candidates(runners: &RunnerTracker) -> Vec<Candidate> {
    runners
        .completed()
        .into_iter()
        .map(|runner| {
            let mut meta = Map::new();
            meta.insert("id".into(), Value::from(runner.id));
            meta.insert("avatar".into(), Value::from(runner.avatar.clone()));
            Candidate {
                name: runner.name.clone(),
                meta,
            }
        })
        .collect()
}

fn wheel_view(data: &AppData) -> WheelResponse {
    let candidates = data
        .wheel_candidates
        .clone()
        .unwrap_or_else(|| finisher_candidates(&data.runners));
    WheelResponse::new(&data.wheel, candidates)
}

fn runner_not_found(id: i64) -> AppError {
    AppError::not_found(format!("no runner with id {id}"))
}

fn event_not_found(id: i64) -> AppError {
    AppError::not_found(format!("no event with id {id}"))
}

fn local_now() -> DateTime<Local> {
    Local::now()
}
