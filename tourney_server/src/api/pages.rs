//! Server-rendered pages.
//!
//! Each admin action is a form POST answered by a `303` redirect back to
//! the originating page, with the resulting notice in the query string.
//! A rejected create/edit form is re-rendered in place instead so the
//! entered values survive.

use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tourney::tournament::{
    AdminError, AdminUiState, FormMode, FormState, MoveDirection, Notice, NoticeLevel,
    SubmitOutcome, Tournament, TournamentId, TournamentInput,
};

use super::AppState;
use crate::render::{self, Origin};

/// Notice carried over a redirect
#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    pub notice: Option<String>,
    pub level: Option<NoticeLevel>,
}

impl NoticeQuery {
    fn into_notice(self) -> Option<Notice> {
        let message = self.notice.filter(|m| !m.is_empty())?;
        Some(match self.level {
            Some(NoticeLevel::Error) => Notice::error(message),
            _ => Notice::success(message),
        })
    }
}

/// `?from=index` marks actions started on the public page
#[derive(Debug, Default, Deserialize)]
pub struct OriginQuery {
    pub from: Option<String>,
}

impl OriginQuery {
    fn origin(&self) -> Origin {
        match self.from.as_deref() {
            Some("index") => Origin::Index,
            _ => Origin::Admin,
        }
    }
}

/// Redirect to `origin`, carrying `notice` if any
fn redirect_to(origin: Origin, notice: Option<&Notice>) -> Redirect {
    match notice {
        Some(notice) => {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("notice", &notice.message)
                .append_pair("level", notice.level.as_str())
                .finish();
            Redirect::to(&format!("{}?{}", origin.path(), query))
        }
        None => Redirect::to(origin.path()),
    }
}

/// Render the page for `origin` with an optional modal on top
async fn render_page(
    state: &AppState,
    origin: Origin,
    notice: Option<&Notice>,
    modal: Option<&FormState>,
) -> String {
    let fetched = state.admin.tournaments().await;
    if let Err(e) = &fetched {
        tracing::error!(error = %e, "Error loading tournaments");
    }
    let list: Result<&[Tournament], &str> = match &fetched {
        Ok(list) => Ok(list.as_slice()),
        Err(_) => Err(render::LOAD_ERROR),
    };

    let mut body = String::new();
    if origin == Origin::Index {
        body.push_str(&render::list_view(list));
    }
    body.push_str(&render::admin_view(list, origin));
    if let Some(form) = modal {
        body.push_str(&render::form_modal(form, origin));
    }

    let title = match origin {
        Origin::Index => "Tournaments",
        Origin::Admin => "Manage Tournaments",
    };
    render::page(title, notice, &body)
}

/// `GET /`
pub async fn index(State(state): State<AppState>, Query(query): Query<NoticeQuery>) -> Html<String> {
    let notice = query.into_notice();
    Html(render_page(&state, Origin::Index, notice.as_ref(), None).await)
}

/// `GET /admin`
pub async fn admin(State(state): State<AppState>, Query(query): Query<NoticeQuery>) -> Html<String> {
    let notice = query.into_notice();
    Html(render_page(&state, Origin::Admin, notice.as_ref(), None).await)
}

/// Render `origin` with the form the URL asked for
async fn form_page(state: &AppState, origin: Origin, ui: AdminUiState) -> Response {
    match state.admin.open_form(&ui).await {
        Ok(form) => Html(render_page(state, origin, None, form.as_ref()).await).into_response(),
        Err(AdminError::NotFound(_)) => {
            let notice = Notice::error("Tournament not found");
            let html = render_page(state, origin, Some(&notice), None).await;
            (StatusCode::NOT_FOUND, Html(html)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Error loading tournaments");
            let html = render_page(state, origin, None, None).await;
            (StatusCode::BAD_GATEWAY, Html(html)).into_response()
        }
    }
}

/// `GET /admin/new`
pub async fn new_form(State(state): State<AppState>, Query(from): Query<OriginQuery>) -> Response {
    form_page(&state, from.origin(), AdminUiState::Creating).await
}

/// `GET /admin/{id}/edit`
pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(from): Query<OriginQuery>,
) -> Response {
    let ui = AdminUiState::Editing(TournamentId::new(id));
    form_page(&state, from.origin(), ui).await
}

async fn submit(state: &AppState, origin: Origin, mode: FormMode, input: TournamentInput) -> Response {
    match state.admin.submit(mode, input).await {
        SubmitOutcome::Saved(notice) => redirect_to(origin, Some(&notice)).into_response(),
        SubmitOutcome::Invalid(form) => {
            let html = render_page(state, origin, None, Some(&form)).await;
            (StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response()
        }
        SubmitOutcome::Failed(form, notice) => {
            let html = render_page(state, origin, Some(&notice), Some(&form)).await;
            (StatusCode::BAD_GATEWAY, Html(html)).into_response()
        }
    }
}

/// `POST /admin/tournaments`
pub async fn create(
    State(state): State<AppState>,
    Query(from): Query<OriginQuery>,
    Form(input): Form<TournamentInput>,
) -> Response {
    submit(&state, from.origin(), FormMode::Create, input).await
}

/// `POST /admin/tournaments/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(from): Query<OriginQuery>,
    Form(input): Form<TournamentInput>,
) -> Response {
    let mode = FormMode::Edit(TournamentId::new(id));
    submit(&state, from.origin(), mode, input).await
}

/// `POST /admin/tournaments/{id}/delete`
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(from): Query<OriginQuery>,
) -> Redirect {
    let notice = state.admin.delete(&TournamentId::new(id)).await;
    redirect_to(from.origin(), Some(&notice))
}

/// `POST /admin/move/{index}/{direction}`
pub async fn move_item(
    State(state): State<AppState>,
    Path((index, direction)): Path<(usize, MoveDirection)>,
    Query(from): Query<OriginQuery>,
) -> Redirect {
    let notice = state.admin.move_item(index, direction).await;
    redirect_to(from.origin(), notice.as_ref())
}
