//! HTML rendering for the public and admin pages.
//!
//! Plain `format!` templates. Every value that came from the store or the
//! user goes through [`escape`].

use std::fmt::Write;
use tourney::tournament::{
    FormField, FormMode, FormState, Notice, NoticeLevel, Tournament, TournamentCard,
    TournamentStatus,
};

/// Horizontal scroll step of the list view, in pixels
pub const SCROLL_AMOUNT: u32 = 350;

/// Message shown in place of the list when the fetch fails
pub const LOAD_ERROR: &str = "Error loading tournaments";

/// Page a form or action was started from, and returns to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Origin {
    /// Public page (`/`)
    Index,
    /// Admin-only page (`/admin`)
    #[default]
    Admin,
}

impl Origin {
    pub fn path(&self) -> &'static str {
        match self {
            Origin::Index => "/",
            Origin::Admin => "/admin",
        }
    }

    /// Query suffix carrying the origin through admin links
    pub fn suffix(&self) -> &'static str {
        match self {
            Origin::Index => "?from=index",
            Origin::Admin => "",
        }
    }
}

/// Escape text for HTML element content and double-quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = r#"
body { margin: 0; min-height: 100vh; font-family: system-ui, sans-serif; background: linear-gradient(135deg, #f9fafb, #f3f4f6); color: #1f2937; }
.list { position: relative; max-width: 1200px; margin: 0 auto; padding: 2rem 1rem; }
.list-header { display: flex; align-items: center; justify-content: space-between; margin-bottom: 1.5rem; }
.scroller { display: flex; gap: 1.5rem; overflow-x: auto; padding-bottom: 1rem; scroll-snap-type: x mandatory; scrollbar-width: none; }
.scroller > * { scroll-snap-align: start; }
.round { padding: .5rem .75rem; border: 0; border-radius: 9999px; background: #fff; box-shadow: 0 1px 3px rgba(0,0,0,.2); cursor: pointer; }
.round:disabled { opacity: .5; cursor: not-allowed; }
.card { flex-shrink: 0; width: 300px; border-radius: .75rem; overflow: hidden; background: rgba(255,255,255,.8); box-shadow: 0 4px 12px rgba(0,0,0,.1); }
.banner { position: relative; height: 10rem; overflow: hidden; }
.banner img { width: 100%; height: 100%; object-fit: cover; }
.badge { position: absolute; top: 1rem; right: 1rem; padding: .25rem .75rem; border-radius: 9999px; font-size: .875rem; font-weight: 500; }
.status-progress { background: #fef3c7; color: #92400e; }
.status-closed { background: #fee2e2; color: #b91c1c; }
.status-completed { background: #dcfce7; color: #15803d; }
.status-upcoming { background: #dbeafe; color: #1d4ed8; }
.card-body { padding: 1rem; }
.card-body h3 { margin: 0 0 1rem; font-size: 1.125rem; }
.meta { font-size: .875rem; color: #4b5563; margin: .5rem 0; }
.progress { display: flex; justify-content: space-between; font-size: .875rem; color: #4b5563; }
.bar { position: relative; height: .5rem; background: #f3f4f6; border-radius: 9999px; overflow: hidden; }
.bar > div { position: absolute; top: 0; left: 0; height: 100%; background: #6d28d9; border-radius: 9999px; }
.admin { padding: 1.5rem; }
.panel { background: #fff; border-radius: .75rem; box-shadow: 0 1px 3px rgba(0,0,0,.1); padding: 1.5rem; }
.panel-header { display: flex; align-items: center; justify-content: space-between; }
.rows { display: grid; gap: 1.5rem; }
.row { display: flex; align-items: center; gap: 1rem; }
.row > .grow { flex: 1; }
.actions { display: flex; flex-direction: column; gap: .5rem; }
.actions form { margin: 0; }
.error { color: #ef4444; text-align: center; padding: 3rem 0; }
.notice { max-width: 1200px; margin: 1rem auto 0; padding: .75rem 1rem; border-radius: .5rem; }
.notice-success { background: #dcfce7; color: #166534; }
.notice-error { background: #fee2e2; color: #991b1b; }
.modal { position: fixed; inset: 0; display: flex; align-items: center; justify-content: center; background: rgba(0,0,0,.4); }
.modal form { background: #fff; border-radius: .75rem; padding: 1.5rem; width: 28rem; display: grid; gap: .75rem; }
.modal label { display: grid; gap: .25rem; font-size: .875rem; }
.field-error { color: #ef4444; font-size: .75rem; }
"#;

/// Full HTML document around `body`
pub fn page(title: &str, notice: Option<&Notice>, body: &str) -> String {
    let notice = notice.map(notice_banner).unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
{notice}{body}
</body>
</html>
"#,
        title = escape(title),
    )
}

/// Transient notification banner
pub fn notice_banner(notice: &Notice) -> String {
    let (class, role) = match notice.level {
        NoticeLevel::Success => ("notice-success", "status"),
        NoticeLevel::Error => ("notice-error", "alert"),
    };
    format!(
        r#"<div class="notice {class}" role="{role}">{}</div>
"#,
        escape(&notice.message)
    )
}

/// One tournament card
pub fn card(tournament: &Tournament) -> String {
    let card = TournamentCard::from(tournament);
    format!(
        r#"<div class="card">
  <div class="banner">
    <img src="{banner}" alt="{title}" loading="lazy">
    <span class="badge {badge_class}">{badge_label}</span>
  </div>
  <div class="card-body">
    <h3>{title}</h3>
    <div class="meta prize">{prize}</div>
    <div class="meta date">{date}</div>
    <div class="progress"><span>{players}</span><span>{progress}</span></div>
    <div class="bar"><div style="width: {width}%"></div></div>
  </div>
</div>"#,
        banner = escape(&card.banner),
        title = escape(&card.title),
        badge_class = card.badge.class,
        badge_label = card.badge.label,
        prize = escape(&card.prize_pool),
        date = escape(&card.start_date),
        players = card.participants_label(),
        progress = card.progress_label(),
        width = card.bar_width(),
    )
}

/// Horizontally scrolling list of cards
pub fn list_view(tournaments: Result<&[Tournament], &str>) -> String {
    let content = match tournaments {
        Ok(tournaments) => {
            let mut cards = String::new();
            for t in tournaments {
                cards.push_str(&card(t));
                cards.push('\n');
            }
            format!(r#"<div id="scroller" class="scroller">{cards}</div>"#)
        }
        Err(message) => format!(r#"<p class="error">{}</p>"#, escape(message)),
    };

    format!(
        r#"<section class="list">
  <div class="list-header">
    <h2>Tournaments</h2>
    <div>
      <button class="round" aria-label="Scroll left" onclick="document.getElementById('scroller').scrollBy({{left: -{SCROLL_AMOUNT}, behavior: 'smooth'}})">&lsaquo;</button>
      <button class="round" aria-label="Scroll right" onclick="document.getElementById('scroller').scrollBy({{left: {SCROLL_AMOUNT}, behavior: 'smooth'}})">&rsaquo;</button>
    </div>
  </div>
  {content}
</section>
"#
    )
}

fn post_button(action: &str, label: &str, text: &str, class: &str, disabled: bool) -> String {
    let disabled = if disabled { " disabled" } else { "" };
    format!(
        r#"<form method="post" action="{action}"><button class="round {class}" aria-label="{label}"{disabled}>{text}</button></form>"#
    )
}

/// Admin list with add, move, edit and delete controls
pub fn admin_view(tournaments: Result<&[Tournament], &str>, origin: Origin) -> String {
    let suffix = origin.suffix();

    let content = match tournaments {
        Ok(tournaments) => {
            let last = tournaments.len().saturating_sub(1);
            let mut rows = String::new();
            for (index, t) in tournaments.iter().enumerate() {
                let id = escape(t.id.as_str());
                let _ = write!(
                    rows,
                    r#"<div class="row">
  <div class="grow">{card}</div>
  <div class="actions">
    {up}
    {down}
  </div>
  <div class="actions">
    <a class="round" aria-label="Edit tournament" href="/admin/{id}/edit{suffix}">Edit</a>
    {delete}
  </div>
</div>
"#,
                    card = card(t),
                    up = post_button(
                        &format!("/admin/move/{index}/up{suffix}"),
                        "Move up",
                        "&uarr;",
                        "",
                        index == 0,
                    ),
                    down = post_button(
                        &format!("/admin/move/{index}/down{suffix}"),
                        "Move down",
                        "&darr;",
                        "",
                        index == last,
                    ),
                    delete = post_button(
                        &format!("/admin/tournaments/{id}/delete{suffix}"),
                        "Delete tournament",
                        "Delete",
                        "danger",
                        false,
                    ),
                );
            }
            format!(r#"<div class="rows">{rows}</div>"#)
        }
        Err(message) => format!(r#"<p class="error">{}</p>"#, escape(message)),
    };

    format!(
        r#"<section class="admin">
  <div class="panel">
    <div class="panel-header">
      <h2>Manage Tournaments</h2>
      <a class="round" aria-label="Add new tournament" href="/admin/new{suffix}">+</a>
    </div>
    {content}
  </div>
</section>
"#
    )
}

fn text_field(
    state: &FormState,
    field: FormField,
    label: &str,
    kind: &str,
    value: &str,
    extra: &str,
) -> String {
    let error = state
        .errors
        .get(field)
        .map(|m| format!(r#"<span class="field-error">{}</span>"#, escape(m)))
        .unwrap_or_default();
    format!(
        r#"<label>{label}<input type="{kind}" name="{name}" value="{value}"{extra}>{error}</label>"#,
        name = field.as_str(),
        value = escape(value),
    )
}

/// Create/edit form in a modal over the admin list
pub fn form_modal(state: &FormState, origin: Origin) -> String {
    let suffix = origin.suffix();
    let (heading, action, submit) = match &state.mode {
        FormMode::Create => (
            "Add Tournament".to_string(),
            format!("/admin/tournaments{suffix}"),
            "Create Tournament",
        ),
        FormMode::Edit(id) => (
            "Edit Tournament".to_string(),
            format!("/admin/tournaments/{}{suffix}", escape(id.as_str())),
            "Update Tournament",
        ),
    };

    let input = &state.input;
    let mut options = String::new();
    for status in TournamentStatus::ALL {
        let selected = if input.status == status.as_str() {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            options,
            r#"<option value="{value}"{selected}>{label}</option>"#,
            value = status.as_str(),
            label = tourney::tournament::status_badge(status).label,
        );
    }
    let status_error = state
        .errors
        .get(FormField::Status)
        .map(|m| format!(r#"<span class="field-error">{}</span>"#, escape(m)))
        .unwrap_or_default();

    format!(
        r#"<div class="modal" role="dialog" aria-modal="true">
  <form method="post" action="{action}">
    <h2>{heading}</h2>
    {title}
    {banner}
    {max}
    {prize}
    {start}
    <label>Status<select name="status">{options}</select>{status_error}</label>
    <div>
      <button type="submit">{submit}</button>
      <a href="{cancel}">Cancel</a>
    </div>
  </form>
</div>
"#,
        title = text_field(state, FormField::Title, "Title", "text", &input.title, " required"),
        banner = text_field(
            state,
            FormField::BannerUrl,
            "Banner URL",
            "url",
            &input.banner_url,
            " required",
        ),
        max = text_field(
            state,
            FormField::MaxParticipants,
            "Max Participants",
            "number",
            &input.max_participants,
            r#" min="1" required"#,
        ),
        prize = text_field(
            state,
            FormField::PrizePool,
            "Prize Pool",
            "number",
            &input.prize_pool,
            r#" min="0" step="any" required"#,
        ),
        start = text_field(
            state,
            FormField::StartDate,
            "Start Date",
            "datetime-local",
            &input.start_date,
            r#" step="0.001" required"#,
        ),
        cancel = origin.path(),
    )
}
