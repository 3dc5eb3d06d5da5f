//! Server-rendered pages for the sign-in flow.
//!
//! Only the pages the authorization flow needs are rendered here; the
//! dashboard page is a placeholder that shows the projected session.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use leptos::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use tourdesk_platform_access::{Language, Role, SessionUser, SessionView};

use crate::auth::{AppState, OptionalSession, RequireSession};
use crate::profile::request_language;

/// Localized strings for the sign-in pages.
#[derive(Clone, Copy)]
struct Text {
    sign_in_title: &'static str,
    sign_in_button: &'static str,
    access_denied: &'static str,
    pending_title: &'static str,
    approval_required: &'static str,
    account_created: &'static str,
    contact_admin: &'static str,
    auto_sign_out: &'static str,
    sign_out_now: &'static str,
}

fn text(language: Language) -> Text {
    match language {
        Language::English => Text {
            sign_in_title: "Sign in to the staff dashboard",
            sign_in_button: "Sign in with Google",
            access_denied: "Access denied. Your account is not authorized to use this dashboard.",
            pending_title: "Account Pending Approval",
            approval_required: "Administrator approval required",
            account_created: "Your account has been created and is waiting for an administrator to approve it.",
            contact_admin: "Please contact your administrator to activate your account.",
            auto_sign_out: "You will be signed out automatically in a few seconds.",
            sign_out_now: "Sign out now",
        },
        Language::Korean => Text {
            sign_in_title: "직원 대시보드 로그인",
            sign_in_button: "Google로 로그인",
            access_denied: "접근이 거부되었습니다. 이 대시보드를 사용할 권한이 없습니다.",
            pending_title: "계정 승인 대기 중",
            approval_required: "관리자 승인이 필요합니다",
            account_created: "계정이 생성되었으며 관리자의 승인을 기다리고 있습니다.",
            contact_admin: "계정 활성화를 위해 관리자에게 문의하세요.",
            auto_sign_out: "잠시 후 자동으로 로그아웃됩니다.",
            sign_out_now: "지금 로그아웃",
        },
        Language::Japanese => Text {
            sign_in_title: "スタッフダッシュボードにサインイン",
            sign_in_button: "Googleでサインイン",
            access_denied: "アクセスが拒否されました。このダッシュボードを利用する権限がありません。",
            pending_title: "アカウント承認待ち",
            approval_required: "管理者の承認が必要です",
            account_created: "アカウントが作成され、管理者の承認を待っています。",
            contact_admin: "アカウントを有効にするには管理者にお問い合わせください。",
            auto_sign_out: "数秒後に自動的にサインアウトされます。",
            sign_out_now: "今すぐサインアウト",
        },
    }
}

/// Renders a complete page around `body`.
fn document(
    language: Language,
    title: &'static str,
    refresh: Option<String>,
    body: impl IntoView + 'static,
) -> Html<String> {
    let lang = language.code();
    let refresh = refresh.map(|content| {
        view! { <meta http-equiv="refresh" content=content/> }
    });

    let page = view! {
        <!DOCTYPE html>
        <html lang=lang>
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                {refresh}
                <title>{title}</title>
            </head>
            <body>{body}</body>
        </html>
    };

    Html(page.to_html())
}

#[component]
fn SignInPage(text: Text, denied: bool) -> impl IntoView {
    view! {
        <main>
            <h1>{text.sign_in_title}</h1>
            {denied.then(|| view! { <p role="alert">{text.access_denied}</p> })}
            <a href="/api/auth/login">{text.sign_in_button}</a>
        </main>
    }
}

#[component]
fn PendingPage(text: Text) -> impl IntoView {
    view! {
        <main>
            <h1>{text.pending_title}</h1>
            <section>
                <h2>{text.approval_required}</h2>
                <p>{text.account_created}</p>
                <p>{text.contact_admin}</p>
            </section>
            <p>{text.auto_sign_out}</p>
            <a href="/api/auth/logout">{text.sign_out_now}</a>
        </main>
    }
}

#[component]
fn DashboardPage(user: SessionUser, is_admin: bool) -> impl IntoView {
    let display_name = user.name.clone().unwrap_or_else(|| user.email.clone());
    let role = user.role.unwrap_or_else(|| "-".to_string());

    view! {
        <main>
            <h1>"Dashboard"</h1>
            <p class="user-name">{display_name}</p>
            <p class="user-email">{user.email}</p>
            <p>"Role: "{role}</p>
            {is_admin.then(|| view! { <p><strong>"Administrator"</strong></p> })}
            <a href="/api/auth/logout">"Sign out"</a>
        </main>
    }
}

fn render_dashboard(language: Language, session: SessionView, is_admin: bool) -> Html<String> {
    document(
        language,
        "Dashboard",
        None,
        view! { <DashboardPage user=session.user is_admin=is_admin/> },
    )
}

/// Root path: sends visitors on to the sign-in page or the dashboard.
pub async fn landing(
    State(state): State<Arc<AppState>>,
    OptionalSession(session): OptionalSession,
) -> Redirect {
    match session {
        Some(token) if !token.is_pending() => Redirect::to(state.gate.home_path()),
        _ => Redirect::to(state.gate.sign_in_path()),
    }
}

/// Query parameters of the sign-in page.
#[derive(Debug, Deserialize)]
pub struct SignInQuery {
    error: Option<String>,
}

/// Sign-in page.
pub async fn sign_in(
    Query(query): Query<SignInQuery>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Html<String> {
    let language = request_language(&jar, &headers);
    let t = text(language);
    let denied = query.error.is_some();

    document(
        language,
        t.sign_in_title,
        None,
        view! { <SignInPage text=t denied=denied/> },
    )
}

/// Pending-approval notice.
///
/// Signs the user out after the configured delay so a stale pending session
/// does not linger in the browser.
pub async fn pending(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Html<String> {
    let language = request_language(&jar, &headers);
    let t = text(language);

    let seconds = state.session_config.pending_sign_out_seconds;
    let refresh = format!("{seconds};url=/api/auth/logout");

    document(
        language,
        t.pending_title,
        Some(refresh),
        view! { <PendingPage text=t/> },
    )
}

/// Dashboard home.
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    RequireSession(token): RequireSession,
    jar: CookieJar,
    headers: HeaderMap,
) -> Response {
    let language = request_language(&jar, &headers);
    let is_admin = token.role().is_some_and(Role::is_admin);

    render_dashboard(language, state.chain.project(&token), is_admin).into_response()
}
