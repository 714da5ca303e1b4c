use crate::api::IdentityService;
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardTitle, Input, Label,
    Spinner, SplashRings, ALERT_ERROR,
};
use crate::components::{AuthGate, BookmarkForm, BookmarkList};
use crate::models::AuthUser;
use crate::state::AppContext;
use crate::storage::clear_session;
use icons::{Bookmark as BookmarkIcon, LogOut, Sparkles};
use leptos::logging::{error, log, warn};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;
use leptos_router::NavigateOptions;

fn replace_history() -> NavigateOptions {
    NavigateOptions {
        replace: true,
        ..Default::default()
    }
}

/// `/`: sends the visitor to the dashboard or the sign-in screen.
#[component]
pub fn RootPage() -> impl IntoView {
    let backend = expect_context::<AppContext>().0;
    let navigate = use_navigate();

    spawn_local(async move {
        let signed_in = match backend.auth() {
            Ok(auth) => match auth.current_user().await {
                Ok(user) => user.is_some(),
                Err(e) => {
                    warn!("Session check failed: {e}");
                    false
                }
            },
            Err(e) => {
                warn!("Session check skipped: {e}");
                false
            }
        };
        let target = if signed_in { "/dashboard" } else { "/login" };
        navigate(target, replace_history());
    });

    view! {
        <div class="relative flex h-screen items-center justify-center overflow-hidden bg-gradient-to-br from-indigo-50 via-white to-purple-50">
            <div class="absolute -right-40 -top-40 h-80 w-80 rounded-full bg-purple-200 opacity-70 blur-xl"></div>
            <div class="absolute -bottom-40 -left-40 h-80 w-80 rounded-full bg-indigo-200 opacity-70 blur-xl"></div>
            <div class="relative z-10 text-center">
                <SplashRings />
                <h2 class="mb-2 bg-gradient-to-r from-indigo-600 to-purple-600 bg-clip-text text-2xl font-bold text-transparent">
                    "Welcome"
                </h2>
                <p class="animate-pulse text-sm text-gray-600">"Preparing your experience..."</p>
            </div>
        </div>
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let backend = StoredValue::new(expect_context::<AppContext>().0);
    let navigate = StoredValue::new(use_navigate());

    // Already signed in: skip the form.
    spawn_local(async move {
        let Ok(auth) = backend.get_value().auth() else {
            return;
        };
        if let Ok(Some(_)) = auth.active_session().await {
            navigate.with_value(|nav| nav("/dashboard", replace_history()));
        }
    });

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }

        let email_val = email.get_untracked().trim().to_string();
        let password_val = password.get_untracked();
        if email_val.is_empty() || password_val.is_empty() {
            error.set(Some("Please enter your email and password".to_string()));
            return;
        }

        loading.set(true);
        error.set(None);

        let backend = backend.get_value();
        spawn_local(async move {
            let outcome = match backend.auth() {
                Ok(auth) => auth.sign_in(&email_val, &password_val).await,
                Err(e) => Err(e),
            };
            match outcome {
                Ok(session) => {
                    log!("Signed in as {}", session.user.id);
                    navigate.with_value(|nav| nav("/dashboard", replace_history()));
                }
                Err(e) => {
                    warn!("Sign-in failed: {e}");
                    error.try_set(Some(e.to_string()));
                }
            }
            loading.try_set(false);
        });
    };

    view! {
        <div class="min-h-screen bg-gradient-to-br from-indigo-50 via-white to-purple-50">
            <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
                <div class="mb-6 flex items-center justify-center gap-2">
                    <BookmarkIcon class="size-6 text-indigo-600" />
                    <span class="text-lg font-bold text-gray-800">"Smart Bookmarks"</span>
                </div>

                <Card>
                    <CardTitle>"Log in"</CardTitle>
                    <form class="flex flex-col gap-3" on:submit=on_submit>
                        <div>
                            <Label html_for="email">"Email"</Label>
                            <Input
                                id="email"
                                r#type="email"
                                autocomplete="email"
                                placeholder="you@example.com"
                                bind_value=email
                                disabled=loading
                            />
                        </div>

                        <div>
                            <Label html_for="password">"Password"</Label>
                            <Input
                                id="password"
                                r#type="password"
                                autocomplete="current-password"
                                placeholder="••••••••"
                                bind_value=password
                                disabled=loading
                            />
                        </div>

                        {move || {
                            error.get().map(|e| {
                                view! {
                                    <Alert class=ALERT_ERROR attr:role="alert">
                                        <AlertDescription>{e}</AlertDescription>
                                    </Alert>
                                }
                            })
                        }}

                        <Button class="w-full" size=ButtonSize::Lg attr:disabled=move || loading.get()>
                            <Show when=move || loading.get() fallback=|| ().into_view()>
                                <Spinner />
                            </Show>
                            {move || if loading.get() { "Signing in..." } else { "Continue" }}
                        </Button>
                    </form>
                </Card>
            </div>
        </div>
    }
}

/// `/dashboard`: only rendered for a resolved user.
#[component]
pub fn DashboardPage() -> impl IntoView {
    view! { <AuthGate render=|user: AuthUser| view! { <DashboardShell user=user /> } /> }
}

#[component]
pub(crate) fn DashboardShell(user: AuthUser) -> impl IntoView {
    let backend = StoredValue::new(expect_context::<AppContext>().0);
    let navigate = StoredValue::new(use_navigate());
    let logging_out: RwSignal<bool> = RwSignal::new(false);

    let on_logout = move |_: web_sys::MouseEvent| {
        if logging_out.get_untracked() {
            return;
        }
        logging_out.set(true);

        let backend = backend.get_value();
        spawn_local(async move {
            let outcome = match backend.auth() {
                Ok(auth) => auth.sign_out().await,
                Err(e) => Err(e),
            };
            if let Err(e) = outcome {
                error!("Error signing out: {e}");
            }
            clear_session();
            logging_out.try_set(false);
            navigate.with_value(|nav| nav("/login", replace_history()));
        });
    };

    let initial = user.initial();
    let email = user.email.clone().unwrap_or_default();
    let user_id = Signal::stored(user.id.clone());

    view! {
        <div class="min-h-screen bg-gradient-to-br from-indigo-50 via-white to-purple-50">
            <header class="sticky top-0 z-10 border-b border-gray-200 bg-white/80 backdrop-blur-md">
                <div class="mx-auto flex max-w-5xl items-center justify-between px-6 py-4">
                    <div class="flex items-center gap-3">
                        <div class="flex size-10 items-center justify-center rounded-xl bg-gradient-to-br from-indigo-600 to-purple-600 text-white shadow-md">
                            <BookmarkIcon class="size-5" />
                        </div>
                        <h1 class="bg-gradient-to-r from-indigo-600 to-purple-600 bg-clip-text text-xl font-bold text-transparent">
                            "Smart Bookmarks"
                        </h1>
                    </div>

                    <div class="flex items-center gap-4">
                        <div class="hidden items-center gap-2 sm:flex">
                            <div class="flex size-8 items-center justify-center rounded-full bg-gradient-to-br from-indigo-500 to-purple-500 text-sm font-semibold text-white">
                                {initial}
                            </div>
                            <span class="text-sm text-gray-700">{email}</span>
                        </div>
                        <Button
                            variant=ButtonVariant::Destructive
                            size=ButtonSize::Sm
                            attr:disabled=move || logging_out.get()
                            on:click=on_logout
                        >
                            <Show when=move || logging_out.get() fallback=|| view! { <LogOut /> }>
                                <Spinner />
                            </Show>
                            {move || if logging_out.get() { "Logging out..." } else { "Logout" }}
                        </Button>
                    </div>
                </div>
            </header>

            <main class="mx-auto max-w-5xl space-y-6 px-6 py-8">
                <div class="relative overflow-hidden rounded-2xl bg-gradient-to-r from-indigo-600 to-purple-600 p-8 shadow-xl">
                    <div class="absolute right-0 top-0 -mr-32 -mt-32 h-64 w-64 rounded-full bg-white/10"></div>
                    <div class="absolute bottom-0 left-0 -mb-24 -ml-24 h-48 w-48 rounded-full bg-white/10"></div>
                    <div class="relative z-10">
                        <div class="mb-2 flex items-center gap-2">
                            <Sparkles class="size-5 text-yellow-300" />
                            <span class="text-sm font-medium text-white/90">"Welcome back!"</span>
                        </div>
                        <h2 class="mb-2 text-3xl font-bold text-white">"Your Bookmark Collection"</h2>
                        <p class="max-w-2xl text-white/80">
                            "Save, organize, and access your favorite websites all in one place. Add new bookmarks below and manage your collection effortlessly."
                        </p>
                    </div>
                </div>

                <BookmarkForm />
                <BookmarkList user_id=user_id />
            </main>

            <footer class="mx-auto mt-12 max-w-5xl px-6 py-6">
                <p class="text-center text-sm text-gray-500">"Made with Rust, Leptos and Supabase"</p>
            </footer>
        </div>
    }
}

#[component]
pub fn NotFound() -> impl IntoView {
    view! {
        <div class="px-4 py-8 text-sm text-gray-500">
            "Not found. "
            <a class="text-indigo-600 underline underline-offset-4" href="/">"Go home"</a>
        </div>
    }
}
