use crate::api::IdentityService;
use crate::models::AuthUser;
use crate::state::AppContext;
use leptos::logging::warn;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;
use leptos_router::NavigateOptions;

/// Resolves the signed-in user once on mount and renders `render(user)`.
/// Renders nothing until resolved; without a user it redirects to `/login`.
#[component]
pub(crate) fn AuthGate<F, IV>(render: F) -> impl IntoView
where
    F: Fn(AuthUser) -> IV + Send + Sync + 'static,
    IV: IntoView + 'static,
{
    let backend = expect_context::<AppContext>().0;
    let navigate = use_navigate();

    let user: RwSignal<Option<AuthUser>> = RwSignal::new(None);

    spawn_local(async move {
        let outcome = match backend.auth() {
            Ok(auth) => auth.current_user().await,
            Err(e) => Err(e),
        };
        let current = outcome.unwrap_or_else(|e| {
            warn!("Could not resolve current user: {e}");
            None
        });

        if current.is_none() {
            navigate(
                "/login",
                NavigateOptions {
                    replace: true,
                    ..Default::default()
                },
            );
        }
        user.try_set(current);
    });

    let render = StoredValue::new(render);

    view! { {move || user.get().map(|u| render.with_value(|r| r(u)))} }
}
