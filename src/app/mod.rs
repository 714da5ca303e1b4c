use crate::pages::{DashboardPage, LoginPage, NotFound, RootPage};
use crate::state::{AppContext, Backend};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    provide_context(AppContext(Backend::from_env()));

    view! {
        <Router>
            <Routes fallback=NotFound>
                <Route path=path!("login") view=LoginPage />
                <Route path=path!("dashboard") view=DashboardPage />
                <Route path=path!("") view=RootPage />
            </Routes>
        </Router>
    }
}
