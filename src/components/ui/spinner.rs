use icons::LoaderCircle;
use leptos::prelude::*;
use tw_merge::tw_merge;

#[component]
pub fn Spinner(#[prop(into, optional)] class: String) -> impl IntoView {
    let merged_class = tw_merge!("size-4 animate-spin", class);

    view! { <LoaderCircle class=merged_class attr:role="status" attr:aria-label="Loading" /> }
}

/// Two counter-rotating rings used by the full-page splash.
#[component]
pub fn SplashRings() -> impl IntoView {
    view! {
        <div class="relative mb-8 inline-flex items-center justify-center">
            <div class="h-20 w-20 animate-spin rounded-full border-4 border-indigo-200 border-t-indigo-600"></div>
            <div class="absolute h-12 w-12 animate-spin rounded-full border-4 border-purple-200 border-t-purple-600 [animation-direction:reverse]"></div>
        </div>
    }
}
