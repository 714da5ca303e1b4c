use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {Card, section, "rounded-2xl border border-gray-100 bg-white p-6 shadow-lg"}
    clx! {CardTitle, h3, "mb-4 flex items-center gap-2 text-lg font-semibold text-gray-800"}
    clx! {CardList, ul, "space-y-3"}
    clx! {CardItem, li, "group flex items-center justify-between rounded-xl border border-gray-200 bg-gradient-to-r from-white to-gray-50 p-4 transition-all duration-200 hover:border-indigo-300 hover:shadow-md"}
}

pub use components::*;

/// Gradient bar shown before every card title.
#[component]
pub fn CardTitleAccent() -> impl IntoView {
    view! { <span class="h-6 w-1 rounded-full bg-gradient-to-b from-indigo-600 to-purple-600"></span> }
}
