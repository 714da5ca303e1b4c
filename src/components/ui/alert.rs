use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {Alert, div, "relative flex w-full items-center gap-2 rounded-lg border px-4 py-3 text-sm [&>svg]:size-5 [&>svg]:shrink-0"}
    clx! {AlertDescription, p, "text-sm leading-relaxed"}
}

pub use components::*;

/// Tailwind classes for the error flavour of `Alert`.
pub const ALERT_ERROR: &str = "border-red-200 bg-red-50 text-red-700";
/// Tailwind classes for the success flavour of `Alert`.
pub const ALERT_SUCCESS: &str = "border-green-200 bg-green-50 text-green-700";
