use leptos::prelude::*;
use tw_merge::tw_merge;
use wasm_bindgen::JsCast;

#[component]
pub fn Input(
    // Styling
    #[prop(into, optional)] class: String,

    // Common HTML attributes
    #[prop(into, default = "text")] r#type: &'static str,
    #[prop(into, optional)] placeholder: String,
    #[prop(into, optional)] id: String,
    #[prop(into, optional)] autocomplete: String,
    #[prop(into, default = false.into())] disabled: Signal<bool>,
    #[prop(into, default = false.into())] invalid: Signal<bool>,

    // Two-way binding, wired by hand (see `on_input`).
    #[prop(into)] bind_value: RwSignal<String>,

    /// Fired on Enter.
    #[prop(optional, into)] on_enter: Option<Callback<()>>,

    /// Icon rendered inside the left edge of the field.
    #[prop(optional, into)] leading: Option<ViewFn>,
) -> impl IntoView {
    let has_leading = leading.is_some();
    let merged_class = tw_merge!(
        "w-full rounded-lg border border-gray-300 bg-white py-3 pr-4 text-black outline-none transition-all duration-200",
        "placeholder:text-gray-400 focus:border-transparent focus:ring-2 focus:ring-indigo-500",
        "disabled:cursor-not-allowed disabled:opacity-60",
        "aria-invalid:border-red-400 aria-invalid:ring-red-200",
        if has_leading { "pl-10" } else { "pl-4" },
        class
    );

    let on_input = move |ev: web_sys::Event| {
        if let Some(target) = ev.target() {
            if let Some(input) = target.dyn_ref::<web_sys::HtmlInputElement>() {
                bind_value.set(input.value());
            }
        }
    };

    let on_keydown = move |ev: web_sys::KeyboardEvent| {
        if ev.key() == "Enter" {
            if let Some(cb) = on_enter {
                ev.prevent_default();
                cb.run(());
            }
        }
    };

    view! {
        <div class="relative">
            {leading.map(|icon| {
                view! {
                    <span class="pointer-events-none absolute left-3 top-1/2 -translate-y-1/2 text-gray-400 [&_svg]:size-5">
                        {icon.run()}
                    </span>
                }
            })}
            <input
                data-name="Input"
                type=r#type
                class=merged_class
                placeholder=placeholder
                id=id
                autocomplete=autocomplete
                disabled=move || disabled.get()
                aria-invalid=move || if invalid.get() { "true" } else { "false" }
                prop:value=move || bind_value.get()
                on:input=on_input
                on:keydown=on_keydown
            />
        </div>
    }
}
