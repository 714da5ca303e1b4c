use crate::form::{submit_bookmark, FormModel, SubmitError, SUCCESS_DISMISS_MS};
use crate::models::NewBookmark;
use crate::state::{AppContext, Backend};
use crate::util::schedule_once;
use crate::validation::{validate_bookmark, FormField};
use icons::{CircleCheck, Link as LinkIcon, Plus, Type};
use leptos::logging::{error, log};
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::ui::{
    Alert, AlertDescription, Button, ButtonSize, Card, CardTitle, CardTitleAccent, Input, Label,
    Spinner, ALERT_ERROR, ALERT_SUCCESS,
};

/// Validation runs before the backend is touched so a missing configuration
/// never hides a field error.
async fn submit_with(backend: &Backend, title: &str, url: &str) -> Result<NewBookmark, SubmitError> {
    validate_bookmark(title, url)?;
    let auth = backend.auth()?;
    let store = backend.store()?;
    submit_bookmark(&auth, &store, title, url).await
}

#[component]
pub fn BookmarkForm() -> impl IntoView {
    let backend = StoredValue::new(expect_context::<AppContext>().0);

    let title: RwSignal<String> = RwSignal::new(String::new());
    let url: RwSignal<String> = RwSignal::new(String::new());
    let model: RwSignal<FormModel> = RwSignal::new(FormModel::default());

    let in_flight = Signal::derive(move || model.with(|m| m.in_flight));
    let title_invalid = Signal::derive(move || model.with(|m| m.error_field == Some(FormField::Title)));
    let url_invalid = Signal::derive(move || model.with(|m| m.error_field == Some(FormField::Url)));

    let submit = move || {
        let started = model
            .try_update(|m| {
                m.title = title.get_untracked();
                m.url = url.get_untracked();
                m.begin_submit()
            })
            .unwrap_or(false);
        if !started {
            return;
        }

        let title_val = title.get_untracked();
        let url_val = url.get_untracked();
        let backend = backend.get_value();

        spawn_local(async move {
            match submit_with(&backend, &title_val, &url_val).await {
                Ok(record) => {
                    log!("Bookmark added: {}", record.url);
                    if let Some(token) = model.try_update(|m| m.submit_succeeded()) {
                        title.try_set(String::new());
                        url.try_set(String::new());
                        schedule_once(SUCCESS_DISMISS_MS, move || {
                            model.try_update(|m| m.dismiss_success(token));
                        });
                    }
                }
                Err(e) => {
                    if let SubmitError::Remote(api) = &e {
                        error!("Error adding bookmark: {api}");
                    }
                    model.try_update(|m| m.submit_failed(&e));
                }
            }
        });
    };

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        submit();
    };

    view! {
        <Card>
            <CardTitle>
                <CardTitleAccent />
                "Add New Bookmark"
            </CardTitle>

            <form class="space-y-4" on:submit=on_submit>
                <div>
                    <Label html_for="bookmark-title">"Title"</Label>
                    <Input
                        id="bookmark-title"
                        placeholder="e.g., My Favorite Website"
                        bind_value=title
                        disabled=in_flight
                        invalid=title_invalid
                        on_enter=Callback::new(move |_| submit())
                        leading=|| view! { <Type /> }
                    />
                </div>

                <div>
                    <Label html_for="bookmark-url">"URL"</Label>
                    <Input
                        id="bookmark-url"
                        placeholder="e.g., example.com or https://example.com"
                        bind_value=url
                        disabled=in_flight
                        invalid=url_invalid
                        on_enter=Callback::new(move |_| submit())
                        leading=|| view! { <LinkIcon /> }
                    />
                </div>

                {move || {
                    model.with(|m| m.error.clone()).map(|message| {
                        view! {
                            <Alert class=ALERT_ERROR attr:role="alert">
                                <AlertDescription>{message}</AlertDescription>
                            </Alert>
                        }
                    })
                }}

                <Show when=move || model.with(|m| m.success_visible)>
                    <Alert class=ALERT_SUCCESS attr:role="status">
                        <CircleCheck />
                        <AlertDescription>"Bookmark added successfully!"</AlertDescription>
                    </Alert>
                </Show>

                <Button class="w-full" size=ButtonSize::Lg attr:disabled=move || in_flight.get()>
                    <Show
                        when=move || in_flight.get()
                        fallback=|| view! { <Plus /> "Add Bookmark" }
                    >
                        <Spinner />
                        "Adding..."
                    </Show>
                </Button>
            </form>
        </Card>
    }
}
