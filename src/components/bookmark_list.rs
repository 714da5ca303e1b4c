use crate::api::{ChangeSubscription, ChannelStatus, RecordStore};
use crate::models::Bookmark;
use crate::state::AppContext;
use crate::sync::{ListSync, ReloadTicket, DELETE_FAILED_MESSAGE};
use crate::util::short_date;
use icons::{Bookmark as BookmarkIcon, ExternalLink, Trash2};
use leptos::logging::{error, log};
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardItem, CardList,
    CardTitle, CardTitleAccent, Spinner, ALERT_ERROR,
};

fn channel_badge(status: Option<ChannelStatus>) -> (&'static str, &'static str) {
    match status {
        Some(ChannelStatus::Subscribed) => ("Live", "bg-green-100 text-green-700"),
        Some(ChannelStatus::Connecting) | None => ("Connecting", "bg-gray-100 text-gray-600"),
        Some(ChannelStatus::Closed) => ("Offline", "bg-gray-100 text-gray-500"),
        Some(ChannelStatus::Errored) => ("Sync error", "bg-red-100 text-red-700"),
    }
}

/// The signed-in user's bookmarks, newest first, kept current through the
/// realtime change feed. Switching `user_id` tears down the old channel.
#[component]
pub fn BookmarkList(#[prop(into)] user_id: Signal<String>) -> impl IntoView {
    let backend = StoredValue::new(expect_context::<AppContext>().0);
    let sync: RwSignal<ListSync> = RwSignal::new(ListSync::default());
    let subscription: StoredValue<Option<ChangeSubscription>> = StoredValue::new(None);
    let delete_error: RwSignal<Option<String>> = RwSignal::new(None);

    let run_reload = move |ticket: ReloadTicket| {
        let backend = backend.get_value();
        spawn_local(async move {
            let outcome = match backend.store() {
                Ok(store) => store.select_bookmarks(&ticket.user_id).await,
                Err(e) => Err(e),
            };
            match outcome {
                Ok(rows) => {
                    sync.try_update(|s| {
                        if !s.apply_reload(&ticket, rows) {
                            log!("Dropped stale bookmark reload #{}", ticket.request_id);
                        }
                    });
                }
                Err(e) => {
                    error!("Error fetching bookmarks: {e}");
                    sync.try_update(|s| s.reload_failed(&ticket));
                }
            }
        });
    };

    let close_channel = move || {
        subscription.try_update_value(|slot| {
            if let Some(handle) = slot.take() {
                handle.unsubscribe();
            }
        });
    };

    Effect::new(move |_| {
        let uid = user_id.get();
        if sync.with_untracked(|s| s.user_id() == Some(uid.trim())) {
            return;
        }

        close_channel();
        delete_error.set(None);
        let ticket = sync
            .try_update(|s| {
                s.unsubscribe();
                s.subscribe(&uid)
            })
            .flatten();
        let Some(ticket) = ticket else {
            return;
        };

        let subscribed_user = ticket.user_id.clone();
        let status_user = subscribed_user.clone();
        run_reload(ticket);

        match backend.get_value().feed() {
            Ok(feed) => {
                let handle = feed.subscribe(
                    &subscribed_user,
                    move |event| {
                        if let Some(ticket) = sync.try_update(|s| s.on_change(&event)).flatten() {
                            run_reload(ticket);
                        }
                    },
                    move |status| {
                        sync.try_update(|s| s.on_channel_status(&status_user, status));
                    },
                );
                log!("Listening for bookmark changes on {}", handle.topic());
                subscription.set_value(Some(handle));
            }
            Err(e) => error!("Realtime updates unavailable: {e}"),
        }
    });

    on_cleanup(move || {
        close_channel();
        sync.try_update(|s| s.unsubscribe());
    });

    let delete_row = move |id: String| {
        if !sync.try_update(|s| s.begin_delete(&id)).unwrap_or(false) {
            return;
        }
        delete_error.set(None);
        log!("Deleting bookmark {id}");

        let backend = backend.get_value();
        spawn_local(async move {
            let outcome = match backend.store() {
                Ok(store) => store.delete_bookmark(&id).await,
                Err(e) => Err(e),
            };
            if let Err(e) = outcome {
                error!("Error deleting bookmark {id}: {e}");
                sync.try_update(|s| s.delete_failed(&id));
                delete_error.try_set(Some(DELETE_FAILED_MESSAGE.to_string()));
            }
        });
    };

    let rows = move || sync.with(|s| s.rows().to_vec());
    let is_empty = move || sync.with(|s| s.rows().is_empty());
    let is_loaded = move || sync.with(|s| s.is_loaded());

    view! {
        <Card>
            <CardTitle>
                <CardTitleAccent />
                "Your Bookmarks"
                {move || {
                    let (label, tone) = channel_badge(sync.with(|s| s.channel()));
                    view! {
                        <span class=format!("ml-auto rounded-full px-2 py-0.5 text-xs font-medium {tone}")>
                            {label}
                        </span>
                    }
                }}
            </CardTitle>

            {move || {
                delete_error.get().map(|message| {
                    view! {
                        <Alert class=format!("mb-4 {ALERT_ERROR}") attr:role="alert">
                            <AlertDescription>{message}</AlertDescription>
                        </Alert>
                    }
                })
            }}

            <Show
                when=is_loaded
                fallback=|| view! {
                    <div class="flex items-center justify-center gap-2 py-12 text-sm text-gray-500">
                        <Spinner />
                        "Loading bookmarks..."
                    </div>
                }
            >
                <Show
                    when=move || !is_empty()
                    fallback=|| view! {
                        <div class="py-12 text-center text-gray-500">
                            <BookmarkIcon class="mx-auto mb-3 size-10 text-gray-300" />
                            <p class="font-medium">"No bookmarks yet"</p>
                            <p class="text-sm">"Add your first bookmark above to get started."</p>
                        </div>
                    }
                >
                    <CardList>
                        <For
                            each=rows
                            key=|b: &Bookmark| b.id.clone()
                            children=move |b: Bookmark| {
                                let id = b.id.clone();
                                let deleting = {
                                    let id = id.clone();
                                    move || sync.with(|s| s.is_deleting(&id))
                                };
                                let deleting_label = deleting.clone();
                                let on_delete = move |_: web_sys::MouseEvent| delete_row(id.clone());

                                view! {
                                    <CardItem>
                                        <div class="min-w-0 flex-1">
                                            <h4 class="truncate font-medium text-gray-800">{b.title.clone()}</h4>
                                            <a
                                                href=b.url.clone()
                                                target="_blank"
                                                rel="noopener noreferrer"
                                                class="inline-flex max-w-full items-center gap-1 truncate text-sm text-indigo-600 hover:underline"
                                            >
                                                <span class="truncate">{b.url.clone()}</span>
                                                <ExternalLink class="size-3 shrink-0" />
                                            </a>
                                            <p class="mt-1 text-xs text-gray-400">{short_date(&b.created_at)}</p>
                                        </div>
                                        <Button
                                            variant=ButtonVariant::Destructive
                                            size=ButtonSize::Sm
                                            class="ml-4"
                                            attr:disabled=deleting
                                            on:click=on_delete
                                        >
                                            {move || {
                                                if deleting_label() {
                                                    view! { <Spinner /> "Deleting..." }.into_any()
                                                } else {
                                                    view! { <Trash2 /> "Delete" }.into_any()
                                                }
                                            }}
                                        </Button>
                                    </CardItem>
                                }
                            }
                        />
                    </CardList>
                </Show>
            </Show>
        </Card>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_badge_labels() {
        assert_eq!(channel_badge(Some(ChannelStatus::Subscribed)).0, "Live");
        assert_eq!(channel_badge(None).0, "Connecting");
        assert_eq!(channel_badge(Some(ChannelStatus::Errored)).0, "Sync error");
        assert_eq!(channel_badge(Some(ChannelStatus::Closed)).0, "Offline");
    }
}
