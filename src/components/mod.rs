pub mod auth_gate;
pub mod bookmark_form;
pub mod bookmark_list;
pub mod ui;

pub(crate) use auth_gate::AuthGate;
pub(crate) use bookmark_form::BookmarkForm;
pub(crate) use bookmark_list::BookmarkList;
