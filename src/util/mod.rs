use chrono::{DateTime, Utc};
use std::time::Duration;

pub(crate) fn now_ms() -> i64 {
    js_sys::Date::now().round() as i64
}

pub(crate) fn now_secs() -> i64 {
    now_ms() / 1000
}

/// Runs `f` once after `delay_ms` on the browser event loop.
pub(crate) fn schedule_once(delay_ms: u64, f: impl FnOnce() + 'static) {
    leptos_dom::helpers::set_timeout(f, Duration::from_millis(delay_ms));
}

/// "Mar 4, 2024" style label for list rows.
pub(crate) fn short_date(ts: &DateTime<Utc>) -> String {
    ts.format("%b %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_short_date() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 4, 23, 0, 0).unwrap();
        assert_eq!(short_date(&ts), "Mar 4, 2024");
    }
}
