use std::time::Duration;
use time::macros::format_description;
use time::OffsetDateTime;

/// Format a duration as "1h 02m 03s", "2m 05s" or "4.20s"
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs >= 3600 {
        format!("{}h {:02}m {:02}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{:.2}s", elapsed.as_secs_f64())
    }
}

fn today() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

pub fn current_year() -> i64 {
    today().year() as i64
}

/// Date stamp used in report file names, e.g. "20240131"
pub fn date_stamp() -> String {
    today()
        .format(format_description!("[year][month][day]"))
        .unwrap_or_default()
}
