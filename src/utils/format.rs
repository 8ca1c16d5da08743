use std::time::Duration;

/// Formats a processing time with a precision that shrinks as it grows.
pub fn format_duration(duration: Duration) -> String {
    let seconds = duration.as_secs_f64();
    if seconds < 0.1 {
        format!("{:.0} ms", seconds * 1000.0)
    } else if seconds < 1.0 {
        format!("{:.1} ms", seconds * 1000.0)
    } else if seconds < 10.0 {
        format!("{:.2} s", seconds)
    } else {
        format!("{:.1} s", seconds)
    }
}

/// Formats an uptime as `Hh Mm Ss`.
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let hours = total / 3600;
    let minutes = total % 3600 / 60;
    let seconds = total % 60;
    format!("{}h {}m {}s", hours, minutes, seconds)
}

/// Substitutes every `{key}` of `template` with its value.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_owned(), |text, (key, value)| {
        text.replace(&format!("{{{}}}", key), value)
    })
}
