/// Render a position in seconds as `m:ss`.
///
/// Minutes are not wrapped into hours. Negative and non-finite inputs render
/// as `0:00`; fractional seconds are truncated.
///
/// ```
/// use core_library::format_time;
///
/// assert_eq!(format_time(65.0), "1:05");
/// assert_eq!(format_time(3600.0), "60:00");
/// ```
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }

    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}
