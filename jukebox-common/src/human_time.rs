//! Human-readable time formatting
//!
//! Track lengths are shown the way chat users expect them: `m:ss` below an
//! hour, `h:mm:ss` from one hour up.

const SECONDS_PER_HOUR: u64 = 3600;

/// Format a track length in whole seconds.
///
/// # Examples
///
/// ```
/// use jukebox_common::human_time::format_track_duration;
///
/// assert_eq!(format_track_duration(0), "0:00");
/// assert_eq!(format_track_duration(5), "0:05");
/// assert_eq!(format_track_duration(215), "3:35");
/// assert_eq!(format_track_duration(3661), "1:01:01");
/// ```
pub fn format_track_duration(seconds: u64) -> String {
    if seconds >= SECONDS_PER_HOUR {
        let hours = seconds / SECONDS_PER_HOUR;
        let mins = (seconds % SECONDS_PER_HOUR) / 60;
        let secs = seconds % 60;
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", seconds / 60, seconds % 60)
    }
}

/// Format a gain factor as a whole percentage (`1.5` → `"150%"`).
pub fn format_volume_percent(volume: f32) -> String {
    format!("{}%", volume_to_percent(volume))
}

/// Convert a gain factor to the user-facing percentage.
pub fn volume_to_percent(volume: f32) -> u32 {
    (volume.max(0.0) * 100.0).round() as u32
}
