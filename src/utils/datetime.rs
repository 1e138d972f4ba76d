use chrono::{DateTime, Datelike, Local, TimeZone, Timelike, Utc};

const HU_MONTHS: [&str; 12] = [
    "január", "február", "március", "április", "május", "június",
    "július", "augusztus", "szeptember", "október", "november", "december",
];

/// Format hongrois des emails: "2026. október 19. 14:00"
pub fn format_hu<Tz: TimeZone>(value: &DateTime<Tz>) -> String {
    format!(
        "{}. {} {}. {:02}:{:02}",
        value.year(),
        HU_MONTHS[value.month0() as usize],
        value.day(),
        value.hour(),
        value.minute()
    )
}

/// Même format, dans le fuseau local du serveur (celui du cabinet)
pub fn format_hu_local(value: &DateTime<Utc>) -> String {
    format_hu(&value.with_timezone(&Local))
}
