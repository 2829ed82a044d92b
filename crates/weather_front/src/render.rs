use std::collections::HashMap;
use time::{macros::format_description, Date};
use url::form_urlencoded;

use crate::{ForecastDay, HourlyRecord, Page, TemperatureScale, ViewModel};

const HOME_TEMPLATE: &str = include_str!("../templates/home.html");
const NOT_FOUND_TEMPLATE: &str = include_str!("../templates/not_found.html");

pub fn render_page(page: Page, view: &ViewModel, app_name: &str) -> String {
    let template = match page {
        Page::Home => HOME_TEMPLATE,
        Page::NotFound => NOT_FOUND_TEMPLATE,
    };
    let scale = view.temp_scale;
    let query = [
        ("city_name", view.search_query.as_str()),
        ("temp_scale", scale.as_str()),
    ];

    let mut values: HashMap<&str, String> = HashMap::new();
    values.insert("APP_NAME", escape_html(app_name));
    values.insert("SEARCH_QUERY", escape_html(&view.search_query));
    values.insert("TEMP_SCALE", String::from(scale.as_str()));
    values.insert(
        "STATE_CLASS",
        String::from(if view.error.is_some() { "has-error" } else { "" }),
    );
    values.insert("ERROR_BANNER", error_banner(view.error.as_deref()));
    values.insert("LOCATION", escape_html(&view.location));
    values.insert("COUNTRY", escape_html(&view.country));
    values.insert("DATE", escape_html(&format_day(&view.date, DayFormat::Long)));
    values.insert("TIME", escape_html(&view.time));
    values.insert("CONDITION", escape_html(&view.condition));
    values.insert("TEMPERATURE", format!("{:.0}", view.temperature));
    values.insert("SCALE_SYMBOL", String::from(scale.symbol()));
    values.insert("HUMIDITY", format!("{:.0}", view.humidity));
    values.insert("WIND", format!("{:.1}", view.wind));
    values.insert("PRECIPITATION", format!("{:.2}", view.precipitation));
    values.insert(
        "CELSIUS_URL",
        escape_html(&url_with(&query, "temp_scale", TemperatureScale::Celsius.as_str())),
    );
    values.insert(
        "FAHRENHEIT_URL",
        escape_html(&url_with(&query, "temp_scale", TemperatureScale::Fahrenheit.as_str())),
    );
    values.insert("RECENT_HOURS", recent_hours(&view.recent_hours, scale));
    values.insert("FORECAST_DAYS", forecast_days(&view.forecast_days, scale));

    fill(template, &values)
}

/// Replaces `{NAME}` markers in one pass, so inserted text is never scanned again.
/// Unknown markers are left as they are.
pub fn fill(template: &str, values: &HashMap<&str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) if is_marker(&after[..end]) => {
                match values.get(&after[..end]) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + end + 2]),
                }
                rest = &after[end + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_marker(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c == '_')
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Query string for the current page with `key` set to `value`, e.g. for the °C/°F toggle.
pub fn url_with(params: &[(&str, &str)], key: &str, value: &str) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut replaced = false;
    for (name, current) in params {
        if *name == key {
            serializer.append_pair(name, value);
            replaced = true;
        } else {
            serializer.append_pair(name, current);
        }
    }
    if !replaced {
        serializer.append_pair(key, value);
    }
    format!("?{}", serializer.finish())
}

#[derive(Clone, Copy)]
pub enum DayFormat {
    /// `Friday, 01 March`
    Long,
    /// `Fri 01`
    Short,
}

/// Reformats a `YYYY-MM-DD` date for display, strings that do not parse come back unchanged.
pub fn format_day(raw: &str, style: DayFormat) -> String {
    let Ok(date) = Date::parse(raw, format_description!("[year]-[month]-[day]")) else {
        return raw.to_owned();
    };
    let formatted = match style {
        DayFormat::Long => date.format(format_description!(
            "[weekday], [day] [month repr:long]"
        )),
        DayFormat::Short => date.format(format_description!("[weekday repr:short] [day]")),
    };
    formatted.unwrap_or_else(|_| raw.to_owned())
}

fn hour_label(time: &str) -> &str {
    time.split_once(' ').map(|(_, hour)| hour).unwrap_or(time)
}

fn icon(icon: Option<&str>, alt: &str) -> String {
    match icon {
        Some(src) if !src.is_empty() => {
            let src = if src.starts_with("//") {
                format!("https:{}", src)
            } else {
                src.to_owned()
            };
            format!(
                r#"<img class="condition-icon" src="{}" alt="{}">"#,
                escape_html(&src),
                escape_html(alt)
            )
        }
        _ => String::new(),
    }
}

fn error_banner(error: Option<&str>) -> String {
    match error {
        Some(message) => format!(
            r#"<div class="alert" role="alert">{}</div>"#,
            escape_html(message)
        ),
        None => String::new(),
    }
}

fn recent_hours(hours: &[HourlyRecord], scale: TemperatureScale) -> String {
    hours
        .iter()
        .map(|hour| {
            let temp = scale.pick(hour.temp_c, hour.temp_f);
            format!(
                concat!(
                    r#"<div class="hour-column" data-temp="{temp:.0}">"#,
                    r#"<div class="temp-bar"></div>"#,
                    r#"<span class="temp-label">{temp:.0}{symbol}</span>"#,
                    "{icon}",
                    r#"<span class="hour-label">{label}</span>"#,
                    "</div>"
                ),
                temp = temp,
                symbol = scale.symbol(),
                icon = icon(hour.condition.icon.as_deref(), &hour.condition.text),
                label = escape_html(hour_label(&hour.time)),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn forecast_days(days: &[ForecastDay], scale: TemperatureScale) -> String {
    days.iter()
        .map(|day| {
            let summary = &day.day;
            format!(
                concat!(
                    r#"<li class="forecast-day">"#,
                    r#"<span class="day-name">{name}</span>"#,
                    "{icon}",
                    r#"<span class="day-condition">{condition}</span>"#,
                    r#"<span class="day-range">{max:.0}{symbol} / {min:.0}{symbol}</span>"#,
                    "</li>"
                ),
                name = escape_html(&format_day(&day.date, DayFormat::Short)),
                icon = icon(summary.condition.icon.as_deref(), &summary.condition.text),
                condition = escape_html(&summary.condition.text),
                max = scale.pick(summary.maxtemp_c, summary.maxtemp_f),
                min = scale.pick(summary.mintemp_c, summary.mintemp_f),
                symbol = scale.symbol(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
