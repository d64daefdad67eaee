use chrono::{DateTime, Duration, Utc};
use k8s_openapi::api::core::v1::{Event, EventSource};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

/// Renders an event list as text at a given indentation level
#[cfg_attr(test, mockall::automock)]
pub trait EventDescriber {
    fn describe_events(&self, events: &[Event], indent: usize) -> String;
}

const INDENT: &str = "  ";
const COLUMN_PADDING: usize = 2;

/// Event table in the layout of `kubectl describe`
#[derive(Debug, Clone, Copy, Default)]
pub struct TabularEventDescriber {
    now: Option<DateTime<Utc>>,
}

impl TabularEventDescriber {
    /// Describer measuring ages against the wall clock
    pub fn new() -> Self {
        Self { now: None }
    }

    /// Describer measuring ages against a fixed instant
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now: Some(now) }
    }

    fn interval(&self, event: &Event, now: DateTime<Utc>) -> String {
        let age = |ts: &Option<Time>| match ts {
            Some(Time(ts)) => human_duration(now - *ts),
            None => "<unknown>".to_string(),
        };
        match event.count {
            Some(count) if count > 1 => format!(
                "{} (x{} over {})",
                age(&event.last_timestamp),
                count,
                age(&event.first_timestamp)
            ),
            _ => age(&event.last_timestamp),
        }
    }
}

impl EventDescriber for TabularEventDescriber {
    fn describe_events(&self, events: &[Event], indent: usize) -> String {
        let prefix = INDENT.repeat(indent);
        if events.is_empty() {
            return format!("{}Events:\t<none>\n", prefix);
        }

        let now = self.now.unwrap_or_else(Utc::now);
        let mut sorted: Vec<&Event> = events.iter().collect();
        sorted.sort_by_key(|e| e.last_timestamp.as_ref().map(|Time(ts)| *ts));

        let mut rows = vec![
            ["Type", "Reason", "Age", "From", "Message"].map(String::from),
            ["----", "------", "----", "----", "-------"].map(String::from),
        ];
        for event in sorted {
            rows.push([
                event.type_.clone().unwrap_or_default(),
                event.reason.clone().unwrap_or_default(),
                self.interval(event, now),
                event.source.as_ref().map(format_source).unwrap_or_default(),
                event.message.as_deref().unwrap_or_default().trim().to_string(),
            ]);
        }

        let mut widths = [0usize; 5];
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let row_prefix = INDENT.repeat(indent + 1);
        let mut out = format!("{}Events:\n", prefix);
        for row in &rows {
            let mut line = row_prefix.clone();
            for (i, cell) in row.iter().enumerate() {
                if i + 1 == row.len() {
                    line.push_str(cell);
                } else {
                    let pad = widths[i] + COLUMN_PADDING - cell.chars().count();
                    line.push_str(cell);
                    line.push_str(&" ".repeat(pad));
                }
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

fn format_source(source: &EventSource) -> String {
    let component = source.component.as_deref().unwrap_or_default();
    match source.host.as_deref() {
        Some(host) if !host.is_empty() => format!("{}, {}", component, host),
        _ => component.to_string(),
    }
}

/// Short human-readable age, e.g. "45s", "3m20s", "5h", "12d"
pub fn human_duration(d: Duration) -> String {
    let seconds = d.num_seconds();
    if seconds < -1 {
        return "<invalid>".to_string();
    } else if seconds < 0 {
        return "0s".to_string();
    } else if seconds < 60 * 2 {
        return format!("{}s", seconds);
    }

    let minutes = d.num_minutes();
    if minutes < 10 {
        let s = seconds % 60;
        if s == 0 {
            return format!("{}m", minutes);
        }
        return format!("{}m{}s", minutes, s);
    } else if minutes < 60 * 3 {
        return format!("{}m", minutes);
    }

    let hours = d.num_hours();
    if hours < 8 {
        let m = minutes % 60;
        if m == 0 {
            return format!("{}h", hours);
        }
        return format!("{}h{}m", hours, m);
    } else if hours < 48 {
        return format!("{}h", hours);
    } else if hours < 24 * 8 {
        let h = hours % 24;
        if h == 0 {
            return format!("{}d", hours / 24);
        }
        return format!("{}d{}h", hours / 24, h);
    } else if hours < 24 * 365 * 2 {
        return format!("{}d", hours / 24);
    } else if hours < 24 * 365 * 8 {
        let days = hours / 24 % 365;
        if days == 0 {
            return format!("{}y", hours / 24 / 365);
        }
        return format!("{}y{}d", hours / 24 / 365, days);
    }
    format!("{}y", hours / 24 / 365)
}
