//! MarkdownV2 rendering of task reminders.
//!
//! Escaping applies to every dynamically-sourced string and never to the
//! literal formatting characters of the template itself.

use prazo_notion::relations::NO_RELATION;
use prazo_pipeline::TaskRecord;

/// Characters Telegram's MarkdownV2 mode requires escaped in text.
const RESERVED: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Visual separator between per-task fragments.
pub const SEPARATOR: &str = "\n\n*\\-\\-\\-\\-\\-\\-*\n\n";

const MONTHS: [&str; 12] = [
    "Janeiro", "Fevereiro", "Março", "Abril", "Maio", "Junho",
    "Julho", "Agosto", "Setembro", "Outubro", "Novembro", "Dezembro",
];

/// Prefix every reserved MarkdownV2 character with a backslash.
pub fn escape_markdown_v2(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if RESERVED.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `"2025-03-09"` → `"9 de Março"`. Unparsable input renders as `"N/D"`.
pub fn format_due_date(iso: &str) -> String {
    match chrono::NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
        Ok(date) => {
            use chrono::Datelike;
            format!("{} de {}", date.day(), MONTHS[date.month0() as usize])
        }
        Err(_) => "N/D".to_string(),
    }
}

/// Render one task as a MarkdownV2 fragment. Returns `None` when the task
/// has no day count or falls outside the reminder window.
pub fn render_task(task: &TaskRecord, window_days: i64) -> Option<String> {
    let days = task.days_remaining?;
    if days > window_days {
        return None;
    }

    let kind = escape_markdown_v2(&or_nd(&task.kind).to_uppercase());
    let subject = escape_markdown_v2(or_nd(&task.subject));
    let due = if task.due_date.is_empty() {
        "N/D".to_string()
    } else {
        format_due_date(&task.due_date)
    };
    let description = escape_markdown_v2(if task.description.is_empty() {
        "Sem descrição"
    } else {
        &task.description
    });

    let topics: &str = if task.topics.is_empty() || task.topics == NO_RELATION {
        "Sem Tópicos"
    } else {
        &task.topics
    };
    let bullets = topics
        .split(", ")
        .map(|topic| format!("\\- _{}_", escape_markdown_v2(topic.trim())))
        .collect::<Vec<_>>()
        .join("\n");

    let days_text = if days == 0 {
        "🚨 HOJE 🚨".to_string()
    } else {
        format!("{days} DIA{}", if days > 1 { "S" } else { "" })
    };

    Some(format!(
        "*{kind} \\- {subject}*\n\
         Dias Restantes: *{days_text}*\n\
         Entrega: `{due}`\n\
         Tópicos:\n{bullets}\n\
         Descrição: _{description}_"
    ))
}

fn or_nd(value: &str) -> &str {
    if value.is_empty() { "N/D" } else { value }
}

/// Join the surviving fragments into the message body. `None` when no
/// task produced a fragment — nothing is sent this run.
pub fn combine(fragments: &[String]) -> Option<String> {
    if fragments.is_empty() {
        None
    } else {
        Some(fragments.join(SEPARATOR))
    }
}

/// Plain-text variant for the secondary broadcast: strip the MarkdownV2
/// escape backslashes and wrap everything in a fenced `md` block.
pub fn plain_markdown(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    format!("```md\n{out}```")
}
