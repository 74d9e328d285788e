//! Terminal rendering of the workflow form and the interactive prompt loop.

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufRead, Lines};
use workflow::{FieldKind, FieldSpec, Flow, FormInput, FormView, WorkflowController};

enum Answer {
    Value(String),
    Absent,
    EndOfInput,
}

pub fn render(view: &FormView) -> String {
    let mut text = format!("\n== {} ==\n{}\n", view.title, view.intro);
    if let Some(error) = &view.error {
        text.push_str(&format!("! {error}\n"));
    }
    text
}

/// Runs prompts until a terminal stage or end of input. Returns the stage
/// the session finished in.
pub async fn run<R, W>(
    controller: &mut WorkflowController,
    lines: &mut Lines<R>,
    out: &mut W,
) -> Result<Flow>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    loop {
        let view = controller.view();
        write!(out, "{}", render(&view))?;
        if view.is_terminal() {
            out.flush()?;
            return Ok(view.flow);
        }

        if let Some(action) = view.actions.first() {
            let prompt = format!(
                "Press Enter to continue, or type 'u' to {}: ",
                action.label().to_lowercase()
            );
            let Some(choice) = read_line(lines, out, &prompt).await? else {
                return Ok(view.flow);
            };
            if matches!(choice.to_ascii_lowercase().as_str(), "u" | "unsubscribe") {
                if let Err(err) = controller.select_unsubscribe() {
                    writeln!(out, "! {err}")?;
                }
                continue;
            }
        }

        let mut input = FormInput::new();
        for field in &view.fields {
            match ask(field, lines, out).await? {
                Answer::Value(value) => input.set(field.name, value),
                Answer::Absent => {}
                Answer::EndOfInput => return Ok(view.flow),
            }
        }

        if let Some(label) = view.submit_label {
            writeln!(out, "{label}...")?;
        }
        if let Err(err) = controller.submit_and_settle(&input).await {
            writeln!(out, "! {err}")?;
        }
    }
}

async fn ask<R, W>(field: &FieldSpec, lines: &mut Lines<R>, out: &mut W) -> Result<Answer>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let answer = match &field.kind {
        FieldKind::Text | FieldKind::Code => {
            read_line(lines, out, &format!("{}: ", field.label)).await?
        }
        FieldKind::Choice(options) => {
            writeln!(out, "{}:", field.label)?;
            for (index, option) in options.iter().enumerate() {
                writeln!(out, "  {}) {}", index + 1, option.label)?;
            }
            read_line(lines, out, "Choose a number or name: ")
                .await?
                .map(|raw| {
                    raw.parse::<usize>()
                        .ok()
                        .and_then(|n| n.checked_sub(1))
                        .and_then(|index| options.get(index))
                        .map(|option| option.value.to_string())
                        .unwrap_or(raw)
                })
        }
        FieldKind::Checkbox => read_line(lines, out, &format!("{} [y/N]: ", field.label))
            .await?
            .map(|raw| {
                if matches!(raw.to_ascii_lowercase().as_str(), "y" | "yes") {
                    "on".to_string()
                } else {
                    String::new()
                }
            }),
    };

    let free_text = matches!(field.kind, FieldKind::Text | FieldKind::Code);
    Ok(match answer {
        None => Answer::EndOfInput,
        Some(value) if value.is_empty() && !free_text => Answer::Absent,
        Some(value) => Answer::Value(value),
    })
}

async fn read_line<R, W>(
    lines: &mut Lines<R>,
    out: &mut W,
    prompt: &str,
) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{prompt}")?;
    out.flush()?;
    Ok(lines.next_line().await?.map(|line| line.trim().to_string()))
}
