//! Interactive diagnoses.
//!
//! Questions go to stderr and answers are read one per line from stdin, so
//! stdout carries only the final JSON analysis. In the sentence and CCI
//! flows `back` re-opens the previous step and `next` moves on once enough
//! answers are in. The card sort takes one choice per card, then picks
//! and a final ordering.

use chrono::Utc;
use clap::Subcommand;
use serde::Serialize;
use serde_json::json;
use shadowlantern_core::diagnosis::{CardSortResult, FINAL_SIZE, SHORTLIST_SIZE};
use shadowlantern_core::interpret::{Analysis, GeminiClient, Interpreter};
use shadowlantern_core::{
    CardChoice, CardSort, CardSortStep, ChatTurn, Conversation, DiagnosisRecord,
    DiagnosisSession, FlowKind, PhaseResponses, SessionStatus,
};
use std::io::BufRead;

use super::{print_json, CliResult, Workspace};

#[derive(Subcommand)]
pub enum DiagnoseAction {
    /// Conversational interrogation of envy, rage and loss
    Shadow,
    /// Complete unfinished sentences across five life areas
    Sentence,
    /// Career construction interview
    Cci,
    /// Sort the value cards and rank your top five
    Cards,
}

pub fn run(action: DiagnoseAction) -> CliResult {
    let mut ws = Workspace::open()?;
    let interpreter = Interpreter::with_config(
        GeminiClient::from_env(&ws.config.interpret),
        &ws.config.interpret,
    );
    let quota = ws.config.diagnosis.chat_quota as usize;
    let rt = tokio::runtime::Runtime::new()?;
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    let record = match action {
        DiagnoseAction::Shadow => {
            let mut chat = Conversation::shadow(quota, Utc::now())?;
            eprintln!("== {} ==", FlowKind::Shadow.title());
            if let Some(prompt) = chat.last_prompt() {
                eprintln!("{prompt}");
            }
            while !chat.is_complete() {
                let Some(line) = lines.next() else { break };
                let line = line?;
                match chat.respond(&line, Utc::now()) {
                    Ok(ChatTurn::AwaitFollowUp { phase, .. }) => {
                        let log = chat.session().message_log();
                        let question = rt
                            .block_on(interpreter.next_question(&phase, log))
                            .unwrap_or_else(|| chat.fallback_follow_up().to_string());
                        chat.push_question(question.clone(), Utc::now());
                        eprintln!("{question}");
                    }
                    Ok(ChatTurn::PhaseChanged {
                        transition,
                        opening,
                        ..
                    }) => eprintln!("{transition}\n\n{opening}"),
                    Ok(ChatTurn::Finished { closing }) => eprintln!("{closing}"),
                    Err(e) => eprintln!("{e}"),
                }
            }
            let responses = chat.finish()?;
            let analysis = rt.block_on(interpreter.analyze_shadow(&responses));
            let primary = analysis.result.primary_value().map(str::to_string);
            record_of(FlowKind::Shadow, responses, &analysis, primary)?
        }
        DiagnoseAction::Sentence => {
            let responses = run_session(FlowKind::Sentence, quota, &mut lines)?;
            let analysis = rt.block_on(interpreter.analyze_sentences(&responses));
            let primary = analysis.result.primary_value().map(str::to_string);
            record_of(FlowKind::Sentence, responses, &analysis, primary)?
        }
        DiagnoseAction::Cci => {
            let responses = run_session(FlowKind::Cci, quota, &mut lines)?;
            let analysis = rt.block_on(interpreter.analyze_cci(&responses));
            let primary = analysis.result.core_values.first().cloned();
            record_of(FlowKind::Cci, responses, &analysis, primary)?
        }
        DiagnoseAction::Cards => {
            let result = run_card_sort(&mut lines)?;
            result.to_record(Utc::now())?
        }
    };

    let source = match (record.flow, record.from_fallback) {
        (FlowKind::CardSort, _) => "ranking",
        (_, true) => "fallback",
        (_, false) => "model",
    };
    let output = json!({
        "flow": record.flow,
        "source": source,
        "analysis": record.analysis,
        "primaryValue": record.primary_value,
    });
    ws.app.diagnosis.record(record);
    ws.save()?;
    print_json(&output)
}

/// Drive a non-conversational flow to completion.
pub(crate) fn run_session<I>(
    kind: FlowKind,
    chat_quota: usize,
    lines: &mut I,
) -> Result<Vec<PhaseResponses>, Box<dyn std::error::Error>>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    let mut session = DiagnosisSession::new(kind.phases(chat_quota))?;
    eprintln!("== {} ==", kind.title());
    prompt(&session);

    while !session.is_complete() {
        let Some(line) = lines.next() else {
            return Err(format!("{} ended before all steps were answered", kind.as_str()).into());
        };
        let line = line?;
        let outcome = match line.trim() {
            "back" => session.go_back().map(|discarded| {
                if !discarded.is_empty() {
                    eprintln!("(discarded: {})", discarded.join(" / "));
                }
            }),
            "next" => session.advance().map(|_| ()),
            answer => session.submit(answer, Utc::now()).map(|_| ()),
        };
        match outcome {
            Ok(()) => prompt(&session),
            Err(e) => eprintln!("{e}"),
        }
    }
    Ok(session.finish()?)
}

/// Drive the card sort: one line per card, then picks, then the ranking.
fn run_card_sort<I>(lines: &mut I) -> Result<CardSortResult, Box<dyn std::error::Error>>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    let mut sort = CardSort::new(&mut rand::thread_rng());
    eprintln!("== {} ==", FlowKind::CardSort.title());
    eprintln!("For each value: i = important, n = not important, empty line = neutral.");

    loop {
        match sort.step() {
            CardSortStep::Sort => {
                let Some(card) = sort.current_card() else { break };
                let (done, total) = sort.progress();
                eprintln!("[{}/{}] {}: {}", done + 1, total, card.name, card.description);
            }
            CardSortStep::Shortlist | CardSortStep::Finalists => show_pool(&sort),
            CardSortStep::Rank => {
                if sort.ranking().is_empty() {
                    return Err("no value was marked important".into());
                }
                eprintln!("\nYour ranking:");
                for (i, card) in sort.ranking().iter().enumerate() {
                    eprintln!("  {}. {}", i + 1, card.name);
                }
                eprintln!("Enter a new order (e.g. '2 1 3'), or an empty line to keep it.");
            }
        }

        let Some(line) = lines.next() else {
            return Err("cards ended before the sort was finished".into());
        };
        let line = line?;
        let outcome: Result<bool, String> = match sort.step() {
            CardSortStep::Sort => line
                .parse::<CardChoice>()
                .and_then(|choice| sort.choose(choice).map_err(|e| e.to_string()))
                .map(|_| false),
            CardSortStep::Shortlist | CardSortStep::Finalists => {
                pick(&mut sort, &line).map(|_| false)
            }
            CardSortStep::Rank if line.trim().is_empty() => Ok(true),
            CardSortStep::Rank => parse_order(&line)
                .and_then(|order| sort.reorder(&order).map_err(|e| e.to_string()))
                .map(|_| false),
        };
        match outcome {
            Ok(true) => break,
            Ok(false) => {}
            Err(e) => eprintln!("{e}"),
        }
    }
    Ok(sort.finish()?)
}

fn show_pool(sort: &CardSort) {
    let (picked, cap) = match sort.step() {
        CardSortStep::Shortlist => (sort.shortlist(), SHORTLIST_SIZE),
        _ => (sort.finalists(), FINAL_SIZE),
    };
    eprintln!("\nPick up to {cap} values ({} picked). 'done' to continue.", picked.len());
    for (i, card) in sort.pool().iter().enumerate() {
        let mark = if picked.iter().any(|c| c.id == card.id) { "*" } else { " " };
        eprintln!(" {mark} {:>2}. {}", i + 1, card.name);
    }
}

/// Toggle each comma-separated pick (pool number, id or name), or confirm.
fn pick(sort: &mut CardSort, line: &str) -> Result<(), String> {
    if line.trim() == "done" {
        return sort.confirm().map(|_| ()).map_err(|e| e.to_string());
    }
    for key in line.split(',').map(str::trim).filter(|k| !k.is_empty()) {
        let key = match key.parse::<usize>() {
            Ok(n) => sort
                .pool()
                .get(n.wrapping_sub(1))
                .map(|c| c.id.to_string())
                .ok_or_else(|| format!("no card numbered {n}"))?,
            Err(_) => key.to_string(),
        };
        sort.toggle(&key).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// 1-based positions separated by spaces or commas.
fn parse_order(line: &str) -> Result<Vec<usize>, String> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| match s.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n - 1),
            _ => Err(format!("'{s}' is not a position")),
        })
        .collect()
}

fn prompt(session: &DiagnosisSession) {
    let SessionStatus::InPhase {
        index,
        phase: _,
        responses,
        min,
        max,
    } = session.status()
    else {
        return;
    };
    let Some(phase) = session.phases().get(index) else {
        return;
    };
    eprintln!("\n[{}/{}] {}", index + 1, session.phases().len(), phase.label);
    if responses == 0 {
        eprintln!("{}", phase.prompt);
    }
    if let Some(item) = phase.items.get(responses) {
        eprintln!("{item}");
    }
    if min < max && responses >= min {
        eprintln!("({responses}/{max} answers for {}; type 'next' to move on)", phase.id);
    }
}

fn record_of<T: Serialize>(
    flow: FlowKind,
    responses: Vec<PhaseResponses>,
    analysis: &Analysis<T>,
    primary_value: Option<String>,
) -> Result<DiagnosisRecord, serde_json::Error> {
    Ok(DiagnosisRecord {
        flow,
        completed_at: Utc::now(),
        responses,
        analysis: serde_json::to_value(&analysis.result)?,
        primary_value,
        from_fallback: analysis.is_fallback(),
    })
}
