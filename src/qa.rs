//! Interactive question-answering loop.
//!
//! Reads questions from stdin one line at a time and answers each with a
//! single language-model call over the ingested document text. Control
//! tokens: `exit` (case-insensitive, whitespace-trimmed) ends the session;
//! a leading `debug` token additionally prints the exact prompt sent to the
//! model. A failed call is reported and the loop keeps accepting questions.

use anyhow::Result;
use std::io::Write;

use crate::config::Config;
use crate::digest;
use crate::llm::LlmClient;

/// Parsed classification of one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QaInput {
    /// Terminate the loop. No API call is made.
    Exit,
    /// Answer the question and echo the constructed prompt first.
    Debug(String),
    /// Ordinary free-text question.
    Question(String),
    /// Blank line; ignored.
    Empty,
}

/// Classify one line of input.
///
/// `exit` matches case-insensitively after trimming. `debug` only switches
/// modes when followed by question text; a bare `debug` line is treated as
/// an ordinary question.
pub fn parse_input(line: &str) -> QaInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return QaInput::Empty;
    }
    if trimmed.eq_ignore_ascii_case("exit") {
        return QaInput::Exit;
    }
    if let Some(rest) = trimmed.strip_prefix("debug") {
        if rest.starts_with(char::is_whitespace) {
            let question = rest.trim();
            if !question.is_empty() {
                return QaInput::Debug(question.to_string());
            }
        }
    }
    QaInput::Question(trimmed.to_string())
}

/// Run the blocking read-evaluate loop over stdin.
pub async fn run_loop(llm: &LlmClient, document: &str) -> Result<()> {
    let interactive = atty::is(atty::Stream::Stdin);
    if interactive {
        println!("Ask questions about the document. Type 'exit' to quit.");
    }

    let stdin = std::io::stdin();
    let mut line = String::new();

    loop {
        if interactive {
            print!("> ");
            std::io::stdout().flush()?;
        }

        line.clear();
        let read = stdin.read_line(&mut line)?;
        if read == 0 {
            // EOF ends the session like an explicit exit.
            break;
        }

        match parse_input(&line) {
            QaInput::Exit => break,
            QaInput::Empty => continue,
            QaInput::Debug(question) => {
                let prompt = llm.prompt_builder().build_prompt(&question, document);
                println!("--- prompt ---");
                println!("{}", prompt);
                println!("--- answer ---");
                ask(llm, &question, document).await;
            }
            QaInput::Question(question) => {
                ask(llm, &question, document).await;
            }
        }
    }

    Ok(())
}

/// One question, one call. Failures are reported and recoverable.
async fn ask(llm: &LlmClient, question: &str, document: &str) {
    match llm.answer(question, document).await {
        Ok(answer) => println!("{}", answer.text),
        Err(e) => eprintln!("Error: {}", e),
    }
}

/// CLI entry point for `askdoc ask` — ingest the configured PDF, then
/// answer questions until `exit`.
pub async fn run_ask(config: &Config) -> Result<()> {
    // The language-model credential is required before any ingestion work.
    let llm = LlmClient::from_env(&config.llm)?;

    let doc = digest::ingest_pdf(config).await?;
    println!(
        "Loaded {} ({} chars{})",
        doc.source_id,
        doc.combined_text.chars().count(),
        if doc.truncated { ", truncated" } else { "" }
    );

    run_loop(&llm, &doc.combined_text).await
}
