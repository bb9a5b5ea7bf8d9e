//! Interactive prompt speaking the same commands as the CLI.
//!
//! One daemon round trip per entered line, same handlers as the one-shot
//! commands. Command failures are printed and the prompt keeps going.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands;
use crate::config::Config;

pub async fn run(config: &Config) -> u8 {
    println!("clipring shell. 'help' lists commands, 'exit' leaves.");

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    loop {
        print!("clipring> ");
        if std::io::stdout().flush().is_err() {
            return commands::EXIT_GENERIC;
        }

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            // EOF (Ctrl-D) leaves like `exit` does.
            Ok(None) => break,
            Err(err) => {
                eprintln!("clipring: {err}");
                return commands::EXIT_GENERIC;
            }
        };

        // Only the whole bare word leaves; `quit now` is dispatched and
        // reaches the daemon like any other line.
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "exit" || trimmed == "quit" {
            break;
        }
        if trimmed == "help" {
            print_help();
            continue;
        }

        let tokens = tokenize(trimmed);
        if tokens.is_empty() {
            continue;
        }
        dispatch(config, &tokens).await;
    }
    commands::EXIT_OK
}

async fn dispatch(config: &Config, tokens: &[String]) -> u8 {
    let name = tokens[0].to_ascii_lowercase();
    let rest = &tokens[1..];

    // Bare index, same shorthand the CLI accepts.
    if name.bytes().all(|b| b.is_ascii_digit()) {
        return commands::forward(config, &wire("copy", &tokens[0..1])).await;
    }

    match name.as_str() {
        "list" => commands::forward(config, "LIST").await,
        "clear" => commands::forward(config, "CLEAR").await,
        "find" => commands::find(config, rest).await,
        "add" => commands::add(config, rest).await,
        "del" => commands::del(config, rest).await,
        "copy" | "up" | "down" | "top" => commands::forward(config, &wire(&name, rest)).await,
        "version" => commands::version(config).await,
        "quit" => commands::forward(config, "QUIT").await,
        "watch" | "shell" => {
            eprintln!("clipring: '{name}' is not available inside the shell");
            commands::EXIT_BAD_ARGS
        }
        _ => {
            eprintln!("clipring: unknown command '{name}' (try 'help')");
            commands::EXIT_BAD_ARGS
        }
    }
}

/// Assemble a request line; argument validation stays with the daemon.
fn wire(name: &str, rest: &[String]) -> String {
    let verb = name.to_ascii_uppercase();
    if rest.is_empty() {
        verb
    } else {
        format!("{verb} {}", rest.join(" "))
    }
}

fn print_help() {
    println!("Commands:");
    println!("  list             show history entries, newest first");
    println!("  find <words>     show entries containing the words");
    println!("  copy <index>     put entry N back on the clipboard (or just: <index>)");
    println!("  add <words>      record text as the newest entry");
    println!("  del <targets>    delete entries (3 or 1,4 or 0-2)");
    println!("  clear            remove every entry");
    println!("  up <index>       swap entry N with the one above it");
    println!("  down <index>     swap entry N with the one below it");
    println!("  top <index>      move entry N to the top");
    println!("  version          print CLI and daemon versions");
    println!("  help             this list");
    println!("  exit             leave the shell");
}

/// Split a line into tokens: whitespace separates, double or single quotes
/// group, a backslash escapes the next character.
fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in line.chars() {
        if escaped {
            current.push(ch);
            in_token = true;
            escaped = false;
            continue;
        }
        match ch {
            '\\' => {
                escaped = true;
                in_token = true;
            }
            '"' | '\'' => match quote {
                Some(open) if open == ch => quote = None,
                Some(_) => current.push(ch),
                None => {
                    quote = Some(ch);
                    in_token = true;
                }
            },
            ch if ch.is_whitespace() && quote.is_none() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            ch => {
                current.push(ch);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}
